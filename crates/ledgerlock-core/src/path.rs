//! On-disk path obfuscation.
//!
//! Usernames and conversation ids never appear in path components, only
//! the first 32 hex characters of a SHA-256 digest, so that a directory
//! listing reveals nothing about who the local user talks to.

use sha2::{Digest, Sha256};

use crate::model::hex_lower;

/// Directory name for a user: first 32 hex chars of `SHA-256(username)`.
pub fn user_hash(username: &str) -> String {
    let digest = Sha256::digest(username.as_bytes());
    hex_lower(&digest)[..32].to_string()
}

/// File stem hash for a conversation: first 32 hex chars of
/// `SHA-256("m" ‖ ('g'|'p') ‖ 0x00 ‖ conv_id)`.
fn conversation_hash(is_group: bool, conv_id: &str) -> String {
    let mut buf = Vec::with_capacity(3 + conv_id.len());
    buf.push(b'm');
    buf.push(if is_group { b'g' } else { b'p' });
    buf.push(0);
    buf.extend_from_slice(conv_id.as_bytes());
    let digest = Sha256::digest(&buf);
    hex_lower(&digest)[..32].to_string()
}

/// File name for a conversation log: `<p|g>_<hash32>.bin`.
pub fn conversation_file_name(is_group: bool, conv_id: &str) -> String {
    let kind = if is_group { "g" } else { "p" };
    format!("{kind}_{}.bin", conversation_hash(is_group, conv_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn user_hash_is_32_lowercase_hex_chars() {
        let hash = user_hash("alice");
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn user_hash_is_deterministic() {
        assert_eq!(user_hash("alice"), user_hash("alice"));
        assert_ne!(user_hash("alice"), user_hash("bob"));
    }

    #[test]
    fn conversation_file_name_varies_by_groupness() {
        let direct = conversation_file_name(false, "room-1");
        let group = conversation_file_name(true, "room-1");
        assert!(direct.starts_with("p_"));
        assert!(group.starts_with("g_"));
        assert_ne!(direct, group, "groupness must change the hashed name, not just the prefix");
    }

    #[test]
    fn conversation_file_name_varies_by_conv_id() {
        let a = conversation_file_name(false, "alice");
        let b = conversation_file_name(false, "bob");
        assert_ne!(a, b);
    }
}
