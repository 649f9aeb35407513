//! Key derivation for the chat-history key hierarchy.
//!
//! ```text
//! Master Key (32 bytes, per user)
//!        │
//!        ▼
//! HKDF-SHA256(salt, info) → Conversation Key (32 bytes, per conversation)
//! ```
//!
//! The salt is a fixed, non-secret constant; it exists only to domain-
//! separate this derivation from any other HKDF use in the surrounding
//! application, not to add entropy.

use std::sync::OnceLock;

use hkdf::Hkdf;
use sha2::{Digest, Sha256};

/// Domain-separation label hashed to produce the HKDF salt.
const SALT_LABEL: &[u8] = b"MI_E2EE_HISTORY_SALT_V1";

/// Fixed prefix of the HKDF info parameter.
const CONV_KEY_INFO_PREFIX: &[u8] = b"MI_E2EE_HISTORY_CONV_KEY_V1";

static SALT: OnceLock<[u8; 32]> = OnceLock::new();

fn salt() -> &'static [u8; 32] {
    SALT.get_or_init(|| {
        let digest = Sha256::digest(SALT_LABEL);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    })
}

/// Derive a 32-byte conversation key from the master key.
///
/// Deterministic: the same `(master, is_group, conv_id)` always yields the
/// same key, which is what lets a conversation log be read back after
/// restart. Callers are responsible for rejecting an all-zero master key or
/// an empty `conv_id` before calling this; this function has no invalid
/// input space of its own (HKDF-SHA256 expand to 32 bytes cannot fail).
pub fn derive_conversation_key(master: &[u8; 32], is_group: bool, conv_id: &str) -> [u8; 32] {
    let mut info = Vec::with_capacity(CONV_KEY_INFO_PREFIX.len() + 2 + conv_id.len());
    info.extend_from_slice(CONV_KEY_INFO_PREFIX);
    info.push(0);
    info.push(u8::from(is_group));
    info.push(0);
    info.extend_from_slice(conv_id.as_bytes());

    let hkdf = Hkdf::<Sha256>::new(Some(salt()), master);
    let mut out = [0u8; 32];
    let Ok(()) = hkdf.expand(&info, &mut out) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };
    out
}
