//! Record encryption using `XChaCha20-Poly1305`.
//!
//! Pure functions. Nonces are supplied by the caller (drawn from a
//! [`crate::SecureRandom`]), never generated internally. No associated data
//! is used: a history record authenticates only its own plaintext.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use crate::error::CryptoError;

/// Poly1305 tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Nonce size in bytes for `XChaCha20`.
pub const NONCE_SIZE: usize = 24;

/// Key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Seal `plaintext` under `key` and `nonce`.
///
/// Returns `ciphertext ‖ tag`, with the tag as the trailing 16 bytes;
/// callers that need to frame ciphertext and tag as separate fields can
/// split at `output.len() - TAG_SIZE`.
pub fn seal(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let Ok(sealed) = cipher.encrypt(XNonce::from_slice(nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };
    sealed
}

/// Open a `ciphertext ‖ tag` blob sealed by [`seal`].
///
/// # Errors
///
/// Returns [`CryptoError::AuthFailed`] if the key is wrong or the
/// ciphertext, nonce, or tag has been tampered with.
pub fn open(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ciphertext_and_tag: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext_and_tag)
        .map_err(|_| CryptoError::AuthFailed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key() -> [u8; KEY_SIZE] {
        let mut k = [0u8; KEY_SIZE];
        for (i, byte) in k.iter_mut().enumerate() {
            *byte = i as u8;
        }
        k
    }

    fn nonce() -> [u8; NONCE_SIZE] {
        [7u8; NONCE_SIZE]
    }

    #[test]
    fn seal_open_roundtrip() {
        let plaintext = b"hello history";
        let sealed = seal(&key(), &nonce(), plaintext);
        let opened = open(&key(), &nonce(), &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn seal_output_is_plaintext_plus_tag() {
        let plaintext = b"a short message";
        let sealed = seal(&key(), &nonce(), plaintext);
        assert_eq!(sealed.len(), plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let sealed = seal(&key(), &nonce(), b"");
        assert_eq!(sealed.len(), TAG_SIZE);
        let opened = open(&key(), &nonce(), &sealed).unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&key(), &nonce(), b"secret");
        let mut wrong_key = key();
        wrong_key[0] ^= 0xFF;
        let result = open(&wrong_key, &nonce(), &sealed);
        assert_eq!(result, Err(CryptoError::AuthFailed));
    }

    #[test]
    fn wrong_nonce_fails() {
        let sealed = seal(&key(), &nonce(), b"secret");
        let mut wrong_nonce = nonce();
        wrong_nonce[0] ^= 0xFF;
        let result = open(&key(), &wrong_nonce, &sealed);
        assert_eq!(result, Err(CryptoError::AuthFailed));
    }

    #[test]
    fn flipped_bit_in_ciphertext_fails() {
        let mut sealed = seal(&key(), &nonce(), b"tamper me please");
        sealed[0] ^= 0x01;
        let result = open(&key(), &nonce(), &sealed);
        assert_eq!(result, Err(CryptoError::AuthFailed));
    }

    #[test]
    fn flipped_bit_in_tag_fails() {
        let mut sealed = seal(&key(), &nonce(), b"tamper the tag");
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        let result = open(&key(), &nonce(), &sealed);
        assert_eq!(result, Err(CryptoError::AuthFailed));
    }
}
