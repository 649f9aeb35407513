//! The secure-store capability (C1): wraps and unwraps a byte blob with an
//! OS-scoped secret, with an identity fallback where no such secret exists.
//!
//! Modeled as an injected capability rather than a compile-time platform
//! switch, so tests can substitute a stub without touching the OS keychain.

use std::sync::Mutex;

use hkdf::Hkdf;
use keyring::Error as KeyringError;
use sha2::Sha256;

use ledgerlock_crypto::{self as crypto, SecureRandom};

use crate::error::HistoryError;

/// Wrap/unwrap a byte blob with an OS-scoped secret.
pub trait SecureStore: Send + Sync {
    /// Wrap `plain` and frame it as `magic ‖ blob_len_le32 ‖ blob`.
    ///
    /// # Errors
    ///
    /// [`HistoryError::SecureStorePlainEmpty`] if `plain` is empty,
    /// [`HistoryError::SecureStoreWrap`] if the underlying primitive fails.
    fn protect(&self, plain: &[u8], magic: &[u8], entropy: &[u8]) -> Result<Vec<u8>, HistoryError>;

    /// If `input` starts with `magic`, parse and unwrap the framed blob that
    /// follows, returning `(plaintext, true)`. Otherwise return `(input,
    /// false)` unchanged.
    ///
    /// # Errors
    ///
    /// [`HistoryError::SecureStoreFraming`] if `input` starts with `magic`
    /// but the length header is truncated or inconsistent,
    /// [`HistoryError::SecureStoreUnwrap`] if the underlying primitive
    /// rejects the blob.
    fn maybe_unprotect(
        &self,
        input: &[u8],
        magic: &[u8],
        entropy: &[u8],
    ) -> Result<(Vec<u8>, bool), HistoryError>;

    /// Whether this store can actually wrap/unwrap, as opposed to passing
    /// data through unchanged.
    fn supported(&self) -> bool;
}

/// Identity secure store for platforms (or test environments) without a
/// usable OS secret store. `protect`/`maybe_unprotect` are no-ops so the
/// on-disk format degrades to a bare key, which a later run on a
/// store-capable platform can transparently re-wrap.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSecureStore;

impl SecureStore for NoopSecureStore {
    fn protect(&self, plain: &[u8], _magic: &[u8], _entropy: &[u8]) -> Result<Vec<u8>, HistoryError> {
        if plain.is_empty() {
            return Err(HistoryError::SecureStorePlainEmpty);
        }
        Ok(plain.to_vec())
    }

    fn maybe_unprotect(
        &self,
        input: &[u8],
        _magic: &[u8],
        _entropy: &[u8],
    ) -> Result<(Vec<u8>, bool), HistoryError> {
        Ok((input.to_vec(), false))
    }

    fn supported(&self) -> bool {
        false
    }
}

/// Secure store backed by the OS credential manager (Windows Credential
/// Manager, macOS/iOS Keychain, Linux Secret Service), reached through the
/// `keyring` crate.
///
/// The credential manager holds one random 32-byte wrapping secret per
/// `(service, account)`, created on first use. Each `protect`/
/// `maybe_unprotect` call derives a one-off AEAD key from that secret via
/// HKDF-SHA256, keyed on the caller-supplied `entropy` so that different
/// callers (e.g. the master-key manager versus a future second caller)
/// cannot decrypt each other's blobs even though they share one wrapping
/// secret in the credential manager.
pub struct KeyringSecureStore {
    rng: Box<dyn SecureRandom>,
    service: String,
    account: String,
    wrapping_secret: Mutex<Option<Option<[u8; 32]>>>,
}

const WRAPPING_SECRET_LEN: usize = crypto::KEY_SIZE;

impl KeyringSecureStore {
    /// Create a store scoped to the given credential-manager `(service,
    /// account)` pair.
    pub fn new(service: impl Into<String>, account: impl Into<String>, rng: Box<dyn SecureRandom>) -> Self {
        Self {
            rng,
            service: service.into(),
            account: account.into(),
            wrapping_secret: Mutex::new(None),
        }
    }

    fn wrapping_secret(&self) -> Option<[u8; WRAPPING_SECRET_LEN]> {
        let mut cached = self.wrapping_secret.lock().unwrap_or_else(|poison| poison.into_inner());
        if let Some(secret) = *cached {
            return secret;
        }
        let secret = self.load_or_create_wrapping_secret().ok();
        *cached = Some(secret);
        secret
    }

    fn load_or_create_wrapping_secret(&self) -> Result<[u8; WRAPPING_SECRET_LEN], HistoryError> {
        let entry = keyring::Entry::new(&self.service, &self.account)
            .map_err(|err| HistoryError::SecureStoreWrap { reason: err.to_string() })?;

        match entry.get_password() {
            Ok(hex) => decode_hex_secret(&hex),
            Err(KeyringError::NoEntry) => {
                let mut secret = [0u8; WRAPPING_SECRET_LEN];
                self.rng.fill(&mut secret).map_err(HistoryError::from)?;
                entry
                    .set_password(&encode_hex_secret(&secret))
                    .map_err(|err| HistoryError::SecureStoreWrap { reason: err.to_string() })?;
                Ok(secret)
            }
            Err(err) => Err(HistoryError::SecureStoreWrap { reason: err.to_string() }),
        }
    }

    fn derive_blob_key(&self, wrapping_secret: &[u8; WRAPPING_SECRET_LEN], entropy: &[u8]) -> [u8; crypto::KEY_SIZE] {
        let hkdf = Hkdf::<Sha256>::new(None, wrapping_secret);
        let mut out = [0u8; crypto::KEY_SIZE];
        let Ok(()) = hkdf.expand(entropy, &mut out) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };
        out
    }
}

impl SecureStore for KeyringSecureStore {
    fn protect(&self, plain: &[u8], magic: &[u8], entropy: &[u8]) -> Result<Vec<u8>, HistoryError> {
        if plain.is_empty() {
            return Err(HistoryError::SecureStorePlainEmpty);
        }
        let wrapping_secret = self
            .wrapping_secret()
            .ok_or_else(|| HistoryError::SecureStoreWrap { reason: "OS secure store unavailable".to_string() })?;
        let blob_key = self.derive_blob_key(&wrapping_secret, entropy);

        let mut nonce = [0u8; crypto::NONCE_SIZE];
        self.rng.fill(&mut nonce).map_err(HistoryError::from)?;
        let sealed = crypto::seal(&blob_key, &nonce, plain);

        let mut blob = Vec::with_capacity(nonce.len() + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);

        let blob_len = u32::try_from(blob.len())
            .map_err(|_| HistoryError::SecureStoreWrap { reason: "wrapped blob too large".to_string() })?;

        let mut out = Vec::with_capacity(magic.len() + 4 + blob.len());
        out.extend_from_slice(magic);
        out.extend_from_slice(&blob_len.to_le_bytes());
        out.extend_from_slice(&blob);
        Ok(out)
    }

    fn maybe_unprotect(
        &self,
        input: &[u8],
        magic: &[u8],
        entropy: &[u8],
    ) -> Result<(Vec<u8>, bool), HistoryError> {
        if !input.starts_with(magic) {
            return Ok((input.to_vec(), false));
        }

        let header_len = magic.len() + 4;
        if input.len() < header_len {
            return Err(HistoryError::SecureStoreFraming);
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&input[magic.len()..header_len]);
        let blob_len = u32::from_le_bytes(len_bytes) as usize;
        if input.len() != header_len + blob_len {
            return Err(HistoryError::SecureStoreFraming);
        }
        let blob = &input[header_len..];
        if blob.len() < crypto::NONCE_SIZE + crypto::TAG_SIZE {
            return Err(HistoryError::SecureStoreFraming);
        }

        let wrapping_secret = self
            .wrapping_secret()
            .ok_or_else(|| HistoryError::SecureStoreUnwrap { reason: "OS secure store unavailable".to_string() })?;
        let blob_key = self.derive_blob_key(&wrapping_secret, entropy);

        let mut nonce = [0u8; crypto::NONCE_SIZE];
        nonce.copy_from_slice(&blob[..crypto::NONCE_SIZE]);
        let ciphertext_and_tag = &blob[crypto::NONCE_SIZE..];

        let plain = crypto::open(&blob_key, &nonce, ciphertext_and_tag)
            .map_err(|_| HistoryError::SecureStoreUnwrap { reason: "wrapped blob rejected".to_string() })?;
        Ok((plain, true))
    }

    fn supported(&self) -> bool {
        self.wrapping_secret().is_some()
    }
}

fn encode_hex_secret(secret: &[u8; WRAPPING_SECRET_LEN]) -> String {
    crate::model::hex_lower(secret)
}

fn decode_hex_secret(hex: &str) -> Result<[u8; WRAPPING_SECRET_LEN], HistoryError> {
    if hex.len() != WRAPPING_SECRET_LEN * 2 {
        return Err(HistoryError::SecureStoreUnwrap { reason: "stored secret has invalid length".to_string() });
    }
    let mut out = [0u8; WRAPPING_SECRET_LEN];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let byte_str = std::str::from_utf8(chunk)
            .map_err(|_| HistoryError::SecureStoreUnwrap { reason: "stored secret is not valid hex".to_string() })?;
        out[i] = u8::from_str_radix(byte_str, 16)
            .map_err(|_| HistoryError::SecureStoreUnwrap { reason: "stored secret is not valid hex".to_string() })?;
    }
    Ok(out)
}
