//! Master-key lifecycle (C4): load-or-create the per-user 32-byte secret,
//! persist it atomically, and transparently re-wrap a bare key once a
//! secure store becomes available.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use ledgerlock_crypto::SecureRandom;

use crate::error::HistoryError;
use crate::secure_store::SecureStore;

const MAX_KEY_FILE_BYTES: u64 = 64 * 1024;
const KEY_LEN: usize = 32;

const WRAP_MAGIC: &[u8] = b"MI_E2EE_HISTORY_KEY_DPAPI1";
const WRAP_ENTROPY: &[u8] = b"MI_E2EE_HISTORY_KEY_ENTROPY_V1";

/// Owns the plaintext master key for one user, for as long as it is loaded.
///
/// The key is wiped on drop via [`Zeroizing`]. This is a contractual
/// hygiene measure, not a defence against a process already under an
/// attacker's control.
pub struct MasterKeyManager {
    key_path: PathBuf,
    key: Option<Zeroizing<[u8; KEY_LEN]>>,
}

impl MasterKeyManager {
    /// Create a manager for the key file at `key_path`. Does not touch disk
    /// until [`Self::ensure_loaded`] is called.
    pub fn new(key_path: PathBuf) -> Self {
        Self { key_path, key: None }
    }

    /// The loaded key, or `None` if [`Self::ensure_loaded`] has not
    /// succeeded yet.
    pub fn key(&self) -> Option<&[u8; KEY_LEN]> {
        self.key.as_deref()
    }

    /// Load the existing key file, or generate and persist a new key if
    /// none exists. Idempotent: a second call is a no-op.
    pub fn ensure_loaded(
        &mut self,
        store: &dyn SecureStore,
        rng: &dyn SecureRandom,
    ) -> Result<(), HistoryError> {
        if self.key.is_some() {
            return Ok(());
        }

        match fs::metadata(&self.key_path) {
            Ok(meta) => {
                if meta.len() > MAX_KEY_FILE_BYTES {
                    return Err(HistoryError::KeyTooLarge { size: meta.len() });
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return self.create_and_persist(store, rng);
            }
            Err(err) => return Err(HistoryError::Open { reason: err.to_string() }),
        }

        let bytes = fs::read(&self.key_path).map_err(|err| HistoryError::Open { reason: err.to_string() })?;
        if bytes.is_empty() {
            debug!("history key file is empty, treating as absent");
            return self.create_and_persist(store, rng);
        }

        let (plain, was_wrapped) = store.maybe_unprotect(&bytes, WRAP_MAGIC, WRAP_ENTROPY)?;
        if plain.len() != KEY_LEN {
            return Err(HistoryError::KeyLengthInvalid { len: plain.len() });
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&plain);
        self.key = Some(key);

        if !was_wrapped && store.supported() {
            if let Err(err) = self.rewrap(store) {
                warn!(error = %err, "failed to re-wrap history key, continuing with bare key on disk");
            } else {
                info!("re-wrapped previously bare history key with the OS secure store");
            }
        }

        Ok(())
    }

    fn rewrap(&self, store: &dyn SecureStore) -> Result<(), HistoryError> {
        let Some(key) = &self.key else {
            return Err(HistoryError::KeyNotLoaded);
        };
        let wrapped = store.protect(key.as_slice(), WRAP_MAGIC, WRAP_ENTROPY)?;
        atomic_write(&self.key_path, &wrapped)
    }

    fn create_and_persist(
        &mut self,
        store: &dyn SecureStore,
        rng: &dyn SecureRandom,
    ) -> Result<(), HistoryError> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        rng.fill(key.as_mut_slice()).map_err(HistoryError::from)?;

        let to_persist = if store.supported() {
            store.protect(key.as_slice(), WRAP_MAGIC, WRAP_ENTROPY)?
        } else {
            key.to_vec()
        };

        if let Some(parent) = self.key_path.parent() {
            fs::create_dir_all(parent).map_err(|err| HistoryError::KeyWrite { reason: err.to_string() })?;
        }
        atomic_write(&self.key_path, &to_persist)?;

        self.key = Some(key);
        Ok(())
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), HistoryError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|err| HistoryError::KeyWrite { reason: err.to_string() })?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(HistoryError::KeyWrite { reason: err.to_string() });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::secure_store::NoopSecureStore;
    use ledgerlock_crypto::DeterministicRandom;
    use tempfile::tempdir;

    fn rng() -> DeterministicRandom {
        DeterministicRandom::from_seed([3u8; 32])
    }

    #[test]
    fn first_load_generates_and_persists_a_key() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("history_key.bin");
        let mut mgr = MasterKeyManager::new(key_path.clone());

        mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();
        assert!(mgr.key().is_some());
        assert!(key_path.exists());
        assert_eq!(fs::read(&key_path).unwrap().len(), KEY_LEN);
    }

    #[test]
    fn reload_from_disk_returns_same_key() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("history_key.bin");

        let first_key = {
            let mut mgr = MasterKeyManager::new(key_path.clone());
            mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();
            *mgr.key().unwrap()
        };

        let mut mgr = MasterKeyManager::new(key_path);
        mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();
        assert_eq!(*mgr.key().unwrap(), first_key);
    }

    #[test]
    fn ensure_loaded_is_idempotent() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("history_key.bin");
        let mut mgr = MasterKeyManager::new(key_path);

        mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();
        let key_after_first = *mgr.key().unwrap();
        mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();
        assert_eq!(*mgr.key().unwrap(), key_after_first);
    }

    #[test]
    fn zero_length_key_file_triggers_regeneration() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("history_key.bin");
        fs::write(&key_path, []).unwrap();

        let mut mgr = MasterKeyManager::new(key_path);
        mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();
        assert!(mgr.key().is_some());
    }

    #[test]
    fn oversized_key_file_is_rejected() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("history_key.bin");
        fs::write(&key_path, vec![0u8; MAX_KEY_FILE_BYTES as usize + 1]).unwrap();

        let mut mgr = MasterKeyManager::new(key_path);
        let err = mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap_err();
        assert!(matches!(err, HistoryError::KeyTooLarge { .. }));
    }

    #[test]
    fn bare_key_survives_noop_store_round_trip() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("history_key.bin");
        let mut mgr = MasterKeyManager::new(key_path.clone());
        mgr.ensure_loaded(&NoopSecureStore, &rng()).unwrap();

        let on_disk = fs::read(&key_path).unwrap();
        assert_eq!(on_disk.len(), KEY_LEN, "noop store must not wrap the key");
    }
}
