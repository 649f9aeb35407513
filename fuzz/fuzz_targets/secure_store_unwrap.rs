//! Fuzz target for `KeyringSecureStore::maybe_unprotect`'s header framing.
//!
//! The master-key file is read back from disk before the OS primitive ever
//! sees it; a truncated or adversarial header must be rejected as
//! `SecureStoreFraming` before any call into the OS credential manager,
//! never panic. In a fuzzing sandbox without a usable OS keyring, well-framed
//! inputs fall through to `SecureStoreUnwrap` once the framing checks pass;
//! this target exercises the framing parser, not the OS round trip.

#![no_main]

use ledgerlock_core::secure_store::{KeyringSecureStore, SecureStore};
use ledgerlock_crypto::DeterministicRandom;
use libfuzzer_sys::fuzz_target;

const MAGIC: &[u8] = b"MI_E2EE_HISTORY_KEY_DPAPI1";
const ENTROPY: &[u8] = b"MI_E2EE_HISTORY_KEY_ENTROPY_V1";

fuzz_target!(|data: &[u8]| {
    let store = KeyringSecureStore::new(
        "ledgerlock-fuzz",
        "history-key",
        Box::new(DeterministicRandom::from_seed([5u8; 32])),
    );
    let _ = store.maybe_unprotect(data, MAGIC, ENTROPY);
});
