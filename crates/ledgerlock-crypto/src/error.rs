//! Error types for the cryptographic primitives.

use thiserror::Error;

/// Errors produced by the pure cryptographic building blocks.
///
/// These are deliberately narrow: the functions in this crate validate only
/// what they need to operate safely (key/nonce sizes are enforced by the
/// type system, not runtime checks). Business-level validation ("is this
/// conversation id empty", "is the master key loaded") belongs to the
/// caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD authentication failed: wrong key, tampered ciphertext, or
    /// tampered nonce/tag.
    #[error("AEAD authentication failed")]
    AuthFailed,

    /// The OS entropy source refused to produce random bytes.
    #[error("random number generator failed: {reason}")]
    Rng {
        /// Description of the RNG failure.
        reason: String,
    },
}
