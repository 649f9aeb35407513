//! Error types for the chat-history store.
//!
//! One flat enum covers every failure kind from the secure-store adapter,
//! the master-key manager, the conversation-file codec, and the history
//! store facade, rather than scattering a separate error type across each
//! component's public API.

use thiserror::Error;

use ledgerlock_crypto::CryptoError;

/// Everything that can go wrong while operating the chat-history store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// `init` was called with an empty state directory path.
    #[error("state directory path is empty")]
    StateDirEmpty,

    /// `init` was called with an empty username.
    #[error("username is empty")]
    UsernameEmpty,

    /// A conversation id was empty where one was required.
    #[error("conversation id is empty")]
    ConvIdEmpty,

    /// An envelope to append was empty.
    #[error("envelope is empty")]
    EnvelopeEmpty,

    /// A system-message text to append was empty.
    #[error("system message text is empty")]
    SystemTextEmpty,

    /// A status-update message id was all-zero.
    #[error("message id is empty")]
    MsgIdEmpty,

    /// The random number generator refused to produce bytes.
    #[error("random number generator failed: {reason}")]
    Rng {
        /// Description of the RNG failure.
        reason: String,
    },

    /// The OS secure store refused to wrap plaintext.
    #[error("secure store wrap failed: {reason}")]
    SecureStoreWrap {
        /// Description of the failure.
        reason: String,
    },

    /// The OS secure store refused to unwrap a blob.
    #[error("secure store unwrap failed: {reason}")]
    SecureStoreUnwrap {
        /// Description of the failure.
        reason: String,
    },

    /// `protect` was called with empty plaintext.
    #[error("secure store input is empty")]
    SecureStorePlainEmpty,

    /// A wrapped blob's header was truncated or its declared length did not
    /// match the remaining input.
    #[error("secure store blob framing is invalid")]
    SecureStoreFraming,

    /// The master key is missing, zero, or otherwise cannot be used.
    #[error("master key is not usable")]
    KeyInvalid,

    /// An operation needed the master key but it was never loaded.
    #[error("master key is not loaded")]
    KeyNotLoaded,

    /// The on-disk master-key file exceeded the 64 KiB sanity bound.
    #[error("master key file is too large ({size} bytes)")]
    KeyTooLarge {
        /// Observed file size in bytes.
        size: u64,
    },

    /// The unwrapped master key was not exactly 32 bytes.
    #[error("master key has invalid length ({len} bytes)")]
    KeyLengthInvalid {
        /// Observed length in bytes.
        len: usize,
    },

    /// Atomically persisting the master key failed.
    #[error("failed to write master key: {reason}")]
    KeyWrite {
        /// Description of the I/O failure.
        reason: String,
    },

    /// Creating a new conversation file failed.
    #[error("failed to create conversation file: {reason}")]
    CreateFailed {
        /// Description of the I/O failure.
        reason: String,
    },

    /// Writing to a conversation file failed.
    #[error("failed to write history record: {reason}")]
    Write {
        /// Description of the I/O failure.
        reason: String,
    },

    /// Reading from a conversation file failed (a short read after the
    /// record length was consumed, not a clean end-of-file).
    #[error("failed to read history record: {reason}")]
    Read {
        /// Description of the I/O failure.
        reason: String,
    },

    /// Opening a conversation file for reading failed.
    #[error("failed to open history file: {reason}")]
    Open {
        /// Description of the I/O failure.
        reason: String,
    },

    /// A conversation file's header did not match the expected magic and
    /// version.
    #[error("history file magic/version mismatch")]
    MagicMismatch,

    /// A record's declared ciphertext length was outside `(0, 2 MiB]`.
    #[error("history record size invalid ({len} bytes)")]
    RecordSizeInvalid {
        /// The out-of-range length that was read from disk.
        len: u32,
    },

    /// A record's ciphertext would not fit in a `u32` length prefix.
    #[error("history record too large ({len} bytes)")]
    RecordTooLarge {
        /// The ciphertext length that overflowed the framing.
        len: usize,
    },

    /// A record's plaintext was empty before encryption.
    #[error("history record plaintext is empty")]
    RecordEmpty,

    /// Neither the conversation key nor the master key authenticated a
    /// record.
    #[error("history record authentication failed")]
    AuthFailed,
}

impl HistoryError {
    /// True if this error reflects caller misuse (bad argument) rather than
    /// an environmental failure (I/O, RNG, tampering).
    ///
    /// Argument errors are never worth retrying; environmental errors might
    /// be, depending on the caller's policy.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::StateDirEmpty
                | Self::UsernameEmpty
                | Self::ConvIdEmpty
                | Self::EnvelopeEmpty
                | Self::SystemTextEmpty
                | Self::MsgIdEmpty
        )
    }
}

impl From<CryptoError> for HistoryError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AuthFailed => Self::AuthFailed,
            CryptoError::Rng { reason } => Self::Rng { reason },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_are_classified() {
        assert!(HistoryError::ConvIdEmpty.is_argument_error());
        assert!(HistoryError::EnvelopeEmpty.is_argument_error());
        assert!(!HistoryError::AuthFailed.is_argument_error());
        assert!(!HistoryError::MagicMismatch.is_argument_error());
    }

    #[test]
    fn crypto_auth_failed_maps_through() {
        let err: HistoryError = CryptoError::AuthFailed.into();
        assert_eq!(err, HistoryError::AuthFailed);
    }
}
