//! Ledgerlock Cryptographic Primitives
//!
//! Cryptographic building blocks for the encrypted chat-history store. Pure
//! functions with deterministic outputs; randomness is injected through
//! [`SecureRandom`] rather than drawn from global state, which keeps the
//! functions testable and keeps this crate free of any notion of "current
//! user" or "current file".
//!
//! # Key hierarchy
//!
//! ```text
//! Master Key (32 bytes, per user, OS-secret-protected at rest)
//!        │
//!        ▼
//! HKDF-SHA256 → Conversation Key (32 bytes, per conversation)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → Record ciphertext
//! ```
//!
//! The master key never touches disk in the clear on a platform with a
//! usable OS secret store (see `ledgerlock-core::secure_store`); the
//! conversation key is re-derived on demand and never persisted.
//!
//! # Security
//!
//! - Per-conversation keys are deterministic but isolated: compromising one
//!   conversation's key does not expose the master key or any other
//!   conversation's key (one-way HKDF expand).
//! - Every record carries its own random 24-byte nonce; nonce reuse under
//!   the same key is avoided by drawing from a CSPRNG rather than a
//!   per-file counter, since conversation files are appended to across
//!   process restarts and counters would require durable state to avoid
//!   collision.
//! - Authenticated encryption (`XChaCha20-Poly1305`) rejects any tampered
//!   record outright; there is no silent corruption.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aead;
mod error;
mod kdf;
mod rng;

pub use aead::{KEY_SIZE, NONCE_SIZE, TAG_SIZE, open, seal};
pub use error::CryptoError;
pub use kdf::derive_conversation_key;
pub use rng::{OsRandom, SecureRandom};

#[cfg(feature = "testutil")]
pub use rng::{DeterministicRandom, FailingRandom};
