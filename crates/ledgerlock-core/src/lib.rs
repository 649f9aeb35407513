//! Encrypted, append-only chat-history store for an E2EE messaging client.
//!
//! [`HistoryStore`] is the single stateful handle, scoped to one
//! authenticated local user. It persists every message envelope a client
//! sends or receives, grouped per conversation, so the UI can reconstruct
//! transcripts after restart, without the server ever learning anything
//! beyond opaque ciphertext, and without a stolen device image yielding
//! plaintext absent the OS-bound key-protection secret.
//!
//! # Layout
//!
//! - [`secure_store`] (C1) wraps/unwraps a blob with an OS-scoped secret,
//!   with a pass-through fallback where no such secret exists.
//! - [`master_key`] (C4) owns the per-user master key's lifecycle: load,
//!   create, atomic persistence, transparent re-wrap.
//! - [`codec`] (C5) is the framed, append-only record log.
//! - [`model`] defines the in-memory [`model::ChatHistoryMessage`] view and
//!   the status merge order.
//! - [`path`] obfuscates usernames and conversation ids into on-disk names.
//! - [`history_store`] (C6) is the facade above, routing append/load calls
//!   and enforcing conversation-file ownership.
//!
//! Key derivation (HKDF-SHA256) and AEAD (`XChaCha20-Poly1305`) live in the
//! sibling `ledgerlock-crypto` crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod error;
pub mod history_store;
pub mod master_key;
pub mod model;
pub mod path;
pub mod secure_store;

pub use error::HistoryError;
pub use history_store::HistoryStore;
pub use model::{ChatHistoryMessage, ChatHistoryStatus};
pub use secure_store::{KeyringSecureStore, NoopSecureStore, SecureStore};
