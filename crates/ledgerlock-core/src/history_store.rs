//! History Store facade (C6): the single stateful handle exposed to the UI
//! layer, scoped to one authenticated local user.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{info, instrument};

use ledgerlock_crypto::{self as crypto, SecureRandom};

use crate::codec::{self, MESSAGE_KIND_ENVELOPE, MESSAGE_KIND_SYSTEM, RECORD_META, RECORD_MESSAGE, RECORD_STATUS};
use crate::error::HistoryError;
use crate::master_key::MasterKeyManager;
use crate::model::{envelope_msg_id, hex_lower, ChatHistoryMessage, ChatHistoryStatus};
use crate::path::{conversation_file_name, user_hash};
use crate::secure_store::SecureStore;

/// The append-only, encrypted chat-history store for one local user.
///
/// Owns the master key for as long as it is loaded; files on disk are not
/// safe to share with a second concurrently-running `HistoryStore` against
/// the same user directory.
pub struct HistoryStore {
    store: Box<dyn SecureStore>,
    rng: Box<dyn SecureRandom>,
    conv_dir: PathBuf,
    master_key: MasterKeyManager,
}

impl HistoryStore {
    /// Construct a store that has not yet been initialised for any user.
    ///
    /// `store` and `rng` are injected capabilities: production callers pass
    /// a [`crate::secure_store::KeyringSecureStore`] and
    /// [`ledgerlock_crypto::OsRandom`]; tests pass stubs.
    pub fn new(store: Box<dyn SecureStore>, rng: Box<dyn SecureRandom>) -> Self {
        Self {
            store,
            rng,
            conv_dir: PathBuf::new(),
            master_key: MasterKeyManager::new(PathBuf::new()),
        }
    }

    /// True once [`Self::init`] has successfully loaded or created a master
    /// key.
    pub fn is_initialised(&self) -> bool {
        self.master_key.key().is_some()
    }

    /// Bind this store to `(state_dir, username)`, creating the user's
    /// directory tree and loading or generating its master key.
    ///
    /// # Errors
    ///
    /// [`HistoryError::StateDirEmpty`] / [`HistoryError::UsernameEmpty`] on
    /// obvious misuse, or any error from the master-key manager.
    #[instrument(skip(self))]
    pub fn init(&mut self, state_dir: &std::path::Path, username: &str) -> Result<(), HistoryError> {
        if state_dir.as_os_str().is_empty() {
            return Err(HistoryError::StateDirEmpty);
        }
        if username.is_empty() {
            return Err(HistoryError::UsernameEmpty);
        }

        let user_dir = state_dir.join("history").join(user_hash(username));
        self.conv_dir = user_dir.join("conversations");
        fs::create_dir_all(&self.conv_dir).map_err(|err| HistoryError::CreateFailed { reason: err.to_string() })?;

        self.master_key = MasterKeyManager::new(user_dir.join("history_key.bin"));
        self.master_key.ensure_loaded(self.store.as_ref(), self.rng.as_ref())?;
        info!("chat history store initialised");
        Ok(())
    }

    fn conversation_path(&self, is_group: bool, conv_id: &str) -> PathBuf {
        self.conv_dir.join(conversation_file_name(is_group, conv_id))
    }

    fn conversation_key(&self, is_group: bool, conv_id: &str) -> Result<[u8; crypto::KEY_SIZE], HistoryError> {
        if conv_id.is_empty() {
            return Err(HistoryError::ConvIdEmpty);
        }
        let master = self.master_key.key().ok_or(HistoryError::KeyNotLoaded)?;
        Ok(crypto::derive_conversation_key(master, is_group, conv_id))
    }

    fn ensure_conversation_file(&self, is_group: bool, conv_id: &str) -> Result<PathBuf, HistoryError> {
        let master = self.master_key.key().ok_or(HistoryError::KeyNotLoaded)?;
        let path = self.conversation_path(is_group, conv_id);
        codec::ensure_conversation_file(&path, master, is_group, conv_id, self.rng.as_ref())?;
        Ok(path)
    }

    /// Append a Message/envelope record: a delivered opaque envelope with
    /// its sender and initial status.
    #[instrument(skip(self, envelope))]
    pub fn append_envelope(
        &mut self,
        is_group: bool,
        outgoing: bool,
        conv_id: &str,
        sender: &str,
        envelope: &[u8],
        status: ChatHistoryStatus,
        timestamp_sec: u64,
    ) -> Result<(), HistoryError> {
        self.master_key.ensure_loaded(self.store.as_ref(), self.rng.as_ref())?;
        if conv_id.is_empty() {
            return Err(HistoryError::ConvIdEmpty);
        }
        if envelope.is_empty() {
            return Err(HistoryError::EnvelopeEmpty);
        }

        let path = self.ensure_conversation_file(is_group, conv_id)?;
        let conv_key = self.conversation_key(is_group, conv_id)?;

        let mut record = Vec::with_capacity(5 + 8 + 4 + sender.len() + 4 + envelope.len());
        record.push(RECORD_MESSAGE);
        record.push(MESSAGE_KIND_ENVELOPE);
        record.push(u8::from(is_group));
        record.push(u8::from(outgoing));
        record.push(status.to_wire());
        codec::write_u64(&mut record, timestamp_sec);
        codec::write_string(&mut record, sender);
        codec::write_bytes(&mut record, envelope);

        let mut file = codec::open_for_append(&path)?;
        codec::write_record(&mut file, &conv_key, &record, self.rng.as_ref())
    }

    /// Append a Message/system record: a locally synthesised system message
    /// with no sender, not outgoing, status `Sent`.
    #[instrument(skip(self))]
    pub fn append_system(
        &mut self,
        is_group: bool,
        conv_id: &str,
        text_utf8: &str,
        timestamp_sec: u64,
    ) -> Result<(), HistoryError> {
        self.master_key.ensure_loaded(self.store.as_ref(), self.rng.as_ref())?;
        if conv_id.is_empty() {
            return Err(HistoryError::ConvIdEmpty);
        }
        if text_utf8.is_empty() {
            return Err(HistoryError::SystemTextEmpty);
        }

        let path = self.ensure_conversation_file(is_group, conv_id)?;
        let conv_key = self.conversation_key(is_group, conv_id)?;

        let mut record = Vec::with_capacity(5 + 8 + 4 + text_utf8.len());
        record.push(RECORD_MESSAGE);
        record.push(MESSAGE_KIND_SYSTEM);
        record.push(u8::from(is_group));
        record.push(0);
        record.push(ChatHistoryStatus::Sent.to_wire());
        codec::write_u64(&mut record, timestamp_sec);
        codec::write_string(&mut record, text_utf8);

        let mut file = codec::open_for_append(&path)?;
        codec::write_record(&mut file, &conv_key, &record, self.rng.as_ref())
    }

    /// Append a Status record: a hint applied to a prior Message record
    /// during load, not a verified reference.
    #[instrument(skip(self))]
    pub fn append_status_update(
        &mut self,
        is_group: bool,
        conv_id: &str,
        msg_id: &[u8; 16],
        status: ChatHistoryStatus,
        timestamp_sec: u64,
    ) -> Result<(), HistoryError> {
        self.master_key.ensure_loaded(self.store.as_ref(), self.rng.as_ref())?;
        if conv_id.is_empty() {
            return Err(HistoryError::ConvIdEmpty);
        }
        if msg_id.iter().all(|&b| b == 0) {
            return Err(HistoryError::MsgIdEmpty);
        }

        let path = self.ensure_conversation_file(is_group, conv_id)?;
        let conv_key = self.conversation_key(is_group, conv_id)?;

        let mut record = Vec::with_capacity(1 + 1 + 1 + 8 + 16);
        record.push(RECORD_STATUS);
        record.push(u8::from(is_group));
        record.push(status.to_wire());
        codec::write_u64(&mut record, timestamp_sec);
        record.extend_from_slice(msg_id);

        let mut file = codec::open_for_append(&path)?;
        codec::write_record(&mut file, &conv_key, &record, self.rng.as_ref())
    }

    /// Load and materialise a conversation, folding in any Status records
    /// observed during the scan.
    ///
    /// Returns an empty list (not an error) when the master key is not
    /// loaded or the conversation file does not exist.
    ///
    /// `limit == 0` returns the whole conversation; `limit == k > 0` returns
    /// at most the `k` most recent messages.
    #[instrument(skip(self))]
    pub fn load_conversation(
        &self,
        is_group: bool,
        conv_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatHistoryMessage>, HistoryError> {
        let Some(master) = self.master_key.key() else {
            return Ok(Vec::new());
        };
        if master.iter().all(|&b| b == 0) {
            return Ok(Vec::new());
        }
        if conv_id.is_empty() {
            return Err(HistoryError::ConvIdEmpty);
        }

        let conv_key = crypto::derive_conversation_key(master, is_group, conv_id);
        let path = self.conversation_path(is_group, conv_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let Some(mut file) = codec::open_and_verify_header(&path)? else {
            return Ok(Vec::new());
        };
        scan_conversation(&mut file, &conv_key, master, is_group, conv_id, limit)
    }

    /// Enumerate the conversations directory and return a snapshot of
    /// recent messages across conversations, most-recently-active first.
    ///
    /// `max_conversations == 0` and `max_messages_per_conversation == 0`
    /// both mean "no cap".
    #[instrument(skip(self))]
    pub fn export_recent_snapshot(
        &self,
        max_conversations: usize,
        max_messages_per_conversation: usize,
    ) -> Result<Vec<ChatHistoryMessage>, HistoryError> {
        let Some(master) = self.master_key.key() else {
            return Ok(Vec::new());
        };
        if master.iter().all(|&b| b == 0) {
            return Ok(Vec::new());
        }
        if self.conv_dir.as_os_str().is_empty() {
            return Ok(Vec::new());
        }

        let mut conversations: Vec<(u64, Vec<ChatHistoryMessage>)> = Vec::new();

        let entries = match fs::read_dir(&self.conv_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let Ok(Some(mut file)) = codec::open_and_verify_header(&path) else {
                continue;
            };
            let Ok(Some(meta_plain)) = codec::read_record(&mut file, master, master) else {
                continue;
            };
            if meta_plain.len() < 2 || meta_plain[0] != RECORD_META {
                continue;
            }
            let mut offset = 1;
            let is_group = meta_plain[offset] != 0;
            offset += 1;
            let Some(conv_id) = codec::read_string(&meta_plain, &mut offset) else {
                continue;
            };
            if offset != meta_plain.len() || conv_id.is_empty() {
                continue;
            }

            let Ok(messages) = self.load_conversation(is_group, &conv_id, max_messages_per_conversation) else {
                continue;
            };
            if messages.is_empty() {
                continue;
            }

            let last_ts = messages.iter().map(|m| m.timestamp_sec).max().unwrap_or(0);
            conversations.push((last_ts, messages));
        }

        conversations.sort_by(|a, b| b.0.cmp(&a.0));
        if max_conversations > 0 && conversations.len() > max_conversations {
            conversations.truncate(max_conversations);
        }

        Ok(conversations.into_iter().flat_map(|(_, msgs)| msgs).collect())
    }
}

#[allow(clippy::too_many_arguments)]
fn scan_conversation(
    file: &mut fs::File,
    conv_key: &[u8; crypto::KEY_SIZE],
    master_key: &[u8; crypto::KEY_SIZE],
    is_group: bool,
    conv_id: &str,
    limit: usize,
) -> Result<Vec<ChatHistoryMessage>, HistoryError> {
    let mut messages: Vec<ChatHistoryMessage> = if limit > 0 { Vec::with_capacity(limit) } else { Vec::new() };
    let mut status_by_id: HashMap<String, ChatHistoryStatus> = HashMap::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    loop {
        let Some(plain) = codec::read_record(file, conv_key, master_key)? else {
            break;
        };
        if plain.is_empty() {
            continue;
        }
        let record_type = plain[0];
        let mut offset = 1;

        match record_type {
            t if t == RECORD_META => continue,
            t if t == RECORD_STATUS => {
                if offset + 1 + 1 + 8 + 16 > plain.len() {
                    continue;
                }
                let rec_group = plain[offset] != 0;
                offset += 1;
                let raw_status = plain[offset];
                offset += 1;
                if rec_group != is_group {
                    continue;
                }
                let Some(status) = ChatHistoryStatus::from_wire(raw_status) else {
                    continue;
                };
                let Some(_ts) = codec::read_u64(&plain, &mut offset) else {
                    continue;
                };
                if offset + 16 != plain.len() {
                    continue;
                }
                let msg_id = &plain[offset..offset + 16];
                let id_hex = hex_lower(msg_id);

                let merged = status_by_id
                    .get(&id_hex)
                    .map_or(status, |&existing| existing.better(status));
                status_by_id.insert(id_hex.clone(), merged);

                if let Some(&idx) = index_by_id.get(&id_hex) {
                    if let Some(existing) = messages.get_mut(idx) {
                        existing.status = existing.status.better(merged);
                    }
                }
            }
            t if t == RECORD_MESSAGE => {
                if offset + 1 + 1 + 1 + 1 + 8 > plain.len() {
                    continue;
                }
                let kind = plain[offset];
                offset += 1;
                let rec_group = plain[offset] != 0;
                offset += 1;
                let outgoing = plain[offset] != 0;
                offset += 1;
                let raw_status = plain[offset];
                offset += 1;
                if rec_group != is_group {
                    continue;
                }
                let Some(status) = ChatHistoryStatus::from_wire(raw_status) else {
                    continue;
                };
                let Some(timestamp_sec) = codec::read_u64(&plain, &mut offset) else {
                    continue;
                };

                match kind {
                    k if k == MESSAGE_KIND_ENVELOPE => {
                        let Some(sender) = codec::read_string(&plain, &mut offset) else {
                            continue;
                        };
                        let Some(envelope) = codec::read_bytes(&plain, &mut offset) else {
                            continue;
                        };
                        if offset != plain.len() {
                            continue;
                        }

                        let mut message = ChatHistoryMessage {
                            is_group: rec_group,
                            outgoing,
                            is_system: false,
                            status,
                            timestamp_sec,
                            conv_id: conv_id.to_string(),
                            sender,
                            envelope,
                            system_text: String::new(),
                        };

                        if let Some(msg_id) = envelope_msg_id(&message.envelope) {
                            let id_hex = hex_lower(&msg_id);
                            if let Some(&seen_status) = status_by_id.get(&id_hex) {
                                message.status = message.status.better(seen_status);
                            }
                            if let Some(&idx) = index_by_id.get(&id_hex) {
                                if let Some(existing) = messages.get_mut(idx) {
                                    existing.is_group = rec_group;
                                    existing.outgoing = outgoing;
                                    existing.is_system = false;
                                    existing.status = existing.status.better(message.status);
                                    existing.sender = message.sender;
                                    existing.envelope = message.envelope;
                                    continue;
                                }
                            }
                            index_by_id.insert(id_hex, messages.len());
                        }
                        messages.push(message);
                    }
                    k if k == MESSAGE_KIND_SYSTEM => {
                        let Some(system_text) = codec::read_string(&plain, &mut offset) else {
                            continue;
                        };
                        if offset != plain.len() {
                            continue;
                        }
                        messages.push(ChatHistoryMessage {
                            is_group: rec_group,
                            outgoing,
                            is_system: true,
                            status,
                            timestamp_sec,
                            conv_id: conv_id.to_string(),
                            sender: String::new(),
                            envelope: Vec::new(),
                            system_text,
                        });
                    }
                    _ => continue,
                }
            }
            _ => continue,
        }
    }

    if limit > 0 && messages.len() > limit {
        let drop = messages.len() - limit;
        messages.drain(0..drop);
    }

    Ok(messages)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::secure_store::NoopSecureStore;
    use ledgerlock_crypto::DeterministicRandom;
    use tempfile::tempdir;

    fn store(seed: u8) -> HistoryStore {
        HistoryStore::new(Box::new(NoopSecureStore), Box::new(DeterministicRandom::from_seed([seed; 32])))
    }

    fn chat_envelope(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut envelope = b"MICH".to_vec();
        envelope.extend_from_slice(&[0, 0]);
        envelope.extend_from_slice(&[id; 16]);
        envelope.extend_from_slice(payload);
        envelope
    }

    fn msg_id_bytes(id: u8) -> [u8; 16] {
        [id; 16]
    }

    #[test]
    fn s1_single_envelope_round_trip() {
        let dir = tempdir().unwrap();
        let mut history = store(1);
        history.init(dir.path(), "alice").unwrap();

        history
            .append_envelope(false, true, "bob", "alice", &[0x01, 0x02, 0x03], ChatHistoryStatus::Sent, 1000)
            .unwrap();

        let messages = history.load_conversation(false, "bob", 0).unwrap();
        assert_eq!(messages.len(), 1);
        let m = &messages[0];
        assert!(m.outgoing);
        assert_eq!(m.sender, "alice");
        assert_eq!(m.envelope, vec![0x01, 0x02, 0x03]);
        assert_eq!(m.status, ChatHistoryStatus::Sent);
        assert_eq!(m.timestamp_sec, 1000);
    }

    #[test]
    fn s2_status_upgrade_via_status_record() {
        let dir = tempdir().unwrap();
        let mut history = store(2);
        history.init(dir.path(), "alice").unwrap();

        let envelope = chat_envelope(0xAA, b"hi");
        history
            .append_envelope(false, true, "bob", "alice", &envelope, ChatHistoryStatus::Sent, 1000)
            .unwrap();
        history
            .append_status_update(false, "bob", &msg_id_bytes(0xAA), ChatHistoryStatus::Delivered, 1100)
            .unwrap();

        let messages = history.load_conversation(false, "bob", 0).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].status, ChatHistoryStatus::Delivered);
    }

    #[test]
    fn s3_status_cannot_downgrade() {
        let dir = tempdir().unwrap();
        let mut history = store(3);
        history.init(dir.path(), "alice").unwrap();

        let envelope = chat_envelope(0xBB, b"hi");
        history
            .append_envelope(false, true, "bob", "alice", &envelope, ChatHistoryStatus::Sent, 1000)
            .unwrap();
        history
            .append_status_update(false, "bob", &msg_id_bytes(0xBB), ChatHistoryStatus::Delivered, 1100)
            .unwrap();
        history
            .append_status_update(false, "bob", &msg_id_bytes(0xBB), ChatHistoryStatus::Sent, 1200)
            .unwrap();

        let messages = history.load_conversation(false, "bob", 0).unwrap();
        assert_eq!(messages[0].status, ChatHistoryStatus::Delivered);
    }

    #[test]
    fn s4_wrong_group_flag_yields_empty_load() {
        let dir = tempdir().unwrap();
        let mut history = store(4);
        history.init(dir.path(), "alice").unwrap();

        history
            .append_envelope(true, true, "g1", "alice", &[1, 2, 3], ChatHistoryStatus::Sent, 1000)
            .unwrap();

        let messages = history.load_conversation(false, "g1", 0).unwrap();
        assert!(messages.is_empty(), "direct and group variants hash to different files");
    }

    #[test]
    fn s5_two_conversations_ordered_snapshot() {
        let dir = tempdir().unwrap();
        let mut history = store(5);
        history.init(dir.path(), "alice").unwrap();

        history
            .append_envelope(false, true, "alice-conv", "me", &[1], ChatHistoryStatus::Sent, 1000)
            .unwrap();
        history
            .append_envelope(false, true, "bob-conv", "me", &[2], ChatHistoryStatus::Sent, 1050)
            .unwrap();
        history
            .append_envelope(false, true, "bob-conv", "me", &[3], ChatHistoryStatus::Sent, 2000)
            .unwrap();

        let snapshot = history.export_recent_snapshot(0, 0).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].conv_id, "bob-conv");
        assert_eq!(snapshot[1].conv_id, "bob-conv");
        assert_eq!(snapshot[2].conv_id, "alice-conv");
    }

    #[test]
    fn s6_corrupted_tag_causes_auth_failed() {
        use std::io::{Seek, SeekFrom, Write};

        let dir = tempdir().unwrap();
        let mut history = store(6);
        history.init(dir.path(), "alice").unwrap();
        history
            .append_envelope(false, true, "bob", "alice", &[1, 2, 3], ChatHistoryStatus::Sent, 1000)
            .unwrap();

        let path = history.conversation_path(false, "bob");
        let mut file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        let len = file.metadata().unwrap().len();
        file.seek(SeekFrom::Start(len - 1)).unwrap();
        file.write_all(&[0xFF]).unwrap();

        let err = history.load_conversation(false, "bob", 0).unwrap_err();
        assert_eq!(err, HistoryError::AuthFailed);
    }

    #[test]
    fn limit_zero_returns_all_limit_k_returns_tail() {
        let dir = tempdir().unwrap();
        let mut history = store(7);
        history.init(dir.path(), "alice").unwrap();

        for i in 0..5u64 {
            history
                .append_envelope(false, true, "bob", "alice", &[i as u8], ChatHistoryStatus::Sent, 1000 + i)
                .unwrap();
        }

        let all = history.load_conversation(false, "bob", 0).unwrap();
        assert_eq!(all.len(), 5);

        let tail = history.load_conversation(false, "bob", 2).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].timestamp_sec, 1003);
        assert_eq!(tail[1].timestamp_sec, 1004);
    }

    #[test]
    fn export_recent_snapshot_zero_zero_means_no_cap() {
        let dir = tempdir().unwrap();
        let mut history = store(8);
        history.init(dir.path(), "alice").unwrap();
        for i in 0..3u64 {
            history
                .append_envelope(false, true, "bob", "alice", &[i as u8], ChatHistoryStatus::Sent, 1000 + i)
                .unwrap();
        }

        let snapshot = history.export_recent_snapshot(0, 0).unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn uninitialised_store_returns_empty_load_not_error() {
        let history = store(9);
        let messages = history.load_conversation(false, "bob", 0).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn append_is_one_time_effect_on_meta_record() {
        let dir = tempdir().unwrap();
        let mut history = store(10);
        history.init(dir.path(), "alice").unwrap();

        history
            .append_envelope(false, true, "bob", "alice", &[1], ChatHistoryStatus::Sent, 1000)
            .unwrap();
        history
            .append_envelope(false, true, "bob", "alice", &[2], ChatHistoryStatus::Sent, 1001)
            .unwrap();

        let messages = history.load_conversation(false, "bob", 0).unwrap();
        assert_eq!(messages.len(), 2, "exactly two Message records, no duplicate Meta");
    }

    #[test]
    fn append_validates_empty_arguments() {
        let dir = tempdir().unwrap();
        let mut history = store(11);
        history.init(dir.path(), "alice").unwrap();

        assert_eq!(
            history.append_envelope(false, true, "", "alice", &[1], ChatHistoryStatus::Sent, 1000).unwrap_err(),
            HistoryError::ConvIdEmpty
        );
        assert_eq!(
            history.append_envelope(false, true, "bob", "alice", &[], ChatHistoryStatus::Sent, 1000).unwrap_err(),
            HistoryError::EnvelopeEmpty
        );
        assert_eq!(
            history.append_system(false, "bob", "", 1000).unwrap_err(),
            HistoryError::SystemTextEmpty
        );
        assert_eq!(
            history.append_status_update(false, "bob", &[0u8; 16], ChatHistoryStatus::Sent, 1000).unwrap_err(),
            HistoryError::MsgIdEmpty
        );
    }

    #[test]
    fn init_validates_empty_arguments() {
        let mut history = store(12);
        assert_eq!(
            history.init(std::path::Path::new(""), "alice").unwrap_err(),
            HistoryError::StateDirEmpty
        );

        let dir = tempdir().unwrap();
        assert_eq!(history.init(dir.path(), "").unwrap_err(), HistoryError::UsernameEmpty);
    }

    #[test]
    fn is_initialised_reflects_init_call() {
        let dir = tempdir().unwrap();
        let mut history = store(13);
        assert!(!history.is_initialised());
        history.init(dir.path(), "alice").unwrap();
        assert!(history.is_initialised());
    }
}
