//! The in-memory view of a conversation, and the status total order used to
//! fold repeated delivery observations into one value.

/// Delivery status of a message, in ascending rank order.
///
/// The discriminants are the wire values written into Message and Status
/// records, do not reorder them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatHistoryStatus {
    /// Sent to the server, not yet known to be delivered.
    Sent = 0,
    /// Delivered to at least one recipient device.
    Delivered = 1,
    /// Read by the recipient.
    Read = 2,
    /// Delivery failed.
    Failed = 3,
}

impl ChatHistoryStatus {
    /// Parse a wire status byte, rejecting anything outside the four known
    /// values.
    pub fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Sent),
            1 => Some(Self::Delivered),
            2 => Some(Self::Read),
            3 => Some(Self::Failed),
            _ => None,
        }
    }

    /// The wire byte for this status.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Rank used to fold multiple observations of one message's status into
    /// a single value: `Failed < Sent < Delivered < Read`.
    ///
    /// Note this differs from the wire discriminant order above. The wire
    /// values are a historical artifact of the original protocol, the rank
    /// order is the merge semantics callers actually observe.
    fn rank(self) -> u8 {
        match self {
            Self::Failed => 0,
            Self::Sent => 1,
            Self::Delivered => 2,
            Self::Read => 3,
        }
    }

    /// The higher-ranked of two statuses under the merge order. Ties keep
    /// `self`.
    pub fn better(self, other: Self) -> Self {
        if self.rank() >= other.rank() { self } else { other }
    }
}

/// One materialised history entry, produced only by `load_conversation` and
/// `export_recent_snapshot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHistoryMessage {
    /// Whether this record belongs to a group conversation.
    pub is_group: bool,
    /// Whether the local user sent this message (true) or received it.
    pub outgoing: bool,
    /// True for a system message (no sender, no envelope).
    pub is_system: bool,
    /// Current delivery status after folding in any Status records.
    pub status: ChatHistoryStatus,
    /// Unix timestamp in seconds.
    pub timestamp_sec: u64,
    /// The conversation this message belongs to.
    pub conv_id: String,
    /// Sender identifier. Empty for system messages.
    pub sender: String,
    /// Opaque envelope bytes. Empty for system messages.
    pub envelope: Vec<u8>,
    /// System message text. Empty for envelope messages.
    pub system_text: String,
}

/// Magic prefix identifying an envelope whose bytes embed a correlatable
/// message id, per the wire convention `"MICH" ‖ reserved:2 ‖ msg_id:16`.
const CHAT_ENVELOPE_MAGIC: &[u8; 4] = b"MICH";

/// If `envelope` carries the recognisable chat-envelope prefix, extract its
/// embedded 16-byte message id.
pub fn envelope_msg_id(envelope: &[u8]) -> Option<[u8; 16]> {
    const PREFIX_LEN: usize = 4 + 1 + 1;
    if envelope.len() < PREFIX_LEN + 16 {
        return None;
    }
    if &envelope[..4] != CHAT_ENVELOPE_MAGIC {
        return None;
    }
    let mut id = [0u8; 16];
    id.copy_from_slice(&envelope[PREFIX_LEN..PREFIX_LEN + 16]);
    Some(id)
}

/// Lowercase hex encoding, matching the hex form used for message-id keys
/// and path components.
pub fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rank_order_is_failed_sent_delivered_read() {
        assert_eq!(ChatHistoryStatus::Sent.better(ChatHistoryStatus::Failed), ChatHistoryStatus::Sent);
        assert_eq!(
            ChatHistoryStatus::Delivered.better(ChatHistoryStatus::Sent),
            ChatHistoryStatus::Delivered
        );
        assert_eq!(ChatHistoryStatus::Read.better(ChatHistoryStatus::Delivered), ChatHistoryStatus::Read);
    }

    #[test]
    fn better_does_not_downgrade() {
        assert_eq!(
            ChatHistoryStatus::Delivered.better(ChatHistoryStatus::Sent),
            ChatHistoryStatus::Delivered
        );
        assert_eq!(
            ChatHistoryStatus::Sent.better(ChatHistoryStatus::Delivered),
            ChatHistoryStatus::Delivered
        );
    }

    #[test]
    fn tie_keeps_incumbent_value() {
        assert_eq!(ChatHistoryStatus::Sent.better(ChatHistoryStatus::Sent), ChatHistoryStatus::Sent);
    }

    #[test]
    fn from_wire_rejects_unknown_values() {
        assert_eq!(ChatHistoryStatus::from_wire(0), Some(ChatHistoryStatus::Sent));
        assert_eq!(ChatHistoryStatus::from_wire(3), Some(ChatHistoryStatus::Failed));
        assert_eq!(ChatHistoryStatus::from_wire(4), None);
        assert_eq!(ChatHistoryStatus::from_wire(255), None);
    }

    #[test]
    fn envelope_msg_id_requires_exact_prefix() {
        let mut envelope = b"MICH".to_vec();
        envelope.extend_from_slice(&[0, 0]);
        envelope.extend_from_slice(&[0xAB; 16]);
        assert_eq!(envelope_msg_id(&envelope), Some([0xAB; 16]));

        assert_eq!(envelope_msg_id(b"short"), None);
        assert_eq!(envelope_msg_id(b"NOPE0000000000000000000"), None);
    }

    #[test]
    fn hex_lower_matches_expected_form() {
        assert_eq!(hex_lower(&[0x00, 0xAB, 0xFF]), "00abff");
    }
}
