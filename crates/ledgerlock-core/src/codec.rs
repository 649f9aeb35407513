//! Conversation-file codec (C5): the framed, append-only record log.
//!
//! File layout: 8-byte magic ‖ 1-byte version, then zero or more records of
//! `len:u32-le ‖ nonce:24 ‖ ciphertext:len ‖ tag:16`. Every record's
//! plaintext begins with a one-byte record-type discriminant.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use ledgerlock_crypto::{self as crypto, SecureRandom};

use crate::error::HistoryError;

/// 8-byte file magic.
pub const MAGIC: &[u8; 8] = b"MIHLOG01";
/// Format version byte following the magic.
pub const VERSION: u8 = 1;
/// Combined length of magic + version.
pub const HEADER_LEN: usize = MAGIC.len() + 1;

/// Record type: the first and only record written when a file is created.
pub const RECORD_META: u8 = 1;
/// Record type: an envelope or system message.
pub const RECORD_MESSAGE: u8 = 2;
/// Record type: a status update for a previously written message.
pub const RECORD_STATUS: u8 = 3;

/// Message record sub-kind: an opaque delivered envelope.
pub const MESSAGE_KIND_ENVELOPE: u8 = 1;
/// Message record sub-kind: a locally synthesised system message.
pub const MESSAGE_KIND_SYSTEM: u8 = 2;

const MAX_RECORD_CIPHER_LEN: u32 = 2 * 1024 * 1024;

fn all_zero(key: &[u8; crypto::KEY_SIZE]) -> bool {
    key.iter().all(|&b| b == 0)
}

/// Append-frame one plaintext record under `key`.
///
/// # Errors
///
/// [`HistoryError::RecordEmpty`] if `plaintext` is empty,
/// [`HistoryError::KeyInvalid`] if `key` is all-zero,
/// [`HistoryError::Rng`] if nonce generation fails,
/// [`HistoryError::RecordTooLarge`] if the ciphertext would not fit a u32
/// length prefix, [`HistoryError::Write`] on I/O failure.
pub fn write_record(
    out: &mut File,
    key: &[u8; crypto::KEY_SIZE],
    plaintext: &[u8],
    rng: &dyn SecureRandom,
) -> Result<(), HistoryError> {
    if plaintext.is_empty() {
        return Err(HistoryError::RecordEmpty);
    }
    if all_zero(key) {
        return Err(HistoryError::KeyInvalid);
    }

    let mut nonce = [0u8; crypto::NONCE_SIZE];
    rng.fill(&mut nonce).map_err(HistoryError::from)?;

    let sealed = crypto::seal(key, &nonce, plaintext);
    let cipher_len = u32::try_from(sealed.len())
        .map_err(|_| HistoryError::RecordTooLarge { len: sealed.len() })?;

    out.write_all(&cipher_len.to_le_bytes())
        .and_then(|()| out.write_all(&nonce))
        .and_then(|()| out.write_all(&sealed))
        .map_err(|err| HistoryError::Write { reason: err.to_string() })
}

/// Read and decrypt the next record from `input`.
///
/// Returns `Ok(None)` on a clean end-of-file (no bytes of the next length
/// prefix were available). A short read *after* the length prefix was
/// consumed is a [`HistoryError::Read`], not a clean EOF, since it indicates
/// a truncated trailing record.
///
/// Tries `conv_key` first, then `master_key`, so that the Meta record
/// (always written under the master key) and any legacy record can both be
/// read back alongside conversation-keyed message records.
///
/// # Errors
///
/// [`HistoryError::RecordSizeInvalid`] if the declared length is outside
/// `(0, 2 MiB]`, [`HistoryError::Read`] on a truncated record,
/// [`HistoryError::AuthFailed`] if neither key authenticates the record.
pub fn read_record(
    input: &mut impl Read,
    conv_key: &[u8; crypto::KEY_SIZE],
    master_key: &[u8; crypto::KEY_SIZE],
) -> Result<Option<Vec<u8>>, HistoryError> {
    let mut len_bytes = [0u8; 4];
    match read_exact_or_eof(input, &mut len_bytes)? {
        ReadOutcome::Eof => return Ok(None),
        ReadOutcome::Full => {}
    }
    let cipher_len = u32::from_le_bytes(len_bytes);
    if cipher_len == 0 || cipher_len > MAX_RECORD_CIPHER_LEN {
        return Err(HistoryError::RecordSizeInvalid { len: cipher_len });
    }

    let mut nonce = [0u8; crypto::NONCE_SIZE];
    input
        .read_exact(&mut nonce)
        .map_err(|err| HistoryError::Read { reason: err.to_string() })?;

    let mut sealed = vec![0u8; cipher_len as usize];
    input
        .read_exact(&mut sealed)
        .map_err(|err| HistoryError::Read { reason: err.to_string() })?;

    if !all_zero(conv_key) {
        if let Ok(plain) = crypto::open(conv_key, &nonce, &sealed) {
            return Ok(Some(plain));
        }
    }
    if !all_zero(master_key) {
        if let Ok(plain) = crypto::open(master_key, &nonce, &sealed) {
            return Ok(Some(plain));
        }
    }
    Err(HistoryError::AuthFailed)
}

enum ReadOutcome {
    Full,
    Eof,
}

fn read_exact_or_eof(input: &mut impl Read, buf: &mut [u8]) -> Result<ReadOutcome, HistoryError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = input
            .read(&mut buf[filled..])
            .map_err(|err| HistoryError::Read { reason: err.to_string() })?;
        if n == 0 {
            if filled == 0 {
                return Ok(ReadOutcome::Eof);
            }
            return Err(HistoryError::Read { reason: "truncated record".to_string() });
        }
        filled += n;
    }
    Ok(ReadOutcome::Full)
}

/// Create a new conversation file: write the header, then one Meta record
/// under the master key. No-op if the file already exists.
///
/// # Errors
///
/// [`HistoryError::CreateFailed`] on any I/O failure.
pub fn ensure_conversation_file(
    path: &Path,
    master_key: &[u8; crypto::KEY_SIZE],
    is_group: bool,
    conv_id: &str,
    rng: &dyn SecureRandom,
) -> Result<(), HistoryError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| HistoryError::CreateFailed { reason: err.to_string() })?;
    }

    let mut out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|err| HistoryError::CreateFailed { reason: err.to_string() })?;

    out.write_all(MAGIC.as_slice())
        .and_then(|()| out.write_all(&[VERSION]))
        .map_err(|err| HistoryError::CreateFailed { reason: err.to_string() })?;

    let mut meta = Vec::with_capacity(2 + 4 + conv_id.len());
    meta.push(RECORD_META);
    meta.push(u8::from(is_group));
    write_string(&mut meta, conv_id);

    write_record(&mut out, master_key, &meta, rng).map_err(|err| HistoryError::CreateFailed {
        reason: err.to_string(),
    })?;

    out.flush().map_err(|err| HistoryError::CreateFailed { reason: err.to_string() })
}

/// Open an existing conversation file in append mode.
pub fn open_for_append(path: &Path) -> Result<File, HistoryError> {
    OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|err| HistoryError::Write { reason: err.to_string() })
}

/// Open an existing conversation file for reading and verify its header.
///
/// Returns `Ok(None)` when the file is shorter than the header and so holds
/// no readable records, not an error; a truncated or freshly-created file is
/// treated as an empty conversation rather than a failure.
///
/// # Errors
///
/// [`HistoryError::Open`] if the file cannot be opened,
/// [`HistoryError::MagicMismatch`] if a full header was read but does not
/// match.
pub fn open_and_verify_header(path: &Path) -> Result<Option<File>, HistoryError> {
    let mut file = File::open(path).map_err(|err| HistoryError::Open { reason: err.to_string() })?;
    let mut header = [0u8; HEADER_LEN];
    if let Err(err) = file.read_exact(&mut header) {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(HistoryError::Open { reason: err.to_string() });
    }
    if &header[..MAGIC.len()] != MAGIC.as_slice() || header[MAGIC.len()] != VERSION {
        return Err(HistoryError::MagicMismatch);
    }
    Ok(Some(file))
}

/// Append a u32-le length prefix followed by `s`'s UTF-8 bytes.
pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_bytes(buf, s.as_bytes());
}

/// Append a u32-le length prefix followed by `bytes`.
pub fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Append a u64-le integer.
pub fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Read a u32-le-prefixed byte string starting at `*offset`, advancing it.
pub fn read_bytes(buf: &[u8], offset: &mut usize) -> Option<Vec<u8>> {
    let len_bytes = buf.get(*offset..*offset + 4)?;
    let len = u32::from_le_bytes(len_bytes.try_into().ok()?) as usize;
    let start = *offset + 4;
    let value = buf.get(start..start + len)?;
    *offset = start + len;
    Some(value.to_vec())
}

/// Read a u32-le-prefixed UTF-8 string starting at `*offset`, advancing it.
pub fn read_string(buf: &[u8], offset: &mut usize) -> Option<String> {
    let bytes = read_bytes(buf, offset)?;
    String::from_utf8(bytes).ok()
}

/// Read a u64-le integer starting at `*offset`, advancing it.
pub fn read_u64(buf: &[u8], offset: &mut usize) -> Option<u64> {
    let bytes = buf.get(*offset..*offset + 8)?;
    *offset += 8;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}
