//! Fuzz target for `codec::read_record`.
//!
//! A conversation file is untrusted input: a corrupted disk, a crafted
//! backup, or a partially-written crash artifact can all hand arbitrary
//! bytes to the record reader. This should never panic, only return
//! `RecordSizeInvalid`, `Read`, or `AuthFailed`.

#![no_main]

use std::io::Cursor;

use ledgerlock_core::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let conv_key = [0x11u8; 32];
    let master_key = [0x22u8; 32];
    let mut cursor = Cursor::new(data);
    let _ = codec::read_record(&mut cursor, &conv_key, &master_key);
});
