//! Fixed-layout binary encoding of session records.
//!
//! Layout (version 1, 1029 bytes):
//!
//! | offset | size | content                                   |
//! |--------|------|-------------------------------------------|
//! | 0      | 1    | layout version                            |
//! | 1      | 255  | session_id, NUL-terminated, zero-padded   |
//! | 256    | 255  | path                                      |
//! | 511    | 255  | identity                                  |
//! | 766    | 255  | identity_server                           |
//! | 1021   | 8    | expires_on, Unix seconds, big-endian i64  |

use chrono::DateTime;

use super::types::{Field, SessionRecord, MAX_FIELD_LEN};
use crate::error::CodecError;

/// Current record layout version.
pub const LAYOUT_VERSION: u8 = 1;

/// Slot size per string field, including the terminator.
pub const SLOT_LEN: usize = MAX_FIELD_LEN + 1;

/// Total encoded record size.
pub const RECORD_LEN: usize = 1 + 4 * SLOT_LEN + 8;

const EXPIRES_OFFSET: usize = 1 + 4 * SLOT_LEN;

/// Check a single string field against the slot constraints.
pub fn check_field(field: Field, value: &str) -> Result<(), CodecError> {
    if value.len() > MAX_FIELD_LEN {
        return Err(CodecError::FieldTooLong {
            field,
            len: value.len(),
            max: MAX_FIELD_LEN,
        });
    }
    if value.as_bytes().contains(&0) {
        return Err(CodecError::EmbeddedNul { field });
    }
    Ok(())
}

/// Check a session token before it is used as a store key.
pub fn check_session_id(session_id: &str) -> Result<(), CodecError> {
    if session_id.is_empty() {
        return Err(CodecError::EmptySessionId);
    }
    check_field(Field::SessionId, session_id)
}

/// Encode a record. Every field is validated before any byte is written.
pub fn encode(record: &SessionRecord) -> Result<[u8; RECORD_LEN], CodecError> {
    check_session_id(&record.session_id)?;
    for (field, value) in record.fields() {
        check_field(field, value)?;
    }

    let mut buf = [0u8; RECORD_LEN];
    buf[0] = LAYOUT_VERSION;
    for (i, (_, value)) in record.fields().iter().enumerate() {
        let start = 1 + i * SLOT_LEN;
        buf[start..start + value.len()].copy_from_slice(value.as_bytes());
    }
    buf[EXPIRES_OFFSET..].copy_from_slice(&record.expires_on.timestamp().to_be_bytes());
    Ok(buf)
}

/// Decode a record, rejecting anything that is not exactly a valid layout.
pub fn decode(bytes: &[u8]) -> Result<SessionRecord, CodecError> {
    if bytes.len() != RECORD_LEN {
        return Err(CodecError::InvalidLength {
            expected: RECORD_LEN,
            actual: bytes.len(),
        });
    }
    if bytes[0] != LAYOUT_VERSION {
        return Err(CodecError::UnsupportedVersion(bytes[0]));
    }

    let slot = |index: usize, field: Field| {
        let start = 1 + index * SLOT_LEN;
        read_slot(&bytes[start..start + SLOT_LEN], field)
    };
    let session_id = slot(0, Field::SessionId)?;
    let path = slot(1, Field::Path)?;
    let identity = slot(2, Field::Identity)?;
    let identity_server = slot(3, Field::IdentityServer)?;

    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[EXPIRES_OFFSET..]);
    let secs = i64::from_be_bytes(raw);
    let expires_on = DateTime::from_timestamp(secs, 0).ok_or(CodecError::InvalidTimestamp(secs))?;

    if session_id.is_empty() {
        return Err(CodecError::EmptySessionId);
    }

    Ok(SessionRecord {
        session_id,
        path,
        identity,
        identity_server,
        expires_on,
    })
}

fn read_slot(slot: &[u8], field: Field) -> Result<String, CodecError> {
    let end = slot
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::Unterminated { field })?;
    if slot[end..].iter().any(|&b| b != 0) {
        return Err(CodecError::NonZeroPadding { field });
    }
    String::from_utf8(slot[..end].to_vec()).map_err(|_| CodecError::InvalidUtf8 { field })
}
