//! Error types for the session store, record codec and URL utilities.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::types::Field;

/// Errors raised at the session store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be created or opened.
    #[error("failed to open session database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: redb::Error,
    },

    /// A read transaction failed.
    #[error("session read failed: {0}")]
    Read(#[source] redb::Error),

    /// A write transaction failed; the session was not persisted.
    #[error("session write failed: {0}")]
    Write(#[source] redb::Error),

    /// The record could not be encoded or a stored record could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An identity or identity server URL failed validation.
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),
}

impl StoreError {
    pub(crate) fn read<E: Into<redb::Error>>(err: E) -> Self {
        Self::Read(err.into())
    }

    pub(crate) fn write<E: Into<redb::Error>>(err: E) -> Self {
        Self::Write(err.into())
    }
}

/// Errors from the fixed-layout session record codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("{field} is {len} bytes, maximum is {max}")]
    FieldTooLong { field: Field, len: usize, max: usize },

    #[error("{field} contains a NUL byte")]
    EmbeddedNul { field: Field },

    #[error("session id is empty")]
    EmptySessionId,

    #[error("record is {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported record layout version {0}")]
    UnsupportedVersion(u8),

    #[error("{field} slot has no terminator")]
    Unterminated { field: Field },

    #[error("{field} slot has non-zero padding")]
    NonZeroPadding { field: Field },

    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: Field },

    #[error("expiry timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// Errors from percent-decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed percent escape at byte {offset}")]
    MalformedEscape { offset: usize },

    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// A URL that does not match the accepted identity/return-to grammar.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid URL: {0:?}")]
pub struct InvalidUrlError(pub String);

/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
