//! Error types for MARC decoding and pipeline operations.
//!
//! This module provides the [`MarcError`] type for fatal conditions, the
//! [`Result`] convenience type, and [`Diagnostic`] for non-fatal conditions
//! observed while decoding a single record.
//!
//! Fatal and non-fatal conditions are deliberately separate: a corrupt
//! directory slot or an out-of-bounds field skips only that slot or field and
//! is reported as a [`Diagnostic`], while a malformed leader or a truncated
//! record fails the whole record (or, for truncation, ends the stream).

use thiserror::Error;

/// Error type for all MARC decoding and pipeline operations.
#[derive(Error, Debug)]
pub enum MarcError {
    /// The 24-byte leader is missing or its numeric fields are not digits.
    #[error("Malformed leader: {0}")]
    MalformedLeader(String),

    /// A record's declared length exceeds the bytes actually available.
    #[error("Incomplete record: {0}")]
    IncompleteRecord(String),

    /// The record structure is invalid beyond the leader.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A field's structure is invalid.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// The embedding service failed or returned an unusable response.
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// A bulk index submission failed as a unit.
    #[error("Bulk indexing error: {0}")]
    Indexing(String),

    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error talking to an external collaborator.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;

/// A non-fatal condition observed while decoding a single record.
///
/// Diagnostics are accumulated per record and never abort decoding: the
/// affected directory slot or field is skipped and the rest of the record is
/// still decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A 12-byte directory slot did not parse as tag/length/offset digits.
    DirectoryEntrySkipped {
        /// Zero-based slot index within the directory.
        slot: usize,
        /// What failed to parse.
        reason: String,
    },

    /// A field's computed byte range falls outside the record.
    FieldOutOfBounds {
        /// Tag of the skipped field.
        tag: String,
        /// Absolute start offset of the field within the record.
        start: usize,
        /// Absolute end offset (exclusive) of the field within the record.
        end: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DirectoryEntrySkipped { slot, reason } => {
                write!(f, "directory slot {slot} skipped: {reason}")
            },
            Diagnostic::FieldOutOfBounds { tag, start, end } => {
                write!(f, "field {tag} at {start}..{end} exceeds record bounds")
            },
        }
    }
}
