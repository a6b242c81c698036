//! Per-record decode pipeline.
//!
//! Runs one record slice through leader, directory, and field decoding, then
//! bibliographic extraction. Warnings accumulated along the way travel with
//! the result so callers can fold them into run-level reporting.

use crate::directory::parse_directory;
use crate::error::{Diagnostic, MarcError, Result};
use crate::extract::extract_record;
use crate::field::{decode_field, Field};
use crate::leader::Leader;
use crate::record::BibliographicRecord;

/// Outcome of decoding one record: the semantic record plus any non-fatal
/// warnings raised along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// The extracted bibliographic record.
    pub record: BibliographicRecord,
    /// Non-fatal conditions observed while decoding.
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode a single MARC record from a byte slice.
///
/// The slice must contain at least the record's declared length; extra
/// trailing bytes are ignored. Decoding has no hidden state: the same bytes
/// always produce the same [`DecodedRecord`].
///
/// # Errors
///
/// Returns [`MarcError::MalformedLeader`] for a bad leader and
/// [`MarcError::IncompleteRecord`] when the declared record length exceeds
/// the bytes given.
pub fn decode_record(data: &[u8]) -> Result<DecodedRecord> {
    let leader = Leader::from_bytes(data)?;
    if data.len() < leader.record_length {
        return Err(MarcError::IncompleteRecord(format!(
            "record declares {} bytes but only {} are available",
            leader.record_length,
            data.len()
        )));
    }
    let record_data = &data[..leader.record_length];

    let mut diagnostics = Vec::new();
    let entries = parse_directory(record_data, &leader, &mut diagnostics);

    let mut fields: Vec<Field> = Vec::with_capacity(entries.len());
    for entry in &entries {
        if let Some(field) = decode_field(record_data, leader.base_address, entry, &mut diagnostics)
        {
            fields.push(field);
        }
    }

    Ok(DecodedRecord {
        record: extract_record(&fields),
        diagnostics,
    })
}
