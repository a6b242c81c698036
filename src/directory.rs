//! MARC directory parsing.
//!
//! The directory follows the leader and describes where each field lives in
//! the data area. It is a run of fixed 12-byte slots terminated by 0x1E (or,
//! in records that omit the terminator, by the base address):
//!
//! - Bytes 0-2: field tag (3 characters)
//! - Bytes 3-6: field length (4 ASCII digits)
//! - Bytes 7-11: field offset relative to the base address (5 ASCII digits)
//!
//! A slot whose digits fail to parse is skipped with a warning rather than
//! failing the record, so one corrupt entry does not lose the fields that
//! follow it. Entry order is preserved; it determines downstream field order
//! and therefore which occurrence wins for single-valued attributes.

use crate::error::{Diagnostic, MarcError, Result};
use crate::leader::{Leader, LEADER_LEN};

/// The byte that terminates fields and the directory (ISO 2709).
pub const FIELD_TERMINATOR: u8 = 0x1E;

/// Size of one directory slot in bytes.
const ENTRY_LEN: usize = 12;

/// One decoded directory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Field tag (3 characters, e.g. "245").
    pub tag: String,
    /// Field length in bytes, including the field terminator.
    pub field_length: usize,
    /// Field offset in bytes, relative to the base address.
    pub field_offset: usize,
}

/// Parse the directory of a record.
///
/// `record` must hold at least `leader.base_address` bytes. The directory's
/// logical end is the first 0x1E between the leader and the base address;
/// when no terminator is present the scan falls back to `base_address - 1`.
/// Unparsable slots push a [`Diagnostic::DirectoryEntrySkipped`] and are
/// dropped; a trailing partial slot is ignored.
pub fn parse_directory(
    record: &[u8],
    leader: &Leader,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<DirectoryEntry> {
    let dir_area = &record[LEADER_LEN..leader.base_address];
    let dir_end = memchr::memchr(FIELD_TERMINATOR, dir_area).unwrap_or_else(|| {
        // No terminator: the directory runs up to the base address.
        dir_area.len().saturating_sub(1)
    });
    let directory = &dir_area[..dir_end];

    let mut entries = Vec::with_capacity(directory.len() / ENTRY_LEN);
    for (slot, chunk) in directory.chunks_exact(ENTRY_LEN).enumerate() {
        let tag = String::from_utf8_lossy(&chunk[0..3]).to_string();
        let field_length = match parse_entry_digits(&chunk[3..7]) {
            Ok(len) => len,
            Err(e) => {
                tracing::warn!(slot, tag = %tag, error = %e, "skipping directory entry");
                diagnostics.push(Diagnostic::DirectoryEntrySkipped {
                    slot,
                    reason: format!("field length for tag {tag}: {e}"),
                });
                continue;
            },
        };
        let field_offset = match parse_entry_digits(&chunk[7..12]) {
            Ok(offset) => offset,
            Err(e) => {
                tracing::warn!(slot, tag = %tag, error = %e, "skipping directory entry");
                diagnostics.push(Diagnostic::DirectoryEntrySkipped {
                    slot,
                    reason: format!("field offset for tag {tag}: {e}"),
                });
                continue;
            },
        };
        entries.push(DirectoryEntry {
            tag,
            field_length,
            field_offset,
        });
    }
    entries
}

/// Parse an ASCII-digit run from a directory slot.
fn parse_entry_digits(bytes: &[u8]) -> Result<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + (byte - b'0') as usize;
        } else {
            return Err(MarcError::InvalidRecord(format!(
                "expected digits, got '{}'",
                String::from_utf8_lossy(bytes)
            )));
        }
    }
    Ok(result)
}
