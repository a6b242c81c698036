//! MARC field decoding and subfield tokenization.
//!
//! A directory entry resolves to an absolute byte range inside the record.
//! Fields with tag `"010"` and above are data fields: two indicator bytes
//! followed by subfields, each introduced by the 0x1F delimiter, a one-byte
//! code, and its data. Fields below `"010"` are control fields, which carry
//! neither indicators nor subfields and are discarded by this decoder.
//!
//! Subfield data is normalized on the way in: surrounding whitespace and
//! trailing punctuation (`. , ; : /`) are trimmed, and subfields left empty
//! by that normalization do not appear in the output at all.

use crate::directory::{DirectoryEntry, FIELD_TERMINATOR};
use crate::error::Diagnostic;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The byte that introduces each subfield (ISO 2709).
pub const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Trailing punctuation stripped from subfield data.
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '/'];

/// A subfield within a data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code, the byte immediately after the delimiter.
    pub code: u8,
    /// Normalized subfield data. Never empty.
    pub data: String,
}

/// A data field in a MARC record (tags "010" and above).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 characters).
    pub tag: String,
    /// First indicator byte.
    pub indicator1: u8,
    /// Second indicator byte.
    pub indicator2: u8,
    /// Subfields in wire order. Stored in a `SmallVec` to avoid allocation
    /// for typical fields with 4 or fewer subfields.
    pub subfields: SmallVec<[Subfield; 4]>,
}

impl Field {
    /// Data of the first subfield with the given code, if any.
    #[must_use]
    pub fn first_subfield(&self, code: u8) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.data.as_str())
    }

    /// Iterate over the data of every subfield with the given code.
    pub fn subfields_with_code(&self, code: u8) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.data.as_str())
    }
}

/// Decode one field from its directory entry.
///
/// Returns `None` when no field should be produced: control fields (tag
/// lexicographically below `"010"`), fields shorter than the two indicator
/// bytes plus one content byte, and fields whose byte range falls outside the
/// record. Only the out-of-bounds case is a diagnostic; the others are
/// structural non-events.
pub fn decode_field(
    record: &[u8],
    base_address: usize,
    entry: &DirectoryEntry,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Field> {
    let start = base_address + entry.field_offset;
    let end = start + entry.field_length;
    if end > record.len() {
        tracing::warn!(tag = %entry.tag, start, end, "field exceeds record bounds, skipping");
        diagnostics.push(Diagnostic::FieldOutOfBounds {
            tag: entry.tag.clone(),
            start,
            end,
        });
        return None;
    }

    // Lexicographic compare on the 3-character tag. This relies on MARC tags
    // being fixed-width strings; alphabetic tags in local-use ranges sort
    // correctly here where an integer parse would not.
    if entry.tag.as_str() < "010" {
        return None;
    }

    let content = &record[start..end];
    if content.len() < 3 {
        tracing::debug!(tag = %entry.tag, len = content.len(), "data field too short, skipping");
        return None;
    }

    let mut body = &content[2..];
    if body.last() == Some(&FIELD_TERMINATOR) {
        body = &body[..body.len() - 1];
    }

    Some(Field {
        tag: entry.tag.clone(),
        indicator1: content[0],
        indicator2: content[1],
        subfields: tokenize_subfields(body),
    })
}

/// Split field content on subfield delimiters.
///
/// Bytes before the first delimiter are ignored. Each subfield is the code
/// byte after a delimiter plus the data up to the next delimiter or end of
/// content; normalized-empty subfields are dropped.
fn tokenize_subfields(body: &[u8]) -> SmallVec<[Subfield; 4]> {
    let mut subfields = SmallVec::new();
    let mut pos = 0;
    while pos < body.len() {
        if body[pos] != SUBFIELD_DELIMITER {
            pos += 1;
            continue;
        }
        pos += 1;
        if pos >= body.len() {
            break;
        }
        let code = body[pos];
        pos += 1;

        let data_start = pos;
        while pos < body.len() && body[pos] != SUBFIELD_DELIMITER {
            pos += 1;
        }
        let data = normalize_subfield(&String::from_utf8_lossy(&body[data_start..pos]));
        if !data.is_empty() {
            subfields.push(Subfield { code, data });
        }
    }
    subfields
}

/// Trim whitespace, then trailing punctuation, then whitespace again.
fn normalize_subfield(raw: &str) -> String {
    raw.trim().trim_end_matches(TRAILING_PUNCT).trim().to_string()
}
