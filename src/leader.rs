//! MARC record leader parsing.
//!
//! The MARC leader is a 24-byte fixed-length field at the start of every MARC
//! record. Only the two positions that drive binary decoding are extracted:
//!
//! - Positions 0-4: Record length (5 ASCII digits)
//! - Positions 12-16: Base address of data (5 ASCII digits)
//!
//! The remaining positions (record status, type, encoding level, ...) carry
//! cataloging metadata that plays no part in locating fields and is left as
//! raw bytes in the record.

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};

/// Length of the fixed MARC leader in bytes.
pub const LEADER_LEN: usize = 24;

/// Structural header of a MARC record.
///
/// Both values are byte counts measured from the start of the record. The
/// directory occupies `[24, base_address)` and field data occupies
/// `[base_address, record_length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Total record length in bytes, positions 0-4.
    pub record_length: usize,
    /// Offset of the field data area, positions 12-16.
    pub base_address: usize,
}

impl Leader {
    /// Parse a leader from the first 24 bytes of a record.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedLeader`] if fewer than 24 bytes are
    /// given, if either numeric field contains a non-digit, if the record
    /// length is smaller than the leader itself, or if the base address does
    /// not fall inside the record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(MarcError::MalformedLeader(format!(
                "leader must be at least {LEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let record_length = parse_digits(&bytes[0..5], "record length")?;
        let base_address = parse_digits(&bytes[12..17], "base address")?;

        if record_length < LEADER_LEN {
            return Err(MarcError::MalformedLeader(format!(
                "record length must be at least {LEADER_LEN}, got {record_length}"
            )));
        }
        if base_address < LEADER_LEN {
            return Err(MarcError::MalformedLeader(format!(
                "base address must be at least {LEADER_LEN}, got {base_address}"
            )));
        }
        if base_address > record_length {
            return Err(MarcError::MalformedLeader(format!(
                "base address {base_address} exceeds record length {record_length}"
            )));
        }

        Ok(Leader {
            record_length,
            base_address,
        })
    }
}

/// Parse a 5-digit ASCII number from bytes without allocating.
fn parse_digits(bytes: &[u8], what: &str) -> Result<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + (byte - b'0') as usize;
        } else {
            return Err(MarcError::MalformedLeader(format!(
                "invalid {what}: '{}'",
                String::from_utf8_lossy(bytes)
            )));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_length_and_base_address() {
        let leader = Leader::from_bytes(b"00120nam a2200049 i 4500").unwrap();
        assert_eq!(leader.record_length, 120);
        assert_eq!(leader.base_address, 49);
    }

    #[test]
    fn rejects_short_input() {
        let err = Leader::from_bytes(b"00120nam").unwrap_err();
        assert!(matches!(err, MarcError::MalformedLeader(_)));
    }

    #[test]
    fn rejects_non_numeric_record_length() {
        let err = Leader::from_bytes(b"0012Xnam a2200049 i 4500").unwrap_err();
        assert!(err.to_string().contains("record length"), "got: {err}");
    }

    #[test]
    fn rejects_non_numeric_base_address() {
        let err = Leader::from_bytes(b"00120nam a22000x9 i 4500").unwrap_err();
        assert!(err.to_string().contains("base address"), "got: {err}");
    }

    #[test]
    fn rejects_record_length_below_leader() {
        let err = Leader::from_bytes(b"00010nam a2200049 i 4500").unwrap_err();
        assert!(
            err.to_string().contains("record length must be at least 24"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_base_address_beyond_record() {
        let err = Leader::from_bytes(b"00040nam a2200099 i 4500").unwrap_err();
        assert!(err.to_string().contains("exceeds record length"), "got: {err}");
    }
}
