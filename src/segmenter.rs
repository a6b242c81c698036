//! Record stream segmentation.
//!
//! A MARC file is a plain concatenation of records, each self-delimited by
//! the 5-digit ASCII length prefix at the start of its own leader. The
//! segmenter walks a whole in-memory buffer and yields one bounded slice per
//! record, lazily, so callers can stop between records without decoding the
//! rest of the buffer.
//!
//! Synchronization policy: an unreadable length prefix advances the position
//! by a single byte and retries, so a corrupt span is walked off rather than
//! aborting the stream. A declared length that overruns the buffer ends the
//! stream with [`MarcError::IncompleteRecord`] and the tail is discarded.
//! A successfully bounded record always consumes its full declared span,
//! whether or not it decodes downstream.

use crate::error::{MarcError, Result};
use crate::leader::LEADER_LEN;

/// Width of the ASCII record-length prefix.
const LENGTH_PREFIX_LEN: usize = 5;

/// One record-sized slice of the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Byte offset of the record within the buffer.
    pub offset: usize,
    /// Exactly the record's declared bytes.
    pub data: &'a [u8],
}

/// Lazy iterator over the records of a multi-record byte buffer.
///
/// Yields `Ok(segment)` per bounded record and at most one terminal
/// `Err(IncompleteRecord)` when the buffer ends mid-record. Resynchronization
/// steps are counted, not yielded.
#[derive(Debug)]
pub struct RecordSegmenter<'a> {
    buffer: &'a [u8],
    pos: usize,
    done: bool,
    resync_steps: usize,
}

impl<'a> RecordSegmenter<'a> {
    /// Create a segmenter over a whole record buffer.
    #[must_use]
    pub fn new(buffer: &'a [u8]) -> Self {
        RecordSegmenter {
            buffer,
            pos: 0,
            done: false,
            resync_steps: 0,
        }
    }

    /// Number of single-byte resynchronization steps taken so far.
    #[must_use]
    pub fn resync_steps(&self) -> usize {
        self.resync_steps
    }

    /// Current byte position within the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for RecordSegmenter<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while self.buffer.len() - self.pos >= LENGTH_PREFIX_LEN {
            let prefix = &self.buffer[self.pos..self.pos + LENGTH_PREFIX_LEN];
            let declared = match parse_length_prefix(prefix) {
                // A length smaller than the leader cannot start a record, so
                // the prefix itself must be spurious.
                Some(len) if len >= LEADER_LEN => len,
                _ => {
                    tracing::warn!(
                        offset = self.pos,
                        prefix = %String::from_utf8_lossy(prefix),
                        "unreadable record length, stepping one byte"
                    );
                    self.pos += 1;
                    self.resync_steps += 1;
                    continue;
                },
            };
            if self.pos + declared > self.buffer.len() {
                self.done = true;
                return Some(Err(MarcError::IncompleteRecord(format!(
                    "record at offset {} declares {declared} bytes but only {} remain",
                    self.pos,
                    self.buffer.len() - self.pos
                ))));
            }
            let segment = Segment {
                offset: self.pos,
                data: &self.buffer[self.pos..self.pos + declared],
            };
            self.pos += declared;
            return Some(Ok(segment));
        }
        self.done = true;
        None
    }
}

/// Parse the 5-byte ASCII length prefix, `None` on any non-digit.
fn parse_length_prefix(bytes: &[u8]) -> Option<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return None;
        }
        result = result * 10 + (byte - b'0') as usize;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal bounded record: valid length prefix, padded body.
    fn padded_record(len: usize) -> Vec<u8> {
        let mut record = format!("{len:05}").into_bytes();
        record.resize(len, b' ');
        record
    }

    #[test]
    fn segments_consecutive_records() {
        let mut buffer = padded_record(40);
        buffer.extend(padded_record(32));

        let mut segmenter = RecordSegmenter::new(&buffer);
        let first = segmenter.next().unwrap().unwrap();
        let second = segmenter.next().unwrap().unwrap();

        assert_eq!(first.offset, 0);
        assert_eq!(first.data.len(), 40);
        assert_eq!(second.offset, 40);
        assert_eq!(second.data.len(), 32);
        assert!(segmenter.next().is_none());
        assert_eq!(segmenter.resync_steps(), 0);
    }

    #[test]
    fn short_tail_ends_stream() {
        let mut buffer = padded_record(30);
        buffer.extend_from_slice(b"0042"); // fewer than 5 bytes remain

        let mut segmenter = RecordSegmenter::new(&buffer);
        assert!(segmenter.next().unwrap().is_ok());
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn resynchronizes_past_garbage() {
        let mut buffer = b"garbage!".to_vec();
        let garbage_len = buffer.len();
        buffer.extend(padded_record(40));

        let mut segmenter = RecordSegmenter::new(&buffer);
        let segment = segmenter.next().unwrap().unwrap();

        assert_eq!(segment.offset, garbage_len);
        assert_eq!(segment.data.len(), 40);
        assert_eq!(segmenter.resync_steps(), garbage_len);
    }

    #[test]
    fn overrunning_length_is_incomplete_and_terminal() {
        let mut buffer = padded_record(30);
        buffer.extend_from_slice(b"00999trailing");

        let mut segmenter = RecordSegmenter::new(&buffer);
        assert!(segmenter.next().unwrap().is_ok());
        let err = segmenter.next().unwrap().unwrap_err();
        assert!(matches!(err, MarcError::IncompleteRecord(_)));
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn length_below_leader_size_is_treated_as_garbage() {
        // "00012" parses but no record can be 12 bytes long; the padding
        // keeps the stepped-over window from forming another digit run.
        let mut buffer = b"00012???".to_vec();
        let garbage_len = buffer.len();
        buffer.extend(padded_record(40));

        let mut segmenter = RecordSegmenter::new(&buffer);
        let segment = segmenter.next().unwrap().unwrap();
        assert_eq!(segment.offset, garbage_len);
        assert_eq!(segmenter.resync_steps(), garbage_len);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        assert!(RecordSegmenter::new(b"").next().is_none());
    }
}
