#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marcdex
//!
//! Decode MARC21 bibliographic records in the ISO 2709 binary format and
//! derive flat, searchable documents from them.
//!
//! ## Decoding stages
//!
//! Each record flows through independent stages with no cross-record state:
//!
//! 1. [`segmenter`] — bound each record by its 5-digit ASCII length prefix
//! 2. [`leader`] — decode the fixed 24-byte header (length, base address)
//! 3. [`directory`] — decode the 12-byte (tag, length, offset) slots
//! 4. [`field`] — resolve byte ranges, split indicators and subfields
//! 5. [`extract`] — map tags and subfield codes to semantic attributes
//! 6. [`record`] — the semantic record and its searchable-text projection
//!
//! Malformed input degrades locally: corrupt directory slots and
//! out-of-bounds fields are skipped with [`error::Diagnostic`] warnings, an
//! unreadable length prefix is walked off one byte at a time, and a
//! truncated trailing record ends the stream without failing the run.
//!
//! ## Modules
//!
//! - [`leader`] — MARC record leader (24-byte header)
//! - [`directory`] — directory slot parsing
//! - [`field`] — field decoding and subfield tokenization
//! - [`extract`] — tag-to-attribute extraction rules
//! - [`record`] — the semantic [`BibliographicRecord`]
//! - [`reader`] — per-record decode pipeline
//! - [`segmenter`] — record stream segmentation
//! - [`embedding`] — embedding service collaborator
//! - [`indexer`] — bulk indexing collaborator
//! - [`pipeline`] — orchestration, counters, configuration
//! - [`error`] — error types, result type, and diagnostics

pub mod directory;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod field;
pub mod indexer;
pub mod leader;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod segmenter;

pub use directory::DirectoryEntry;
pub use embedding::{EmbeddingClient, EmbeddingProvider};
pub use error::{Diagnostic, MarcError, Result};
pub use extract::{extract_record, ExtractRule};
pub use field::{Field, Subfield};
pub use indexer::{BulkIndexer, DocumentSink};
pub use leader::Leader;
pub use pipeline::{PipelineConfig, Processor, RunStats};
pub use reader::{decode_record, DecodedRecord};
pub use record::BibliographicRecord;
pub use segmenter::{RecordSegmenter, Segment};
