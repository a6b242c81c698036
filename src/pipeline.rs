//! End-to-end processing pipeline and run configuration.
//!
//! [`Processor`] ties the stages together: segment the buffer, decode each
//! record, drop empty-title records, attach the indexing timestamp and an
//! optional embedding, and hand documents to a [`DocumentSink`] in bounded
//! batches. Per-record failures never abort the stream; a sink failure does,
//! because a lost batch is a hard error the caller must decide about.
//!
//! [`PipelineConfig`] carries the environment-driven settings the binary
//! uses to wire up the production collaborators.

use crate::embedding::EmbeddingProvider;
use crate::error::{MarcError, Result};
use crate::indexer::DocumentSink;
use crate::reader::decode_record;
use crate::record::BibliographicRecord;
use crate::segmenter::RecordSegmenter;
use std::path::{Path, PathBuf};

/// Default number of documents per bulk batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Environment-driven pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Search engine base URL (`ELASTICSEARCH_URL`).
    pub elasticsearch_url: String,
    /// Search engine username (`ELASTICSEARCH_USERNAME`).
    pub elasticsearch_username: String,
    /// Search engine password (`ELASTICSEARCH_PASSWORD`).
    pub elasticsearch_password: String,
    /// Embedding service base URL (`OLLAMA_URL`).
    pub ollama_url: String,
    /// Embedding model name (`EMBEDDING_MODEL`).
    pub embedding_model: String,
    /// Target index name (`INDEX_NAME`).
    pub index_name: String,
    /// MARC input file (`MARC_FILE`).
    pub marc_file: PathBuf,
    /// Documents per bulk batch (`BATCH_SIZE`).
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            elasticsearch_url: "http://localhost:9200".to_string(),
            elasticsearch_username: "elastic".to_string(),
            elasticsearch_password: String::new(),
            ollama_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            index_name: "marc-records".to_string(),
            marc_file: PathBuf::from("records.mrc"),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Build a configuration from the environment, honoring a `.env` file in
    /// the working directory. Unset or empty variables fall back to defaults;
    /// an unparsable `BATCH_SIZE` falls back to [`DEFAULT_BATCH_SIZE`].
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = PipelineConfig::default();
        PipelineConfig {
            elasticsearch_url: env_or("ELASTICSEARCH_URL", &defaults.elasticsearch_url),
            elasticsearch_username: env_or(
                "ELASTICSEARCH_USERNAME",
                &defaults.elasticsearch_username,
            ),
            elasticsearch_password: env_or(
                "ELASTICSEARCH_PASSWORD",
                &defaults.elasticsearch_password,
            ),
            ollama_url: env_or("OLLAMA_URL", &defaults.ollama_url),
            embedding_model: env_or("EMBEDDING_MODEL", &defaults.embedding_model),
            index_name: env_or("INDEX_NAME", &defaults.index_name),
            marc_file: PathBuf::from(env_or(
                "MARC_FILE",
                &defaults.marc_file.to_string_lossy(),
            )),
            batch_size: env_or("BATCH_SIZE", "")
                .parse()
                .unwrap_or(defaults.batch_size)
                .max(1),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Per-run counters reported alongside errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records bounded by the segmenter and handed to the decoder.
    pub records_seen: usize,
    /// Records emitted to the sink.
    pub records_emitted: usize,
    /// Records that failed leader/length validation, plus a truncated tail.
    pub records_errored: usize,
    /// Records dropped for having an empty title (not counted as errors).
    pub titles_rejected: usize,
    /// Single-byte resynchronization steps taken by the segmenter.
    pub resync_steps: usize,
}

/// Drives the decode pipeline over a record buffer.
pub struct Processor<S: DocumentSink> {
    sink: S,
    embedder: Option<Box<dyn EmbeddingProvider>>,
    batch_size: usize,
}

impl<S: DocumentSink> std::fmt::Debug for Processor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("batch_size", &self.batch_size)
            .field("has_embedder", &self.embedder.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: DocumentSink> Processor<S> {
    /// Create a processor emitting to `sink` with the default batch size.
    pub fn new(sink: S) -> Self {
        Processor {
            sink,
            embedder: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the bulk batch size (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Attach an embedding provider. Without one, records are emitted with
    /// no vector.
    #[must_use]
    pub fn with_embedder(mut self, embedder: Box<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Consume the processor and return its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process a whole multi-record buffer.
    ///
    /// Decode failures and the empty-title business rule are local to their
    /// record; only a sink failure (or I/O) aborts with an error.
    pub fn process_buffer(&mut self, buffer: &[u8]) -> Result<RunStats> {
        let mut stats = RunStats::default();
        let mut batch: Vec<BibliographicRecord> = Vec::with_capacity(self.batch_size);
        let mut segmenter = RecordSegmenter::new(buffer);

        for item in segmenter.by_ref() {
            let segment = match item {
                Ok(segment) => segment,
                Err(e) => {
                    // Truncated tail: the stream is done.
                    tracing::warn!(error = %e, "discarding incomplete record at end of stream");
                    stats.records_errored += 1;
                    break;
                },
            };
            stats.records_seen += 1;

            let decoded = match decode_record(segment.data) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!(offset = segment.offset, error = %e, "record failed to decode");
                    stats.records_errored += 1;
                    continue;
                },
            };

            let mut record = decoded.record;
            if record.title.is_empty() {
                tracing::debug!(offset = segment.offset, "dropping record with empty title");
                stats.titles_rejected += 1;
                continue;
            }

            record.indexed_at = chrono::Utc::now().to_rfc3339();
            if let Some(embedder) = &self.embedder {
                if !record.searchable_text.is_empty() {
                    match embedder.embed(&record.searchable_text) {
                        Ok(vector) => record.embedding = Some(vector),
                        Err(e) => {
                            tracing::warn!(
                                offset = segment.offset,
                                error = %e,
                                "embedding failed, emitting record without a vector"
                            );
                        },
                    }
                }
            }

            batch.push(record);
            stats.records_emitted += 1;
            if batch.len() >= self.batch_size {
                self.sink.submit(&batch)?;
                tracing::info!(
                    batch = batch.len(),
                    emitted = stats.records_emitted,
                    "submitted batch"
                );
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.sink.submit(&batch)?;
            tracing::info!(batch = batch.len(), "submitted final batch");
        }
        stats.resync_steps = segmenter.resync_steps();
        Ok(stats)
    }

    /// Read a MARC file into memory and process it.
    pub fn process_file(&mut self, path: &Path) -> Result<RunStats> {
        let buffer = std::fs::read(path).map_err(MarcError::Io)?;
        tracing::info!(path = %path.display(), bytes = buffer.len(), "processing MARC file");
        self.process_buffer(&buffer)
    }
}
