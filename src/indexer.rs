//! Bulk indexing collaborator client.
//!
//! Emitted records are serialized as structured documents and submitted in
//! bounded batches to an Elasticsearch-compatible endpoint via the `_bulk`
//! NDJSON API. Each batch succeeds or fails as a unit; a failed batch is a
//! hard error surfaced to the caller, unlike embedding failures.
//!
//! The [`DocumentSink`] trait is the seam between the pipeline and the
//! outside world: [`BulkIndexer`] is the production implementation and
//! `Vec<BibliographicRecord>` implements it for library callers and tests
//! that only want the decoded documents.

use crate::error::{MarcError, Result};
use crate::record::BibliographicRecord;
use std::time::Duration;

/// Receives emitted records in bounded batches.
pub trait DocumentSink {
    /// Submit one batch. Success or failure applies to the batch as a unit.
    fn submit(&mut self, batch: &[BibliographicRecord]) -> Result<()>;
}

/// Collecting sink: appends every batch to the vector.
impl DocumentSink for Vec<BibliographicRecord> {
    fn submit(&mut self, batch: &[BibliographicRecord]) -> Result<()> {
        self.extend_from_slice(batch);
        Ok(())
    }
}

/// Index mapping for the search engine, mirroring the document schema:
/// keyword identifiers, english-analyzed text fields, and a 768-dimension
/// dense vector for the embedding.
const INDEX_MAPPING: &str = r#"{
  "mappings": {
    "properties": {
      "controlNumber": { "type": "keyword" },
      "title": {
        "type": "text",
        "analyzer": "english",
        "fields": { "keyword": { "type": "keyword" } }
      },
      "author": {
        "type": "text",
        "analyzer": "english",
        "fields": { "keyword": { "type": "keyword" } }
      },
      "publisher": {
        "type": "text",
        "analyzer": "english",
        "fields": { "keyword": { "type": "keyword" } }
      },
      "publicationYear": { "type": "integer" },
      "isbn": { "type": "keyword" },
      "subjects": { "type": "text", "analyzer": "english" },
      "description": { "type": "text", "analyzer": "english" },
      "language": { "type": "keyword" },
      "format": { "type": "keyword" },
      "searchableText": { "type": "text", "analyzer": "english" },
      "embedding": { "type": "dense_vector", "dims": 768 },
      "indexed_at": { "type": "date" }
    }
  },
  "settings": {
    "number_of_shards": 1,
    "number_of_replicas": 0
  }
}"#;

/// Bulk document indexer for an Elasticsearch-compatible search engine.
#[derive(Debug)]
pub struct BulkIndexer {
    http: reqwest::blocking::Client,
    base_url: String,
    index: String,
    credentials: Option<(String, String)>,
}

impl BulkIndexer {
    /// Create an indexer for `index` on the engine at `base_url`.
    pub fn new(base_url: impl Into<String>, index: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(BulkIndexer {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
            credentials: None,
        })
    }

    /// Attach basic-auth credentials to every request.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    fn authorize(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, Some(password)),
            None => builder,
        }
    }

    /// Create the index with its mapping if it does not already exist.
    pub fn ensure_index(&self) -> Result<()> {
        let url = format!("{}/{}", self.base_url, self.index);
        let head = self.authorize(self.http.head(&url)).send()?;
        if head.status().is_success() {
            tracing::debug!(index = %self.index, "index already exists");
            return Ok(());
        }

        let response = self
            .authorize(self.http.put(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(INDEX_MAPPING)
            .send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(MarcError::Indexing(format!(
                "index creation failed with status {status}: {body}"
            )));
        }
        tracing::info!(index = %self.index, "created index");
        Ok(())
    }

    /// Build the NDJSON bulk body for one batch: an action line naming the
    /// index and document id, then the serialized document, per record.
    fn bulk_body(index: &str, batch: &[BibliographicRecord]) -> Result<String> {
        let stamp = chrono::Utc::now().timestamp();
        let mut body = String::new();
        for (i, document) in batch.iter().enumerate() {
            let action = serde_json::json!({
                "index": { "_index": index, "_id": format!("marc_{stamp}_{i}") }
            });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(document).map_err(|e| {
                MarcError::Indexing(format!("document serialization failed: {e}"))
            })?);
            body.push('\n');
        }
        Ok(body)
    }
}

impl DocumentSink for BulkIndexer {
    fn submit(&mut self, batch: &[BibliographicRecord]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let body = Self::bulk_body(&self.index, batch)?;
        let response = self
            .authorize(self.http.post(format!("{}/_bulk", self.base_url)))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(MarcError::Indexing(format!(
                "bulk request failed with status {status}: {body}"
            )));
        }

        // The bulk API reports per-item failures in a 200 response.
        let report: serde_json::Value = response.json()?;
        if report["errors"].as_bool() == Some(true) {
            return Err(MarcError::Indexing(
                "bulk response reported item-level errors".to_string(),
            ));
        }
        tracing::debug!(batch = batch.len(), index = %self.index, "indexed batch");
        Ok(())
    }
}
