//! Embedding collaborator client.
//!
//! The pipeline can attach a dense vector to each emitted record by sending
//! its searchable text to an Ollama-compatible embedding endpoint
//! (`POST {base}/api/embeddings` with `{"model": ..., "prompt": ...}`).
//! Embedding is strictly best-effort: a failure here is logged as a warning
//! by the pipeline and the record is emitted without a vector.

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Character budget applied to the text before it is sent for embedding.
pub const MAX_EMBED_CHARS: usize = 8000;

/// Anything that can turn text into a numeric vector.
///
/// The production implementation is [`EmbeddingClient`]; tests substitute
/// in-process fakes.
pub trait EmbeddingProvider {
    /// Produce an embedding vector for the given text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// HTTP client for an Ollama-compatible embedding service.
#[derive(Debug)]
pub struct EmbeddingClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl EmbeddingClient {
    /// Create a client for the service at `base_url` using `model`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(EmbeddingClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

impl EmbeddingProvider for EmbeddingClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let prompt = truncate_chars(text, MAX_EMBED_CHARS);
        let response = self
            .http
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt,
            })
            .send()?;
        if !response.status().is_success() {
            return Err(MarcError::Embedding(format!(
                "embedding service returned status {}",
                response.status()
            )));
        }
        let body: EmbeddingResponse = response.json()?;
        Ok(body.embedding)
    }
}

/// Truncate to at most `max` characters on a character boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        let truncated = truncate_chars(&text, 4);
        assert_eq!(truncated.chars().count(), 4);
        assert_eq!(truncated, "éééé");
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_chars("short", MAX_EMBED_CHARS), "short");
    }

    #[test]
    fn request_wire_shape() {
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            prompt: "some text",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["prompt"], "some text");
    }

    #[test]
    fn response_wire_shape() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"embedding": [0.25, -0.5]}"#).unwrap();
        assert_eq!(body.embedding, vec![0.25, -0.5]);
    }
}
