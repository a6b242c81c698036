//! The semantic bibliographic record and its searchable-text projection.
//!
//! [`BibliographicRecord`] is the flat, semantically-labeled projection of
//! one decoded MARC record. It is built once by the extractor and never
//! mutated afterwards, except that the pipeline attaches an embedding vector
//! and an indexing timestamp at emission time.
//!
//! The serde representation matches the search index schema: camelCase field
//! names, with `publicationYear` and `embedding` omitted when absent.

use serde::{Deserialize, Serialize};

/// Semantic projection of one MARC record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibliographicRecord {
    /// Record control number. Empty until control-field extraction lands.
    pub control_number: String,
    /// Title with subtitle, from field 245 subfields `a`/`b`.
    pub title: String,
    /// Primary author, from the first of fields 100/110/111.
    pub author: String,
    /// Publisher name, from fields 260/264 subfield `b`.
    pub publisher: String,
    /// Four-digit publication year from fields 260/264 subfield `c`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<u16>,
    /// Validated ISBN from field 020, hyphens preserved.
    pub isbn: String,
    /// Subject headings from fields 650/651/653, ordered, duplicates kept.
    pub subjects: Vec<String>,
    /// Summary note from field 520.
    pub description: String,
    /// Language code from field 041.
    pub language: String,
    /// Material format. Empty until leader-derived formats land.
    pub format: String,
    /// Flattened text for full-text search, see [`compose_searchable_text`].
    ///
    /// [`compose_searchable_text`]: BibliographicRecord::compose_searchable_text
    pub searchable_text: String,
    /// Embedding vector attached by the pipeline, if the service produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// RFC 3339 timestamp attached at emission time.
    #[serde(rename = "indexed_at")]
    pub indexed_at: String,
}

impl BibliographicRecord {
    /// Compose the flat search string for this record.
    ///
    /// Concatenates, in fixed order, the non-empty title, author, publisher,
    /// description, and space-joined subjects, separated by single spaces.
    /// Pure function of the record's extracted attributes.
    #[must_use]
    pub fn compose_searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        for part in [&self.title, &self.author, &self.publisher, &self.description] {
            if !part.is_empty() {
                parts.push(part);
            }
        }
        let joined_subjects;
        if !self.subjects.is_empty() {
            joined_subjects = self.subjects.join(" ");
            parts.push(&joined_subjects);
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searchable_text_skips_empty_attributes() {
        let record = BibliographicRecord {
            title: "The Great Book : a novel".to_string(),
            author: "Smith, John".to_string(),
            subjects: vec!["Fiction".to_string(), "Sea stories".to_string()],
            ..BibliographicRecord::default()
        };
        assert_eq!(
            record.compose_searchable_text(),
            "The Great Book : a novel Smith, John Fiction Sea stories"
        );
    }

    #[test]
    fn searchable_text_of_empty_record_is_empty() {
        assert_eq!(
            BibliographicRecord::default().compose_searchable_text(),
            ""
        );
    }

    #[test]
    fn serializes_with_index_schema_names() {
        let record = BibliographicRecord {
            title: "T".to_string(),
            publication_year: Some(1998),
            searchable_text: "T".to_string(),
            indexed_at: "2024-01-01T00:00:00Z".to_string(),
            ..BibliographicRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["publicationYear"], 1998);
        assert_eq!(json["searchableText"], "T");
        assert_eq!(json["indexed_at"], "2024-01-01T00:00:00Z");
        assert_eq!(json["controlNumber"], "");
        assert!(json.get("embedding").is_none());
    }

    #[test]
    fn absent_year_is_omitted_from_json() {
        let json = serde_json::to_value(BibliographicRecord::default()).unwrap();
        assert!(json.get("publicationYear").is_none());
    }
}
