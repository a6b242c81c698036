//! Mapping decoded fields to bibliographic attributes.
//!
//! Extraction is driven by a static rule table mapping each tag of interest
//! to an [`ExtractRule`] variant. Each variant carries its own policy:
//! single-valued attributes (title, author, publisher, year, ISBN,
//! description, language) are first-occurrence-wins in field order, while
//! subjects accumulate across every matching field. Fields are consumed in
//! directory order and subfields in wire order, so "first" is well defined.

use crate::field::Field;
use crate::record::BibliographicRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Four-digit run used for publication year extraction. Compiled once.
    static ref YEAR_PATTERN: Regex = Regex::new(r"\d{4}").expect("static pattern");
}

/// Extraction policy for one MARC tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractRule {
    /// 245: join subfields `a` and `b` with `" : "`, excluding `c`.
    Title,
    /// 100/110/111: first field wins, first subfield `a`, trailing commas
    /// stripped.
    Author,
    /// 260/264: subfield `b` is the publisher (first wins), subfield `c`
    /// yields the publication year (first in-range 4-digit run wins).
    Publication,
    /// 020: first subfield `a` that validates as a 10- or 13-character ISBN.
    Isbn,
    /// 650/651/653: every subfield `a` accumulates, duplicates kept.
    Subjects,
    /// 520: first subfield `a`.
    Description,
    /// 041: first subfield `a`.
    Language,
}

/// Tag-to-rule table, sorted by tag for binary search.
pub static RULES: &[(&str, ExtractRule)] = &[
    ("020", ExtractRule::Isbn),
    ("041", ExtractRule::Language),
    ("100", ExtractRule::Author),
    ("110", ExtractRule::Author),
    ("111", ExtractRule::Author),
    ("245", ExtractRule::Title),
    ("260", ExtractRule::Publication),
    ("264", ExtractRule::Publication),
    ("520", ExtractRule::Description),
    ("650", ExtractRule::Subjects),
    ("651", ExtractRule::Subjects),
    ("653", ExtractRule::Subjects),
];

/// Look up the extraction rule for a tag.
#[must_use]
pub fn rule_for_tag(tag: &str) -> Option<ExtractRule> {
    RULES
        .binary_search_by(|(t, _)| (*t).cmp(tag))
        .ok()
        .map(|i| RULES[i].1)
}

/// Build a [`BibliographicRecord`] from the ordered field sequence of one
/// record, including its composed searchable text.
///
/// Fields without a rule are ignored. The embedding vector and indexing
/// timestamp are left unset; they are attached by the pipeline at emission.
#[must_use]
pub fn extract_record(fields: &[Field]) -> BibliographicRecord {
    let mut record = BibliographicRecord::default();
    for field in fields {
        let Some(rule) = rule_for_tag(&field.tag) else {
            continue;
        };
        match rule {
            ExtractRule::Title => extract_title(field, &mut record),
            ExtractRule::Author => extract_author(field, &mut record),
            ExtractRule::Publication => extract_publication(field, &mut record),
            ExtractRule::Isbn => extract_isbn(field, &mut record),
            ExtractRule::Subjects => {
                for subject in field.subfields_with_code(b'a') {
                    record
                        .subjects
                        .push(subject.strip_suffix('.').unwrap_or(subject).to_string());
                }
            },
            ExtractRule::Description => {
                if record.description.is_empty() {
                    if let Some(description) = field.first_subfield(b'a') {
                        record.description = description.to_string();
                    }
                }
            },
            ExtractRule::Language => {
                if record.language.is_empty() {
                    if let Some(language) = field.first_subfield(b'a') {
                        record.language = language.to_string();
                    }
                }
            },
        }
    }
    record.searchable_text = record.compose_searchable_text();
    record
}

/// Join 245 `a` and `b` with `" : "`; `c` (statement of responsibility) is
/// excluded from the title.
fn extract_title(field: &Field, record: &mut BibliographicRecord) {
    if !record.title.is_empty() {
        return;
    }
    let parts: Vec<&str> = field
        .subfields
        .iter()
        .filter(|sf| sf.code == b'a' || sf.code == b'b')
        .map(|sf| sf.data.as_str())
        .collect();
    if !parts.is_empty() {
        record.title = parts.join(" : ").trim().to_string();
    }
}

fn extract_author(field: &Field, record: &mut BibliographicRecord) {
    if !record.author.is_empty() {
        return;
    }
    if let Some(name) = field.first_subfield(b'a') {
        record.author = name.trim().trim_end_matches(',').trim_end().to_string();
    }
}

/// 260/264: subfield `b` sets the publisher, subfield `c` the year. A year
/// candidate outside `[1000, 3000)` does not consume the first-wins slot.
fn extract_publication(field: &Field, record: &mut BibliographicRecord) {
    for subfield in &field.subfields {
        match subfield.code {
            b'b' if record.publisher.is_empty() => {
                let publisher = subfield
                    .data
                    .trim()
                    .trim_end_matches([',', ':', '.'])
                    .trim()
                    .to_string();
                if !publisher.is_empty() {
                    record.publisher = publisher;
                }
            },
            b'c' if record.publication_year.is_none() => {
                if let Some(m) = YEAR_PATTERN.find(&subfield.data) {
                    if let Ok(year) = m.as_str().parse::<u16>() {
                        if (1000..3000).contains(&year) {
                            record.publication_year = Some(year);
                        }
                    }
                }
            },
            _ => {},
        }
    }
}

fn extract_isbn(field: &Field, record: &mut BibliographicRecord) {
    if !record.isbn.is_empty() {
        return;
    }
    for candidate in field.subfields_with_code(b'a') {
        // Qualifiers like "(pbk.)" follow the number itself.
        let isbn = match candidate.find('(') {
            Some(idx) => candidate[..idx].trim_end(),
            None => candidate.trim(),
        };
        let clean: String = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
        if is_valid_isbn(&clean) {
            record.isbn = isbn.to_string();
            return;
        }
    }
}

/// ISBN shape check on the hyphen-and-space-free form: exactly 10 or 13
/// characters, all digits, except the final character of a 10-character ISBN
/// may be `X` or `x`.
fn is_valid_isbn(clean: &str) -> bool {
    match clean.len() {
        10 => clean
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || (i == 9 && (c == 'X' || c == 'x'))),
        13 => clean.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Subfield;
    use smallvec::SmallVec;

    fn field(tag: &str, subfields: &[(u8, &str)]) -> Field {
        Field {
            tag: tag.to_string(),
            indicator1: b' ',
            indicator2: b' ',
            subfields: subfields
                .iter()
                .map(|(code, data)| Subfield {
                    code: *code,
                    data: (*data).to_string(),
                })
                .collect::<SmallVec<[Subfield; 4]>>(),
        }
    }

    #[test]
    fn every_rule_tag_resolves() {
        for (tag, rule) in RULES {
            assert_eq!(rule_for_tag(tag), Some(*rule));
        }
        assert_eq!(rule_for_tag("008"), None);
        assert_eq!(rule_for_tag("999"), None);
    }

    #[test]
    fn title_joins_main_and_subtitle() {
        let record = extract_record(&[field(
            "245",
            &[(b'a', "The Great Book"), (b'b', "a novel"), (b'c', "by J. Smith")],
        )]);
        assert_eq!(record.title, "The Great Book : a novel");
    }

    #[test]
    fn first_author_field_wins() {
        let record = extract_record(&[
            field("100", &[(b'a', "Smith, John,")]),
            field("110", &[(b'a', "Acme Corporation")]),
        ]);
        assert_eq!(record.author, "Smith, John");
    }

    #[test]
    fn corporate_author_used_when_no_personal_name() {
        let record = extract_record(&[field("110", &[(b'a', "Acme Corporation")])]);
        assert_eq!(record.author, "Acme Corporation");
    }

    #[test]
    fn publisher_ignores_place_and_strips_punctuation() {
        let record = extract_record(&[field(
            "260",
            &[(b'a', "New York"), (b'b', "Penguin Press,"), (b'c', "c1998")],
        )]);
        assert_eq!(record.publisher, "Penguin Press");
        assert_eq!(record.publication_year, Some(1998));
    }

    #[test]
    fn year_without_four_digit_run_is_not_set() {
        let record = extract_record(&[field("264", &[(b'c', "circa 99")])]);
        assert_eq!(record.publication_year, None);
    }

    #[test]
    fn out_of_range_year_does_not_consume_first_wins_slot() {
        let record = extract_record(&[
            field("260", &[(b'c', "0042")]),
            field("264", &[(b'c', "c1998")]),
        ]);
        assert_eq!(record.publication_year, Some(1998));
    }

    #[test]
    fn isbn_qualifier_is_stripped_before_validation() {
        let record = extract_record(&[field("020", &[(b'a', "0-13-468599-7 (pbk.)")])]);
        assert_eq!(record.isbn, "0-13-468599-7");
    }

    #[test]
    fn invalid_isbn_keeps_scanning() {
        let record = extract_record(&[
            field("020", &[(b'a', "not-an-isbn")]),
            field("020", &[(b'a', "978-0-13-468599-1")]),
        ]);
        assert_eq!(record.isbn, "978-0-13-468599-1");
    }

    #[test]
    fn isbn10_check_character_allowed_only_in_final_position() {
        assert!(is_valid_isbn("013468599X"));
        assert!(is_valid_isbn("013468599x"));
        assert!(!is_valid_isbn("01346859X9"));
        assert!(!is_valid_isbn("978013468599X"));
    }

    #[test]
    fn subjects_accumulate_with_duplicates() {
        let record = extract_record(&[
            field("650", &[(b'a', "Whales"), (b'a', "Sea stories")]),
            field("651", &[(b'a', "Nantucket (Mass.)")]),
            field("653", &[(b'a', "Whales")]),
        ]);
        assert_eq!(
            record.subjects,
            vec!["Whales", "Sea stories", "Nantucket (Mass.)", "Whales"]
        );
    }

    #[test]
    fn searchable_text_is_composed_on_extract() {
        let record = extract_record(&[
            field("245", &[(b'a', "Moby Dick")]),
            field("100", &[(b'a', "Melville, Herman")]),
        ]);
        assert_eq!(record.searchable_text, "Moby Dick Melville, Herman");
    }

    #[test]
    fn extraction_is_idempotent() {
        let fields = vec![
            field("245", &[(b'a', "Moby Dick")]),
            field("650", &[(b'a', "Whales")]),
        ];
        assert_eq!(extract_record(&fields), extract_record(&fields));
    }
}
