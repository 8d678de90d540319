//! Heuristic named-entity extraction.
//!
//! Used when no learned NLP recognizer is configured. The extractor is a
//! best-effort, pattern-based fallback: false positives and negatives are
//! acceptable, but output must be deterministic for identical input.
//!
//! The pipeline is: collect matches from an ordered set of surface
//! patterns, resolve overlaps greedily (earliest start wins, longer match
//! preferred at the same start), drop denylisted surfaces, normalize
//! categories, aggregate occurrence counts, and rank by frequency.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Minimum occurrence count for a single-word PERSON candidate.
/// Common given names appearing once or twice are usually noise.
const SINGLE_NAME_MIN_COUNT: usize = 3;

/// Common words that match the capitalized patterns but are never entities.
const DENY_WORDS: &[&str] = &[
    "the", "this", "that", "these", "those", "content", "page", "executive", "executives",
    "research", "division", "analyst", "analysts", "edited", "special", "call", "participants",
    "version", "officer", "head", "and", "or", "but", "president", "director", "manager",
    "operator", "our", "your", "their", "chief", "vice", "senior", "assistant", "associate",
    "llc", "inc", "corp", "ltd", "co", "summary", "overview", "in", "on", "at", "to", "for",
    "of", "with", "from", "up", "about", "into", "through", "after", "over", "between", "out",
    "against", "during", "without", "before", "under", "around", "among",
];

/// Generic phrases that disqualify a match when contained in it.
const DENY_PHRASES: &[&str] = &[
    "research division",
    "marketing division",
    "sales division",
    "engineering division",
    "scientific officer",
    "head of",
    "director of",
    "president of",
    "chief of",
];

/// Normalized entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    /// A person's name.
    Person,
    /// An organization.
    Org,
    /// A recognized entity that is neither a person nor an organization.
    Entity,
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityLabel::Person => write!(f, "PERSON"),
            EntityLabel::Org => write!(f, "ORG"),
            EntityLabel::Entity => write!(f, "ENTITY"),
        }
    }
}

/// A named entity with its occurrence count. Ephemeral, derived from a
/// single extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    /// The surface text as it appeared in the document.
    pub text: String,
    /// The normalized category.
    pub label: EntityLabel,
    /// How many non-overlapping occurrences were counted.
    pub count: usize,
}

/// A capability for recognizing named entities in text.
///
/// Implementations are selected at engine construction time; the shipped
/// implementation is [`HeuristicRecognizer`]. A learned-model recognizer
/// is just another implementation of this trait.
pub trait EntityRecognizer: Send + Sync {
    /// Extract up to `top_k` entities ranked by descending occurrence
    /// count, ties broken by first appearance in the text.
    fn extract(&self, text: &str, top_k: usize) -> Vec<NamedEntity>;
}

/// Which surface pattern produced a match. Order reflects specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// `Dr. Jane Smith`, `Mr. John A. Doe`
    TitledPerson,
    /// `John A. Smith`
    PersonInitial,
    /// `Acme Pharmaceuticals`, `Apple Inc.`
    OrgSuffix,
    /// A closed set of well-known acronyms (`FDA`, `NASDAQ`, ...).
    Acronym,
    /// `Jane Smith`
    FullName,
    /// Any other capitalized word; a weak single-word PERSON candidate.
    Capitalized,
}

/// The pattern-based fallback recognizer.
pub struct HeuristicRecognizer {
    patterns: Vec<(PatternKind, Regex)>,
}

impl HeuristicRecognizer {
    /// Compile the surface patterns.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a pattern fails to compile; this
    /// indicates a defect, not a runtime condition.
    pub fn new() -> Result<Self> {
        let sources: [(PatternKind, &str); 6] = [
            (
                PatternKind::TitledPerson,
                r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?(?:\s+[A-Z](?:[a-z]+|\.))+",
            ),
            (PatternKind::PersonInitial, r"\b[A-Z][a-z]+\s+[A-Z]\.\s+[A-Z][a-z]+(?:-[A-Z][a-z]+)?\b"),
            (
                PatternKind::OrgSuffix,
                r"\b[A-Z][A-Za-z&'\-]*(?:\s+[A-Z][A-Za-z&'\-]*)*\s+(?:Inc|Corp|Corporation|LLC|Ltd|Limited|Company|Co|Group|Therapeutics|Pharmaceuticals|Foundation|Institute|Agency|Association|Society|Organization|University|College|School|Hospital|Bank|Fund|Trust)\b\.?",
            ),
            (
                PatternKind::Acronym,
                r"\b(?:FDA|EPA|FBI|CIA|NASA|WHO|UN|EU|NATO|NASDAQ|NYSE|SEC)\b",
            ),
            (PatternKind::FullName, r"\b[A-Z][a-z]+\s+(?:[A-Z]\.\s+)?[A-Z][a-z]+(?:-[A-Z][a-z]+)?\b"),
            (PatternKind::Capitalized, r"\b[A-Z][a-z]{2,}\b"),
        ];

        let mut patterns = Vec::with_capacity(sources.len());
        for (kind, source) in sources {
            let regex = Regex::new(source)
                .map_err(|e| RagError::Config(format!("invalid entity pattern: {e}")))?;
            patterns.push((kind, regex));
        }
        Ok(Self { patterns })
    }

    fn collect_matches<'t>(&self, text: &'t str) -> Vec<PatternMatch<'t>> {
        let mut matches = Vec::new();
        for (kind, regex) in &self.patterns {
            for found in regex.find_iter(text) {
                matches.push(PatternMatch {
                    start: found.start(),
                    end: found.end(),
                    text: found.as_str().trim_end_matches(['.', ',']).trim(),
                    kind: *kind,
                });
            }
        }
        // Earliest start first; at the same start, longer matches win. The
        // sort is stable, so pattern specificity breaks remaining ties.
        matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        matches
    }
}

struct PatternMatch<'t> {
    start: usize,
    end: usize,
    text: &'t str,
    kind: PatternKind,
}

fn denied(surface: &str) -> bool {
    let lower = surface.to_lowercase();
    if surface.chars().count() <= 2 {
        return true;
    }
    if DENY_WORDS.contains(&lower.as_str()) {
        return true;
    }
    DENY_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Ligatures left behind by broken PDF text encoding; a surface
/// containing one is a mangled fragment, not an entity.
fn has_pdf_artifact(surface: &str) -> bool {
    surface.chars().any(|c| matches!(c, 'ﬁ' | 'ﬂ' | 'ﬃ'))
}

struct Aggregate {
    text: String,
    label: EntityLabel,
    count: usize,
}

impl EntityRecognizer for HeuristicRecognizer {
    fn extract(&self, text: &str, top_k: usize) -> Vec<NamedEntity> {
        if top_k == 0 || text.is_empty() {
            return Vec::new();
        }

        let matches = self.collect_matches(text);

        // Greedy non-overlapping selection, then denylist and category
        // normalization. Denied matches still occupy their span, so a
        // discarded long match does not resurrect the fragments inside it.
        let mut accepted_spans: Vec<(usize, usize)> = Vec::new();
        let mut order: Vec<Aggregate> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for m in matches {
            let overlaps =
                accepted_spans.iter().any(|&(start, end)| m.start < end && m.end > start);
            if overlaps {
                continue;
            }
            accepted_spans.push((m.start, m.end));

            if denied(m.text) || has_pdf_artifact(m.text) {
                continue;
            }

            let label = match m.kind {
                PatternKind::TitledPerson | PatternKind::PersonInitial | PatternKind::FullName => {
                    EntityLabel::Person
                }
                PatternKind::OrgSuffix | PatternKind::Acronym => EntityLabel::Org,
                PatternKind::Capitalized => EntityLabel::Person,
            };

            match positions.get(m.text) {
                Some(&position) => order[position].count += 1,
                None => {
                    positions.insert(m.text.to_string(), order.len());
                    order.push(Aggregate { text: m.text.to_string(), label, count: 1 });
                }
            }
        }

        // Single-word PERSON candidates need to recur before they count.
        let mut entities: Vec<Aggregate> = order
            .into_iter()
            .filter(|agg| {
                agg.label != EntityLabel::Person
                    || agg.text.contains(char::is_whitespace)
                    || agg.count >= SINGLE_NAME_MIN_COUNT
            })
            .collect();

        // Stable sort: ties keep first-seen order.
        entities.sort_by(|a, b| b.count.cmp(&a.count));
        entities.truncate(top_k);

        entities
            .into_iter()
            .map(|agg| NamedEntity { text: agg.text, label: agg.label, count: agg.count })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> HeuristicRecognizer {
        HeuristicRecognizer::new().expect("patterns compile")
    }

    #[test]
    fn denylist_blocks_common_words_and_bare_suffixes() {
        assert!(denied("The"));
        assert!(denied("LLC"));
        assert!(denied("Head of Research"));
        assert!(!denied("Acme Therapeutics"));
    }

    #[test]
    fn empty_input_and_zero_top_k_yield_nothing() {
        let r = recognizer();
        assert!(r.extract("", 5).is_empty());
        assert!(r.extract("Steve Jobs founded Apple Inc.", 0).is_empty());
    }

    #[test]
    fn titled_person_beats_inner_full_name() {
        let r = recognizer();
        let entities = r.extract("Dr. Jane Smith spoke first.", 5);
        assert_eq!(entities.len(), 1);
        assert!(entities[0].text.starts_with("Dr"));
        assert!(entities[0].text.ends_with("Jane Smith"));
        assert_eq!(entities[0].label, EntityLabel::Person);
    }
}
