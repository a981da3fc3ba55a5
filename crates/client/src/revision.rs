//! Revision question extraction.
//!
//! Revision chunks were split into one candidate question per document at
//! ingestion time, but the split also captured section headers, figure
//! captions and page furniture. This module filters the candidates down to
//! text that actually reads like a question.

use crate::retrieval::Document;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Prefixes marking page furniture rather than questions.
const NOISE_PREFIXES: [&str; 5] = ["index", "--- page", "chapter", "fig.", "plate"];

/// Section titles that the ingestion split mistakes for questions.
const HEADER_KEYWORDS: [&str; 10] = [
    "introduction",
    "the cell",
    "the light microscope",
    "the electron microscope",
    "classification",
    "preparation of",
    "estimation of",
    "external features",
    "magnification",
    "handling and care",
];

/// Words that mark interrogatives and exam-style instructions.
const QUESTION_INDICATORS: [&str; 18] = [
    "what", "why", "how", "when", "where", "which", "who", "explain", "define", "describe", "list", "state", "name",
    "give", "distinguish", "compare", "calculate", "discuss",
];

static ENUMERATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]").expect("valid regex"));

/// Whether `text` looks like a real question rather than a section header.
pub fn is_likely_question(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < 15 {
        return false;
    }

    let lower = text.to_lowercase();

    if HEADER_KEYWORDS
        .iter()
        .any(|kw| lower == *kw || lower.starts_with(&format!("{kw} ")))
    {
        return false;
    }

    if text.contains('?') {
        return true;
    }

    if ENUMERATOR_RE.is_match(text) {
        return true;
    }

    if QUESTION_INDICATORS.iter().any(|word| lower.contains(word)) {
        return true;
    }

    // short text with no question characteristics is a title
    text.chars().count() >= 50
}

fn clean_line(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    if NOISE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return None;
    }
    Some(text.to_string())
}

/// Extract plausible revision questions from retrieved revision chunks,
/// preserving first-seen order and dropping duplicates.
pub fn extract_revision_questions(docs: &[Document]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut questions = Vec::new();

    for doc in docs {
        let Some(cleaned) = clean_line(&doc.content) else {
            continue;
        };
        if !is_likely_question(&cleaned) {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            questions.push(cleaned);
        }
    }

    questions
}
