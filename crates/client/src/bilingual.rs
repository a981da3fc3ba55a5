//! Bilingual model-output parsing.
//!
//! The prompts demand an explicit `ENGLISH:` / `SWAHILI:` layout, but model
//! output drifts; parsing falls back to a `{english, swahili}` JSON object
//! and finally to treating the whole text as English.

use regex::Regex;
use somo_core::BilingualAnswer;
use std::sync::LazyLock;

/// Placeholder used when no Swahili section could be recovered.
pub const SWAHILI_UNAVAILABLE: &str = "(Swahili version not available)";

static PAGE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^-+\s*page\s+-+\s*").expect("valid regex"));
static DASH_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"---+").expect("valid regex"));
static HEADING_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(index|chapter|section|part|revision|questions?)[\s:]*").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extract the English and Swahili halves of a model response.
pub fn parse_bilingual(output: &str) -> BilingualAnswer {
    let text = output.trim();

    if text.contains("ENGLISH:") && text.contains("SWAHILI:") {
        let (head, swahili) = match text.split_once("SWAHILI:") {
            Some((head, tail)) => (head, tail.trim()),
            None => (text, ""),
        };
        let english = head.replace("ENGLISH:", "");
        return BilingualAnswer { english: english.trim().to_string(), swahili: swahili.to_string() };
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text)
        && let (Some(english), Some(swahili)) = (value["english"].as_str(), value["swahili"].as_str())
    {
        return BilingualAnswer { english: english.trim().to_string(), swahili: swahili.trim().to_string() };
    }

    BilingualAnswer { english: text.to_string(), swahili: SWAHILI_UNAVAILABLE.to_string() }
}

/// Normalize one extracted question: strip page markers and heading
/// prefixes, collapse whitespace, cap length.
pub fn clean_question_text(text: &str) -> String {
    let text = text.trim();
    let text = PAGE_MARKER_RE.replace(text, "");
    let text = DASH_RUN_RE.replace_all(&text, "");
    let text = HEADING_PREFIX_RE.replace(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > 200 {
        let truncated: String = text.chars().take(197).collect();
        return format!("{}...", truncated.trim_end());
    }
    text.to_string()
}
