//! Metadata filter builders for corpus queries.
//!
//! Filters use the Mongo-style operator subset the index understands
//! (`$in`, equality). Chapter identifiers are strings throughout; "3"
//! matches the whole chapter while "3.2" names one section.

use serde_json::{Value, json};

/// Expand a chapter query into the identifiers it covers.
///
/// A bare major chapter ("3") covers its sections "3.1" through "3.9";
/// an explicit section ("3.2") covers only itself.
pub fn chapter_variants(chapter: &str) -> Vec<String> {
    let chapter = chapter.trim();
    if chapter.contains('.') {
        return vec![chapter.to_string()];
    }
    let mut variants = vec![chapter.to_string()];
    variants.extend((1..10).map(|i| format!("{chapter}.{i}")));
    variants
}

/// Major chapter prefix of a chapter query ("3.2" -> "3").
pub fn chapter_root(chapter: &str) -> String {
    chapter.split('.').next().unwrap_or(chapter).trim().to_string()
}

/// Match `doc_type` chunks belonging to `chapter` or any of its sections.
pub fn chapter_filter(doc_type: &str, chapter: &str) -> Value {
    json!({
        "type": doc_type,
        "chapter": { "$in": chapter_variants(chapter) }
    })
}

/// Match `doc_type` chunks with exactly this chapter identifier.
pub fn exact_chapter_filter(doc_type: &str, chapter: &str) -> Value {
    json!({
        "type": doc_type,
        "chapter": chapter
    })
}

/// Match `doc_type` chunks anywhere under the major chapter of `chapter`.
pub fn chapter_root_filter(doc_type: &str, chapter: &str) -> Value {
    json!({
        "type": doc_type,
        "chapter_root": chapter_root(chapter)
    })
}

/// Match chunks of one type regardless of chapter.
pub fn type_filter(doc_type: &str) -> Value {
    json!({ "type": doc_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_for_major_chapter() {
        let variants = chapter_variants("3");
        assert_eq!(variants.len(), 10);
        assert_eq!(variants[0], "3");
        assert_eq!(variants[1], "3.1");
        assert_eq!(variants[9], "3.9");
    }

    #[test]
    fn test_variants_for_section() {
        assert_eq!(chapter_variants("3.2"), vec!["3.2"]);
    }

    #[test]
    fn test_variants_trim_whitespace() {
        assert_eq!(chapter_variants(" 4 ")[0], "4");
    }

    #[test]
    fn test_chapter_root() {
        assert_eq!(chapter_root("3.2"), "3");
        assert_eq!(chapter_root("7"), "7");
    }

    #[test]
    fn test_chapter_filter_shape() {
        let filter = chapter_filter("content", "2");
        assert_eq!(filter["type"], "content");
        assert_eq!(filter["chapter"]["$in"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_exact_chapter_filter_shape() {
        let filter = exact_chapter_filter("revision", "1.5");
        assert_eq!(filter["chapter"], "1.5");
    }

    #[test]
    fn test_chapter_root_filter_shape() {
        let filter = chapter_root_filter("content", "5.3");
        assert_eq!(filter["chapter_root"], "5");
    }
}
