//! Bilingual answer payloads.
//!
//! These are the shapes that flow through the query cache: a single
//! English/Swahili pair, or a list of answered revision questions. An empty
//! list is itself a cacheable value meaning "no questions found for this
//! chapter".

use serde::{Deserialize, Serialize};

/// A paired English/Swahili answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BilingualAnswer {
    pub english: String,
    pub swahili: String,
}

/// One revision question together with its bilingual answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RevisionAnswer {
    pub question_text: String,
    pub answer: BilingualAnswer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilingual_round_trip() {
        let answer = BilingualAnswer { english: "X".into(), swahili: "Y".into() };
        let json = serde_json::to_string(&answer).unwrap();
        assert_eq!(json, r#"{"english":"X","swahili":"Y"}"#);
        let back: BilingualAnswer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn test_empty_revision_list_is_serializable() {
        let none: Vec<RevisionAnswer> = Vec::new();
        let json = serde_json::to_string(&none).unwrap();
        assert_eq!(json, "[]");
        let back: Vec<RevisionAnswer> = serde_json::from_str(&json).unwrap();
        assert!(back.is_empty());
    }
}
