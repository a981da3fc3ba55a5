//! Chat completion and embedding response types.

use serde::Deserialize;

/// Response body from the chat completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if the model returned one.
    pub fn text(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

/// Response body from the embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"ENGLISH:\nX\n\nSWAHILI:\nY"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().unwrap().starts_with("ENGLISH:"));
    }

    #[test]
    fn test_parse_empty_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_parse_embedding_response() {
        let json = r#"{"data":[{"embedding":[0.1,-0.2,0.3]}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data[0].embedding.len(), 3);
    }
}
