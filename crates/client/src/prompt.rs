//! Prompt construction for the bilingual tutor.
//!
//! Both prompts demand the explicit `ENGLISH:` / `SWAHILI:` output format
//! that [`crate::bilingual::parse_bilingual`] expects. Context documents are
//! stuffed inline rather than sent as separate messages.

use crate::retrieval::Document;

/// Join retrieved chunks into a single context block.
pub fn stuff_documents(docs: &[Document]) -> String {
    docs.iter().map(|d| d.content.trim()).collect::<Vec<_>>().join("\n\n")
}

/// Prompt for answering one question against textbook excerpts.
pub fn answer_prompt(chapter: &str, context: &str, question: &str) -> String {
    format!(
        "You are a helpful, curriculum-aligned Biology tutor for Form 1 students in Kenya.\n\
         \n\
         Using the following textbook excerpts, answer the question clearly and completely in BOTH English AND Swahili.\n\
         \n\
         Chapter: {chapter}\n\
         Textbook Content:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         ---\n\
         \n\
         IMPORTANT: You MUST provide your answer in BOTH languages:\n\
         \n\
         1. First, write a clear, complete answer in English.\n\
         2. Then, write the SAME answer in Swahili (a direct translation or explanation in Swahili).\n\
         \n\
         Format your response EXACTLY as follows:\n\
         \n\
         ENGLISH:\n\
         [your complete English answer here]\n\
         \n\
         SWAHILI:\n\
         [your complete Swahili answer here]"
    )
}

/// Prompt for a full-chapter revision summary.
pub fn summary_prompt(chapter: &str, context: &str) -> String {
    format!(
        "You are a helpful, curriculum-aligned Biology tutor for Form 1 students in Kenya.\n\
         \n\
         Your task is to write a **complete and helpful revision summary** of the chapter below.\n\
         \n\
         You MUST provide the summary in BOTH English AND Swahili.\n\
         \n\
         The summary should include:\n\
         - Clear **definitions** of important terms (e.g. osmosis, digestion, vitamins)\n\
         - **Descriptions of processes**, procedures, or stages (e.g. how digestion works)\n\
         - **Examples** of items, functions, or outcomes\n\
         - Lists of key components (e.g. nutrients, vitamins, organs)\n\
         - Mentions of **diagrams, apparatus, or activities**\n\
         - **Functions or roles** of major parts or systems\n\
         \n\
         Be as detailed and helpful as possible.\n\
         \n\
         Chapter: {chapter}\n\
         Textbook Content:\n\
         {context}\n\
         \n\
         ---\n\
         \n\
         IMPORTANT: You MUST provide the summary in BOTH languages:\n\
         \n\
         1. First, write a detailed, comprehensive summary in English.\n\
         2. Then, write the SAME summary in Swahili (a complete translation/explanation in Swahili).\n\
         \n\
         Format your response EXACTLY as follows:\n\
         \n\
         ENGLISH:\n\
         [your detailed English summary here - multiple paragraphs if needed]\n\
         \n\
         SWAHILI:\n\
         [your detailed Swahili summary here - multiple paragraphs if needed]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::DocMetadata;

    fn doc(content: &str) -> Document {
        Document { content: content.to_string(), metadata: DocMetadata::default() }
    }

    #[test]
    fn test_stuff_documents() {
        let docs = vec![doc(" first chunk "), doc("second chunk")];
        assert_eq!(stuff_documents(&docs), "first chunk\n\nsecond chunk");
    }

    #[test]
    fn test_answer_prompt_contains_parts() {
        let prompt = answer_prompt("3", "Osmosis is...", "What is osmosis?");
        assert!(prompt.contains("Chapter: 3"));
        assert!(prompt.contains("Question: What is osmosis?"));
        assert!(prompt.contains("ENGLISH:"));
        assert!(prompt.contains("SWAHILI:"));
    }

    #[test]
    fn test_summary_prompt_contains_parts() {
        let prompt = summary_prompt("2", "The cell is...");
        assert!(prompt.contains("Chapter: 2"));
        assert!(prompt.contains("revision summary"));
        assert!(prompt.contains("SWAHILI:"));
    }
}
