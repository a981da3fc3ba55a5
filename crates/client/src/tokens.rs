//! Rough token accounting for context budgeting.

/// Estimate the token count of `text` at roughly four characters per token.
///
/// Deliberately coarse; it only needs to keep stuffed context under the
/// model's window with headroom to spare.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_scales_with_length() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }
}
