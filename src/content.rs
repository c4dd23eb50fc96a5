//! Thought validation
//!
//! Runs locally before anything is written: trims, bounds the length, and
//! rejects blocklisted substrings regardless of case.

use crate::consts::{BLOCKLIST, POST_MAX_LENGTH};
use crate::error::ValidationError;

/// True when `text` contains no blocklisted substring (case-insensitive)
pub fn is_text_clean(text: &str) -> bool {
    let lower = text.to_lowercase();
    !BLOCKLIST.iter().any(|word| lower.contains(word))
}

/// Lowercased whitespace tokens stored alongside a post for search
pub fn content_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Validate raw input, returning the trimmed thought
pub fn validate_thought(raw: &str) -> Result<&str, ValidationError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = content.chars().count();
    if len > POST_MAX_LENGTH {
        return Err(ValidationError::TooLong {
            max: POST_MAX_LENGTH,
            len,
        });
    }
    if !is_text_clean(content) {
        return Err(ValidationError::Disallowed);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocklist_case_insensitive() {
        assert!(!is_text_clean("this is SPAMWORD here"));
        assert!(!is_text_clean("BadWord"));
        assert!(is_text_clean("clean thought"));
    }

    #[test]
    fn test_blocklist_matches_substrings() {
        assert!(!is_text_clean("antispamwordy"));
    }

    #[test]
    fn test_validate_trims() {
        assert_eq!(validate_thought("  hello void \n"), Ok("hello void"));
    }

    #[test]
    fn test_validate_rejects() {
        assert_eq!(validate_thought("   "), Err(ValidationError::Empty));
        assert_eq!(
            validate_thought("a badword b"),
            Err(ValidationError::Disallowed)
        );
        let long = "é".repeat(POST_MAX_LENGTH + 1);
        assert_eq!(
            validate_thought(&long),
            Err(ValidationError::TooLong {
                max: POST_MAX_LENGTH,
                len: POST_MAX_LENGTH + 1
            })
        );
        // Length counts characters, not bytes
        assert!(validate_thought(&"é".repeat(POST_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_content_words() {
        assert_eq!(
            content_words("  Hello   VOID\tagain "),
            vec!["hello", "void", "again"]
        );
        assert!(content_words("").is_empty());
    }
}
