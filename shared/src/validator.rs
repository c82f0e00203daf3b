//! Message content validation.
//!
//! A fixed deny-list of substrings, matched case-insensitively. Substring
//! containment only; no word-boundary logic.

const DENY_LIST: &[&str] = &["敏感词1", "敏感词2", "测试敏感词"];

/// Returns true when the message may be sent. Absent or empty content has
/// nothing to block and is always allowed.
pub fn is_valid(content: Option<&str>) -> bool {
    let Some(content) = content else {
        return true;
    };
    if content.is_empty() {
        return true;
    }

    let lowered = content.to_lowercase();
    !DENY_LIST
        .iter()
        .any(|word| lowered.contains(&word.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_are_allowed() {
        assert!(is_valid(None));
        assert!(is_valid(Some("")));
    }

    #[test]
    fn test_clean_content_is_allowed() {
        assert!(is_valid(Some("hello")));
        assert!(is_valid(Some("敏感")));
        assert!(is_valid(Some("a perfectly normal message")));
    }

    #[test]
    fn test_denied_substrings_block() {
        assert!(!is_valid(Some("敏感词1")));
        assert!(!is_valid(Some("prefix 敏感词2 suffix")));
        assert!(!is_valid(Some("测试敏感词 content")));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        // Containment survives surrounding latin text in any case
        assert!(!is_valid(Some("ABC测试敏感词XYZ")));
        assert!(is_valid(Some("ABCXYZ")));
    }
}
