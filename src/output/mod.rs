// Output formatting: terminal display for prepared corpora and topic results.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so multi-byte terms never panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Render a realigned document as `word/topic` pairs, stopwords as `word/-`.
pub fn plain_assignments(assignments: &[crate::realign::TopicAssignment]) -> String {
    assignments
        .iter()
        .map(|a| format!("{}/{}", a.word, a.topic))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realign::{TopicAssignment, TopicLabel};

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_plain_assignments() {
        let assignments = vec![
            TopicAssignment::new("the", TopicLabel::Stopword),
            TopicAssignment::new("cat", TopicLabel::Topic(3)),
        ];
        assert_eq!(plain_assignments(&assignments), "the/- cat/3");
    }
}
