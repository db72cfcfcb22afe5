// Realignment: laying the engine's topic labels back over the full token
// stream.
//
// The engine only ever sees the stopword-free, pruned feature stream, so its
// per-token output is shorter than the document. Walking the cached token
// stream alongside the engine's output recovers a label for every original
// token. Terms are compared, not just positions: a token that was pruned
// after caching is simply absent from the engine's stream.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alphabet::Alphabet;
use crate::corpus::Token;
use crate::error::Result;

/// A token's topic, or the marker for tokens the engine never saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicLabel {
    Topic(usize),
    Stopword,
}

impl TopicLabel {
    pub fn topic(self) -> Option<usize> {
        match self {
            TopicLabel::Topic(t) => Some(t),
            TopicLabel::Stopword => None,
        }
    }

    pub fn is_stopword(self) -> bool {
        self == TopicLabel::Stopword
    }
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicLabel::Topic(t) => write!(f, "{t}"),
            TopicLabel::Stopword => f.write_str("-"),
        }
    }
}

/// One word of a document with its topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub word: String,
    pub topic: TopicLabel,
}

impl TopicAssignment {
    pub fn new(word: impl Into<String>, topic: TopicLabel) -> Self {
        Self {
            word: word.into(),
            topic,
        }
    }
}

/// Result of realigning a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realignment {
    pub assignments: Vec<TopicAssignment>,
    /// False when no token cache was available and only the engine-visible
    /// stream could be labelled.
    pub includes_stopwords: bool,
}

/// Rebuild a per-token labelling of `tokens` from the engine's output.
///
/// `feature_ids[j]` / `topics[j]` describe the j-th token the engine saw,
/// resolved through `alphabet`. The result always has one entry per cached
/// token.
pub fn reconstruct(
    tokens: &[Token],
    feature_ids: &[usize],
    topics: &[usize],
    alphabet: &Alphabet,
) -> Vec<TopicAssignment> {
    let inferred = feature_ids.len().min(topics.len());
    if feature_ids.len() != topics.len() {
        debug!(
            features = feature_ids.len(),
            topics = topics.len(),
            "Engine output lengths differ, using the shorter"
        );
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut j = 0;
    let mut skipped = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.is_stopword {
            out.push(TopicAssignment::new(&token.text, TopicLabel::Stopword));
            continue;
        }

        if j >= inferred {
            // Engine output ran out before the cache did
            debug!(
                remaining = tokens.len() - i,
                "Engine stream exhausted, labelling rest as stopwords"
            );
            out.extend(
                tokens[i..]
                    .iter()
                    .map(|t| TopicAssignment::new(&t.text, TopicLabel::Stopword)),
            );
            break;
        }

        if alphabet.term_of(feature_ids[j]) == Some(token.text.as_str()) {
            out.push(TopicAssignment::new(&token.text, TopicLabel::Topic(topics[j])));
            j += 1;
        } else {
            skipped += 1;
            out.push(TopicAssignment::new(&token.text, TopicLabel::Stopword));
        }
    }

    if skipped > 0 {
        debug!(skipped, "Tokens absent from the engine stream (pruned after caching)");
    }

    out
}

/// Label only the tokens the engine saw, for documents without a token cache.
pub fn engine_visible(
    feature_ids: &[usize],
    topics: &[usize],
    alphabet: &Alphabet,
) -> Result<Vec<TopicAssignment>> {
    feature_ids
        .iter()
        .zip(topics)
        .map(|(&id, &topic)| {
            Ok(TopicAssignment::new(
                alphabet.require_term(id)?,
                TopicLabel::Topic(topic),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(words: &[(&str, bool)]) -> Vec<Token> {
        words
            .iter()
            .map(|(w, stop)| Token {
                text: w.to_string(),
                is_stopword: *stop,
            })
            .collect()
    }

    fn labels(assignments: &[TopicAssignment]) -> Vec<TopicLabel> {
        assignments.iter().map(|a| a.topic).collect()
    }

    #[test]
    fn test_stopwords_interleaved() {
        let alphabet = Alphabet::from_terms(["cat", "sat"]).unwrap();
        let tokens = marked(&[("the", true), ("cat", false), ("sat", false)]);
        let out = reconstruct(&tokens, &[0, 1], &[4, 2], &alphabet);
        assert_eq!(
            labels(&out),
            vec![TopicLabel::Stopword, TopicLabel::Topic(4), TopicLabel::Topic(2)]
        );
        assert_eq!(out[0].word, "the");
    }

    #[test]
    fn test_pruned_token_is_skipped_without_advancing() {
        let alphabet = Alphabet::from_terms(["cat", "mat"]).unwrap();
        // "sat" was pruned from the vocabulary after caching
        let tokens = marked(&[("cat", false), ("sat", false), ("mat", false)]);
        let out = reconstruct(&tokens, &[0, 1], &[1, 3], &alphabet);
        assert_eq!(
            labels(&out),
            vec![TopicLabel::Topic(1), TopicLabel::Stopword, TopicLabel::Topic(3)]
        );
    }

    #[test]
    fn test_exhausted_engine_stream() {
        let alphabet = Alphabet::from_terms(["cat"]).unwrap();
        let tokens = marked(&[("cat", false), ("cat", false), ("the", true), ("cat", false)]);
        let out = reconstruct(&tokens, &[0], &[2], &alphabet);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].topic, TopicLabel::Topic(2));
        assert!(out[1..].iter().all(|a| a.topic.is_stopword()));
    }

    #[test]
    fn test_empty_inputs() {
        let alphabet = Alphabet::new();
        assert!(reconstruct(&[], &[], &[], &alphabet).is_empty());
    }

    #[test]
    fn test_engine_visible() {
        let alphabet = Alphabet::from_terms(["cat", "sat"]).unwrap();
        let out = engine_visible(&[1, 0], &[0, 3], &alphabet).unwrap();
        assert_eq!(out[0], TopicAssignment::new("sat", TopicLabel::Topic(0)));
        assert_eq!(out[1], TopicAssignment::new("cat", TopicLabel::Topic(3)));
        assert!(engine_visible(&[7], &[0], &alphabet).is_err());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(TopicLabel::Topic(3).to_string(), "3");
        assert_eq!(TopicLabel::Stopword.to_string(), "-");
        assert_eq!(TopicLabel::Topic(3).topic(), Some(3));
    }
}
