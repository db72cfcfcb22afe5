// Stopword sets and the marker stage.
//
// Stopwords are marked, never removed: the marked stream keeps every original
// position so topic labels can later be laid back over the full document.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use crate::corpus::Token;

/// Leftovers of markup that survive tag stripping: entity names, URL parts,
/// attribute and element names that appear in sloppy or escaped HTML.
pub const MARKUP_ARTIFACTS: &[&str] = &[
    "nbsp", "amp", "quot", "apos", "lt", "gt", "copy", "reg", "trade", "mdash", "ndash",
    "hellip", "laquo", "raquo", "http", "https", "www", "com", "org", "net", "html", "htm",
    "php", "asp", "jsp", "href", "src", "alt", "img", "div", "span", "class", "id", "style",
    "px", "em", "width", "height", "align", "valign", "border", "font", "face", "size",
    "color", "bgcolor", "br", "hr", "td", "tr", "th", "tbody", "table", "ul", "li", "ol",
    "jpg", "jpeg", "gif", "png", "css", "js", "javascript", "onclick", "target", "blank",
    "index", "mailto", "cellpadding", "cellspacing", "colspan", "rowspan",
];

/// The active stopword set. All entries are stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add caller-supplied words.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Add the builtin English list from the `stop-words` crate.
    pub fn with_english(self) -> Self {
        let english: Vec<String> = get(LANGUAGE::English);
        self.with_words(english)
    }

    /// Add the builtin markup-artifact list.
    pub fn with_markup_artifacts(self) -> Self {
        self.with_words(MARKUP_ARTIFACTS.iter().copied())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Flag every token whose text is in the set. Tokens are expected to be
    /// lowercased already. Returns how many were flagged.
    pub fn mark(&self, tokens: &mut [Token]) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        let mut marked = 0;
        for token in tokens.iter_mut() {
            if self.words.contains(&token.text) {
                token.is_stopword = true;
                marked += 1;
            }
        }
        marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| Token::new(*w)).collect()
    }

    #[test]
    fn test_mark_flags_without_removing() {
        let set = StopwordSet::new().with_words(["The", "a"]);
        let mut ts = tokens(&["the", "cat", "sat", "on", "a", "mat"]);
        assert_eq!(set.mark(&mut ts), 2);
        assert_eq!(ts.len(), 6);
        let flags: Vec<bool> = ts.iter().map(|t| t.is_stopword).collect();
        assert_eq!(flags, vec![true, false, false, false, true, false]);
    }

    #[test]
    fn test_english_list_contains_common_words() {
        let set = StopwordSet::new().with_english();
        assert!(set.contains("the"));
        assert!(set.contains("and"));
        assert!(!set.contains("cat"));
    }

    #[test]
    fn test_markup_artifacts() {
        let set = StopwordSet::new().with_markup_artifacts();
        assert!(set.contains("nbsp"));
        assert!(set.contains("href"));
        assert_eq!(set.len(), MARKUP_ARTIFACTS.len());
    }

    #[test]
    fn test_empty_set_marks_nothing() {
        let mut ts = tokens(&["the", "cat"]);
        assert_eq!(StopwordSet::new().mark(&mut ts), 0);
        assert!(ts.iter().all(|t| !t.is_stopword));
    }
}
