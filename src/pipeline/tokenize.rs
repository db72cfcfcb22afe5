// Markup stripping, tokenization and lowercasing.
//
// Markup removal has to run before tokenization, otherwise tag names and
// attribute values end up in the vocabulary.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Whether markup is stripped from raw text before tokenizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupFilter {
    Keep,
    Strip,
}

impl MarkupFilter {
    pub fn from_flag(filter_html: bool) -> Self {
        if filter_html {
            MarkupFilter::Strip
        } else {
            MarkupFilter::Keep
        }
    }

    pub fn apply(self, raw: &str) -> String {
        match self {
            MarkupFilter::Keep => raw.to_string(),
            MarkupFilter::Strip => strip_markup(raw),
        }
    }
}

fn script_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
            .expect("static pattern")
    })
}

fn tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static pattern"))
}

fn entities() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("static pattern"))
}

/// Remove tags, comments, script/style bodies, and decode character entities.
///
/// Tags become whitespace so words on either side of `<br>` don't fuse.
/// Unknown named entities are left as their bare name (`&copy;` -> `copy`),
/// which the markup-artifact stopword list then marks.
pub fn strip_markup(raw: &str) -> String {
    let text = script_blocks().replace_all(raw, " ");
    let text = tags().replace_all(&text, " ");
    entities()
        .replace_all(&text, |caps: &regex_lite::Captures<'_>| decode_entity(&caps[1]))
        .into_owned()
}

fn decode_entity(body: &str) -> String {
    let numeric = body
        .strip_prefix("#x")
        .or_else(|| body.strip_prefix("#X"))
        .map(|hex| u32::from_str_radix(hex, 16))
        .or_else(|| body.strip_prefix('#').map(|dec| dec.parse::<u32>()));

    if let Some(code) = numeric {
        return code
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
    }

    match body {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        "nbsp" => " ".to_string(),
        other => format!(" {other} "),
    }
}

/// Split text into word tokens.
///
/// Tokens are whitespace-separated runs with leading and trailing punctuation
/// trimmed (`"cat."` -> `"cat"`, `"don't"` stays whole). Runs with no letter or
/// digit at all (`"--"`, `"..."`) produce no token. The cached token stream, and
/// so a realigned document, has one entry per word token rather than per
/// whitespace run: `"cat -- sat"` caches 2 tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|run| run.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase every token in place.
pub fn lowercase(tokens: &mut [String]) {
    for token in tokens.iter_mut() {
        if token.chars().any(char::is_uppercase) {
            *token = token.to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_whitespace_and_punctuation() {
        assert_eq!(
            tokenize("The cat, sat.  On -- the \"mat\"!\n"),
            vec!["The", "cat", "sat", "On", "the", "mat"]
        );
    }

    #[test]
    fn test_tokenize_keeps_inner_punctuation() {
        assert_eq!(tokenize("don't re-use e.g."), vec!["don't", "re-use", "e.g"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
    }

    #[test]
    fn test_lowercase() {
        let mut tokens = vec!["The".to_string(), "CAT".to_string(), "épée".to_string()];
        lowercase(&mut tokens);
        assert_eq!(tokens, vec!["the", "cat", "épée"]);
    }

    #[test]
    fn test_strip_markup_removes_tags_and_scripts() {
        let html = "<html><head><style>p { color: red }</style></head>\
                    <body><p class=\"x\">Hello<br>world</p><script>var x = 1;</script></body></html>";
        let tokens = tokenize(&strip_markup(html));
        assert_eq!(tokens, vec!["Hello", "world"]);
    }

    #[test]
    fn test_strip_markup_decodes_entities() {
        assert_eq!(tokenize(&strip_markup("fish&nbsp;&amp;&nbsp;chips")), vec!["fish", "chips"]);
        assert_eq!(strip_markup("caf&#233;"), "café");
        assert_eq!(tokenize(&strip_markup("&copy;2010")), vec!["copy", "2010"]);
    }

    #[test]
    fn test_keep_filter_is_identity() {
        assert_eq!(MarkupFilter::Keep.apply("<b>bold</b>"), "<b>bold</b>");
    }
}
