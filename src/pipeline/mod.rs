// Document pipeline: raw text in, marked tokens and feature sequence out.
//
// Stage order is fixed: strip markup (optional) -> tokenize -> lowercase ->
// mark stopwords -> snapshot tokens (optional) -> build the feature sequence.
// Which optional stages run is decided once, when the pipeline is built.

pub mod stopwords;
pub mod tokenize;

use std::collections::BTreeSet;

use tracing::trace;

use crate::alphabet::Alphabet;
use crate::corpus::{Document, FeatureSequence, Token};
use crate::source::RawDocument;

use self::stopwords::StopwordSet;
use self::tokenize::{lowercase, tokenize, MarkupFilter};

/// Flags the pipeline is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Strip markup before tokenizing, and treat markup artifacts as stopwords
    pub filter_html: bool,
    /// Include the builtin English stopword list
    pub english_stopwords: bool,
    /// Caller-supplied stopwords (lowercased)
    pub custom_stopwords: BTreeSet<String>,
    /// Keep each document's full marked token stream for realignment
    pub cache_tokens: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            filter_html: false,
            english_stopwords: false,
            custom_stopwords: BTreeSet::new(),
            cache_tokens: true,
        }
    }
}

/// What happens to the marked token stream once features are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCache {
    Keep,
    Discard,
}

/// A configured pipeline. Stateless apart from its configuration, so the
/// same input and alphabet always give the same document.
#[derive(Debug, Clone)]
pub struct Pipeline {
    markup: MarkupFilter,
    stopwords: StopwordSet,
    cache: TokenCache,
}

impl Pipeline {
    pub fn new(options: &PipelineOptions) -> Self {
        let mut stopwords = StopwordSet::new().with_words(&options.custom_stopwords);
        if options.english_stopwords {
            stopwords = stopwords.with_english();
        }
        if options.filter_html {
            stopwords = stopwords.with_markup_artifacts();
        }

        Self {
            markup: MarkupFilter::from_flag(options.filter_html),
            stopwords,
            cache: if options.cache_tokens {
                TokenCache::Keep
            } else {
                TokenCache::Discard
            },
        }
    }

    pub fn caches_tokens(&self) -> bool {
        self.cache == TokenCache::Keep
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Run the tokenizing and marking stages only.
    pub fn mark(&self, raw: &str) -> Vec<Token> {
        let text = self.markup.apply(raw);
        let mut words = tokenize(&text);
        lowercase(&mut words);

        let mut tokens: Vec<Token> = words.into_iter().map(Token::new).collect();
        self.stopwords.mark(&mut tokens);
        tokens
    }

    /// Process one document, interning its non-stopword terms into `alphabet`.
    pub fn process(&self, raw: RawDocument, alphabet: &mut Alphabet) -> Document {
        let tokens = self.mark(&raw.content);

        let mut features = FeatureSequence::new();
        for token in tokens.iter().filter(|t| !t.is_stopword) {
            features.push(alphabet.intern(&token.text));
        }

        trace!(
            source = %raw.source_id,
            tokens = tokens.len(),
            features = features.len(),
            "Processed document"
        );

        let cached_tokens = match self.cache {
            TokenCache::Keep => Some(tokens),
            TokenCache::Discard => None,
        };

        Document {
            source_id: raw.source_id,
            label: raw.label,
            raw: raw.content,
            cached_tokens,
            features,
        }
    }
}
