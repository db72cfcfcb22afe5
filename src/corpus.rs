// Corpus data model: tokens, feature sequences, documents, and the corpus
// that ties them to one alphabet generation.

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// One token of a document's original stream, with its stopword mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    #[serde(default)]
    pub is_stopword: bool,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_stopword: false,
        }
    }
}

/// Ordered alphabet ids for one document, stopwords already dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSequence(Vec<usize>);

impl FeatureSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: usize) {
        self.0.push(id);
    }

    pub fn ids(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add one unit of weight per occurrence into `weights`, indexed by id.
    pub fn add_weights_to(&self, weights: &mut [f64]) -> Result<()> {
        let size = weights.len();
        for &id in &self.0 {
            let slot = weights
                .get_mut(id)
                .ok_or(Error::FeatureOutOfRange { id, size })?;
            *slot += 1.0;
        }
        Ok(())
    }

    /// Rebuild this sequence through an old-id -> new-id table, dropping ids
    /// that map to `None`. Relative order of survivors is preserved.
    pub fn remap(&self, table: &[Option<usize>]) -> Result<FeatureSequence> {
        let mut out = Vec::with_capacity(self.0.len());
        for &id in &self.0 {
            let entry = table.get(id).ok_or(Error::FeatureOutOfRange {
                id,
                size: table.len(),
            })?;
            if let Some(new_id) = entry {
                out.push(*new_id);
            }
        }
        Ok(FeatureSequence(out))
    }

    /// Resolve every id to its term.
    pub fn terms<'a>(&self, alphabet: &'a Alphabet) -> Result<Vec<&'a str>> {
        self.0.iter().map(|&id| alphabet.require_term(id)).collect()
    }
}

impl From<Vec<usize>> for FeatureSequence {
    fn from(ids: Vec<usize>) -> Self {
        Self(ids)
    }
}

/// A processed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Where the document came from (file name, or a fixed name for literal strings)
    pub source_id: String,
    /// Class label used by information-gain pruning, if the source provides one
    pub label: Option<String>,
    /// The raw text as loaded
    pub raw: String,
    /// Full marked token stream, kept only when token caching is enabled.
    /// Pruning never touches it.
    pub cached_tokens: Option<Vec<Token>>,
    /// Engine-facing representation, valid against the owning corpus's alphabet
    pub features: FeatureSequence,
}

/// Documents sharing one alphabet generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    alphabet: Alphabet,
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Mutable access for the build phase, where the pipeline interns new terms.
    pub fn alphabet_mut(&mut self) -> &mut Alphabet {
        &mut self.alphabet
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Append a document built against this corpus's alphabet.
    pub fn push(&mut self, document: Document) -> Result<()> {
        check_ids(&document.features, self.alphabet.len())?;
        self.documents.push(document);
        Ok(())
    }

    /// Total token count across all feature sequences.
    pub fn feature_count(&self) -> usize {
        self.documents.iter().map(|d| d.features.len()).sum()
    }

    /// Check that every feature id is valid in the current alphabet.
    pub fn validate(&self) -> Result<()> {
        let size = self.alphabet.len();
        self.documents
            .iter()
            .try_for_each(|d| check_ids(&d.features, size))
    }

    /// Build the next generation of this corpus: a new alphabet plus one new
    /// feature sequence per document, in document order. Everything is checked
    /// before anything is moved, so a failure leaves no partially migrated
    /// documents behind.
    pub fn with_generation(
        &self,
        alphabet: Alphabet,
        features: Vec<FeatureSequence>,
    ) -> Result<Corpus> {
        if features.len() != self.documents.len() {
            return Err(Error::GenerationMismatch {
                documents: self.documents.len(),
                sequences: features.len(),
            });
        }
        for seq in &features {
            check_ids(seq, alphabet.len())?;
        }

        let documents = self
            .documents
            .iter()
            .zip(features)
            .map(|(doc, features)| Document {
                source_id: doc.source_id.clone(),
                label: doc.label.clone(),
                raw: doc.raw.clone(),
                cached_tokens: doc.cached_tokens.clone(),
                features,
            })
            .collect();

        Ok(Corpus {
            alphabet,
            documents,
        })
    }
}

fn check_ids(seq: &FeatureSequence, size: usize) -> Result<()> {
    match seq.ids().iter().find(|&&id| id >= size) {
        Some(&id) => Err(Error::FeatureOutOfRange { id, size }),
        None => Ok(()),
    }
}
