// Alphabet: the dense term <-> id vocabulary shared by every document.
//
// Ids are handed out in first-seen order and never reused. During document
// processing the alphabet only grows; pruning builds a fresh alphabet and the
// corpus swaps to it wholesale, so ids from an older generation are never
// valid against a newer one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bidirectional vocabulary mapping. Serialized as the plain list of terms in
/// id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Alphabet {
    terms: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an alphabet from terms in id order. Fails if a term repeats.
    pub fn from_terms<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alphabet = Self::new();
        for term in terms {
            let term = term.into();
            if alphabet.ids.contains_key(&term) {
                return Err(Error::DuplicateTerm(term));
            }
            alphabet.intern(&term);
        }
        Ok(alphabet)
    }

    /// Number of terms (also one past the largest id).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Look up the id of `term`, adding it if unseen.
    pub fn intern(&mut self, term: &str) -> usize {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.terms.len();
        self.terms.push(term.to_string());
        self.ids.insert(term.to_string(), id);
        id
    }

    /// Id of `term`, without growing the alphabet.
    pub fn id_of(&self, term: &str) -> Option<usize> {
        self.ids.get(term).copied()
    }

    /// Term for `id`, or `None` if out of range.
    pub fn term_of(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    /// Like `term_of` but reports an out-of-range id as an error.
    pub fn require_term(&self, id: usize) -> Result<&str> {
        self.term_of(id).ok_or(Error::FeatureOutOfRange {
            id,
            size: self.terms.len(),
        })
    }

    /// Terms in id order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Alphabet {
    type Error = Error;

    fn try_from(terms: Vec<String>) -> Result<Self> {
        Self::from_terms(terms)
    }
}

impl From<Alphabet> for Vec<String> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.terms
    }
}
