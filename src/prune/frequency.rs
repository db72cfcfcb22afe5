// Frequency pruning: drop terms that occur fewer than `threshold` times
// across the whole corpus.

use crate::alphabet::Alphabet;
use crate::corpus::Corpus;
use crate::error::Result;

/// Total occurrence count of every feature id across all documents.
///
/// The table is indexed by id and sized to the corpus's current alphabet.
pub fn feature_weights(corpus: &Corpus) -> Result<Vec<f64>> {
    let mut weights = vec![0.0; corpus.alphabet().len()];
    for doc in corpus.documents() {
        doc.features.add_weights_to(&mut weights)?;
    }
    Ok(weights)
}

/// Build the next corpus generation keeping only terms whose total count is
/// at least `threshold`. A term with a count strictly below `threshold` is
/// dropped, along with all its occurrences.
///
/// Survivors keep their relative id order in the new alphabet, and their
/// relative order inside each document. Cached token streams are carried over
/// unchanged.
pub fn prune_by_frequency(corpus: &Corpus, threshold: usize) -> Result<Corpus> {
    let weights = feature_weights(corpus)?;
    let old = corpus.alphabet();

    let mut alphabet = Alphabet::new();
    let mut table = Vec::with_capacity(weights.len());
    for (id, &weight) in weights.iter().enumerate() {
        if weight >= threshold as f64 {
            table.push(Some(alphabet.intern(old.require_term(id)?)));
        } else {
            table.push(None);
        }
    }

    let features = corpus
        .documents()
        .iter()
        .map(|doc| doc.features.remap(&table))
        .collect::<Result<Vec<_>>>()?;

    corpus.with_generation(alphabet, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, PipelineOptions};
    use crate::source::RawDocument;

    fn corpus_of(texts: &[&str]) -> Corpus {
        let pipeline = Pipeline::new(&PipelineOptions::default());
        let mut corpus = Corpus::new();
        for text in texts {
            let doc = pipeline.process(RawDocument::from_text(*text), corpus.alphabet_mut());
            corpus.push(doc).unwrap();
        }
        corpus
    }

    #[test]
    fn test_feature_weights() {
        let corpus = corpus_of(&["cat sat cat", "dog cat"]);
        // ids: cat=0 sat=1 dog=2
        assert_eq!(feature_weights(&corpus).unwrap(), vec![3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let corpus = corpus_of(&["cat sat cat", "dog dog cat"]);
        let pruned = prune_by_frequency(&corpus, 2).unwrap();
        let terms: Vec<&str> = pruned.alphabet().terms().collect();
        assert_eq!(terms, vec!["cat", "dog"]);
        assert_eq!(
            pruned.documents()[0].features.terms(pruned.alphabet()).unwrap(),
            vec!["cat", "cat"]
        );
        assert_eq!(
            pruned.documents()[1].features.terms(pruned.alphabet()).unwrap(),
            vec!["dog", "dog", "cat"]
        );
    }

    #[test]
    fn test_threshold_zero_keeps_everything() {
        let corpus = corpus_of(&["cat sat", "dog"]);
        let pruned = prune_by_frequency(&corpus, 0).unwrap();
        assert_eq!(pruned.alphabet(), corpus.alphabet());
        assert_eq!(pruned.documents()[0].features, corpus.documents()[0].features);
    }

    #[test]
    fn test_cached_tokens_untouched() {
        let corpus = corpus_of(&["cat sat", "dog ran"]);
        let pruned = prune_by_frequency(&corpus, 2).unwrap();
        assert!(pruned.alphabet().is_empty());
        for (before, after) in corpus.documents().iter().zip(pruned.documents()) {
            assert!(after.features.is_empty());
            assert_eq!(before.cached_tokens, after.cached_tokens);
        }
    }
}
