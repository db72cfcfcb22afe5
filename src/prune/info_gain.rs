// Information-gain pruning: keep the N terms that best separate document
// labels.
//
// A term's score is the reduction in label entropy from knowing whether a
// document contains it:
//
//   IG(t) = H(C) - P(t) H(C | t) - P(!t) H(C | !t)
//
// Documents without a label share one implicit class. With a single class
// every score is 0, and selection falls back to the id tie-break.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::alphabet::Alphabet;
use crate::corpus::Corpus;
use crate::error::Result;

/// Entropy, in bits, of a distribution given as counts over `total`.
fn entropy<I: IntoIterator<Item = f64>>(counts: I, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    // Summed in sorted order so permuted counts give bit-identical results.
    let mut nonzero: Vec<f64> = counts.into_iter().filter(|&c| c > 0.0).collect();
    nonzero.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    nonzero
        .into_iter()
        .map(|c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum()
}

/// Information-gain score for every feature id in the corpus's alphabet.
pub fn information_gain(corpus: &Corpus) -> Vec<f64> {
    let num_features = corpus.alphabet().len();
    let num_docs = corpus.len();
    if num_docs == 0 {
        return vec![0.0; num_features];
    }

    // Dense class index per document
    let mut classes: HashMap<Option<&str>, usize> = HashMap::new();
    let doc_class: Vec<usize> = corpus
        .documents()
        .iter()
        .map(|d| {
            let next = classes.len();
            *classes.entry(d.label.as_deref()).or_insert(next)
        })
        .collect();
    let num_classes = classes.len();

    let mut class_totals = vec![0.0; num_classes];
    for &c in &doc_class {
        class_totals[c] += 1.0;
    }

    // present[f * num_classes + c] = documents of class c containing f
    let mut present = vec![0.0; num_features * num_classes];
    let mut last_seen = vec![usize::MAX; num_features];
    for (doc_index, doc) in corpus.documents().iter().enumerate() {
        let class = doc_class[doc_index];
        for &id in doc.features.ids() {
            if id < num_features && last_seen[id] != doc_index {
                last_seen[id] = doc_index;
                present[id * num_classes + class] += 1.0;
            }
        }
    }

    let total = num_docs as f64;
    let base = entropy(class_totals.iter().copied(), total);

    (0..num_features)
        .map(|f| {
            let with = &present[f * num_classes..(f + 1) * num_classes];
            let n_with: f64 = with.iter().sum();
            let n_without = total - n_with;

            let h_with = entropy(with.iter().copied(), n_with);
            let h_without = entropy(
                class_totals.iter().zip(with).map(|(all, w)| all - w),
                n_without,
            );

            base - (n_with / total) * h_with - (n_without / total) * h_without
        })
        .collect()
}

/// Ids of the `n` highest-scoring features, ties broken by ascending id.
/// The result is returned in ascending id order.
pub fn select_top_n(scores: &[f64], n: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    ranked.truncate(n);
    ranked.sort_unstable();
    ranked
}

/// Build the next corpus generation holding exactly the top `n` features.
///
/// The new alphabet lists the selected terms in their old id order; every
/// document keeps only occurrences of selected terms, in their original order.
pub fn prune_to_top_n(corpus: &Corpus, n: usize) -> Result<Corpus> {
    let scores = information_gain(corpus);
    let selected = select_top_n(&scores, n);
    let old = corpus.alphabet();

    let mut alphabet = Alphabet::new();
    let mut table = vec![None; old.len()];
    for id in selected {
        table[id] = Some(alphabet.intern(old.require_term(id)?));
    }

    let features = corpus
        .documents()
        .iter()
        .map(|doc| doc.features.remap(&table))
        .collect::<Result<Vec<_>>>()?;

    corpus.with_generation(alphabet, features)
}
