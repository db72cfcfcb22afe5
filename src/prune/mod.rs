// Vocabulary pruning.
//
// Two passes, each producing a whole new corpus generation (alphabet plus
// every feature sequence). When both are enabled, frequency pruning runs
// first so information gain is only computed over terms that survive it.
// Each pass reads the previous generation and builds the next one; nothing
// is replaced until a pass has fully succeeded.

pub mod frequency;
pub mod info_gain;

use std::time::Instant;

use tracing::info;

use crate::corpus::Corpus;
use crate::error::Result;

/// Which passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOptions {
    /// Drop terms occurring fewer than this many times in total
    pub min_count: Option<usize>,
    /// Keep only this many terms, ranked by information gain
    pub top_n: Option<usize>,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            min_count: Some(3),
            top_n: None,
        }
    }
}

impl PruneOptions {
    pub fn none() -> Self {
        Self {
            min_count: None,
            top_n: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.min_count.is_some() || self.top_n.is_some()
    }
}

/// Vocabulary sizes observed while pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneReport {
    pub vocabulary_before: usize,
    pub after_frequency: Option<usize>,
    pub after_info_gain: Option<usize>,
}

impl PruneReport {
    pub fn vocabulary_after(&self) -> usize {
        self.after_info_gain
            .or(self.after_frequency)
            .unwrap_or(self.vocabulary_before)
    }
}

/// Run the enabled passes over `corpus` and return the final generation.
/// With no pass enabled the result is a copy of the input.
pub fn run(corpus: &Corpus, options: &PruneOptions) -> Result<(Corpus, PruneReport)> {
    let mut report = PruneReport {
        vocabulary_before: corpus.alphabet().len(),
        after_frequency: None,
        after_info_gain: None,
    };
    let mut current = corpus.clone();

    if let Some(threshold) = options.min_count {
        let started = Instant::now();
        let before = current.alphabet().len();
        current = frequency::prune_by_frequency(&current, threshold)?;
        report.after_frequency = Some(current.alphabet().len());
        info!(
            threshold,
            before,
            after = current.alphabet().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pruned uncommon words"
        );
    }

    if let Some(n) = options.top_n {
        let started = Instant::now();
        let before = current.alphabet().len();
        current = info_gain::prune_to_top_n(&current, n)?;
        report.after_info_gain = Some(current.alphabet().len());
        info!(
            top_n = n,
            before,
            after = current.alphabet().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pruned vocabulary by information gain"
        );
    }

    Ok((current, report))
}
