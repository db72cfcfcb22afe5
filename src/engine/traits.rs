// Inference engine trait: the boundary to the topic model.
//
// The core never samples topics itself. It hands a pruned corpus to an
// engine, blocks on `estimate`, and reads results back through this trait.
// Engines may parallelize internally and write checkpoints on their own
// schedule; none of that is visible here.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::config::{EngineConfig, ModelParams};
use crate::alphabet::Alphabet;
use crate::corpus::Corpus;

/// A word with its weight inside one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedWord {
    pub word: String,
    pub weight: f64,
}

impl WeightedWord {
    pub fn new(word: impl Into<String>, weight: f64) -> Self {
        Self {
            word: word.into(),
            weight,
        }
    }
}

/// The engine's view of one document: the feature ids it saw and the topic
/// it assigned to each, position by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAssignments {
    pub feature_ids: Vec<usize>,
    pub topics: Vec<usize>,
}

/// Trait for a topic inference engine.
pub trait InferenceEngine {
    /// Parameters the model was created or loaded with.
    fn params(&self) -> ModelParams;

    /// Apply the derived run configuration.
    fn configure(&mut self, config: &EngineConfig) -> Result<()>;

    /// Hand over the corpus to run on. Feature ids are read against the
    /// corpus's alphabet; the engine must not assume the corpus outlives the
    /// call.
    fn add_corpus(&mut self, corpus: &Corpus) -> Result<()>;

    /// Run to completion or fail.
    fn estimate(&mut self) -> Result<()>;

    /// The vocabulary that assignment feature ids and rankings refer to.
    fn alphabet(&self) -> &Alphabet;

    /// Number of documents the engine holds results for.
    fn num_documents(&self) -> usize;

    /// The `n` most probable words of `topic`, best first. May return fewer
    /// when the vocabulary is smaller.
    fn top_words(&self, topic: usize, n: usize) -> Vec<String>;

    /// Every word with non-zero weight in `topic`, ranked by descending weight.
    fn sorted_weighted_words(&self, topic: usize) -> Vec<WeightedWord>;

    /// Per-position assignments for one document.
    fn document_assignments(&self, doc: usize) -> Option<DocumentAssignments>;

    /// Write the model so it can be restored with `EngineFactory::load_serialized`.
    fn serialize(&self, path: &Path) -> Result<()>;

    /// Write the plain-text sampling state.
    fn dump_state(&self, path: &Path) -> Result<()>;
}

/// Creates engines, fresh or from a serialized model.
pub trait EngineFactory {
    type Engine: InferenceEngine;

    fn create(&self, params: &ModelParams) -> Result<Self::Engine>;

    fn load_serialized(&self, path: &Path) -> Result<Self::Engine>;
}
