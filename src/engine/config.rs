// Engine configuration: the model parameters plus the run schedule derived
// from the requested iteration count.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default iteration count for a new model.
pub const DEFAULT_ITERATIONS: i64 = 250;

/// Default symmetric topic-word smoothing.
pub const DEFAULT_BETA: f64 = 0.03;

/// Parameters a model is created with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub topic_count: usize,
    /// Sum of the document-topic Dirichlet parameters
    pub alpha: f64,
    pub beta: f64,
}

impl ModelParams {
    pub fn new(topic_count: usize, alpha: f64, beta: f64) -> Result<Self> {
        if topic_count == 0 {
            return Err(Error::InvalidTopicCount);
        }
        Ok(Self {
            topic_count,
            alpha,
            beta,
        })
    }

    /// `alpha = 50 / K`, `beta = 0.03`.
    pub fn with_defaults(topic_count: usize) -> Result<Self> {
        if topic_count == 0 {
            return Err(Error::InvalidTopicCount);
        }
        Self::new(topic_count, 50.0 / topic_count as f64, DEFAULT_BETA)
    }
}

/// Write a checkpoint to `path` every `every` iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub path: PathBuf,
    pub every: usize,
}

/// Run settings as the caller set them, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub iterations: i64,
    pub threads: usize,
    /// Print intermediate topics every this many iterations
    pub show_topics_interval: usize,
    /// How many words to print per intermediate topic
    pub show_top_words: usize,
    pub intermediate_state: Option<Checkpoint>,
    pub intermediate_model: Option<Checkpoint>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            threads: 1,
            show_topics_interval: 10,
            show_top_words: 7,
            intermediate_state: None,
            intermediate_model: None,
        }
    }
}

/// Everything the engine is configured with before `estimate`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub model: ModelParams,
    pub iterations: usize,
    pub threads: usize,
    pub optimize_interval: usize,
    pub burnin_period: usize,
    pub show_topics_interval: usize,
    pub show_top_words: usize,
    pub intermediate_state: Option<Checkpoint>,
    pub intermediate_model: Option<Checkpoint>,
}

/// Hyperparameter optimization interval and burn-in for an iteration count:
/// `(50, 50)` from 100 iterations, `(30, 25)` from 50, otherwise none.
pub fn schedule(iterations: usize) -> (usize, usize) {
    if iterations >= 100 {
        (50, 50)
    } else if iterations >= 50 {
        (30, 25)
    } else {
        (0, 0)
    }
}

impl EngineConfig {
    /// Combine model parameters and run settings, applying the schedule.
    /// Fewer than one iteration is rejected.
    pub fn derive(model: ModelParams, run: &RunSettings) -> Result<Self> {
        if run.iterations < 1 {
            return Err(Error::InvalidIterations(run.iterations));
        }
        let iterations = run.iterations as usize;
        let (optimize_interval, burnin_period) = schedule(iterations);

        Ok(Self {
            model,
            iterations,
            threads: run.threads,
            optimize_interval,
            burnin_period,
            show_topics_interval: run.show_topics_interval,
            show_top_words: run.show_top_words,
            intermediate_state: run.intermediate_state.clone(),
            intermediate_model: run.intermediate_model.clone(),
        })
    }
}
