// Topic session: the front door for preparing documents, running an engine,
// and reading results back.
//
// Typical flow:
//   create_new_model -> stopword/prune settings -> add documents ->
//   extract_topics -> top_words / weighted_words / topic_assignments
//
// The pipeline is built from the settings when the first document is added
// and stays fixed after that, so every document shares one alphabet built
// under one configuration.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::cache::ResultCache;
use crate::corpus::Corpus;
use crate::engine::config::{Checkpoint, EngineConfig, ModelParams, RunSettings};
use crate::engine::traits::{EngineFactory, InferenceEngine, WeightedWord};
use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::prune::{self, PruneOptions, PruneReport};
use crate::realign::{self, Realignment};
use crate::source::{self, RawDocument};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Iteration counts below this get a warning.
pub const RECOMMENDED_MIN_ITERATIONS: i64 = 100;

/// Largest worker count that doesn't get a warning.
pub const MAX_RECOMMENDED_THREADS: usize = 8;

/// Everything a session can be configured with.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub pipeline: PipelineOptions,
    pub prune: PruneOptions,
    pub run: RunSettings,
    /// Where to write the finished model
    pub finished_model: Option<PathBuf>,
    /// Where to write the finished plain-text state
    pub finished_state: Option<PathBuf>,
}

/// What an `extract_topics` run did.
#[derive(Debug, Clone)]
pub struct InferenceReport {
    pub prune: PruneReport,
    pub documents: usize,
    pub tokens: usize,
    /// Save steps that failed; the inference result itself is still valid
    pub save_failures: Vec<String>,
}

pub struct TopicSession<F: EngineFactory> {
    factory: F,
    settings: Settings,
    engine: Option<F::Engine>,
    pipeline: Option<Pipeline>,
    corpus: Corpus,
    cache: Option<ResultCache>,
}

impl<F: EngineFactory> TopicSession<F> {
    pub fn new(factory: F) -> Self {
        Self::with_settings(factory, Settings::default())
    }

    pub fn with_settings(factory: F, settings: Settings) -> Self {
        Self {
            factory,
            settings,
            engine: None,
            pipeline: None,
            corpus: Corpus::new(),
            cache: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The corpus in its current generation (pruned, once topics were extracted).
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    pub fn topic_count(&self) -> Option<usize> {
        self.engine.as_ref().map(|e| e.params().topic_count)
    }

    // MODEL ----------------------------------------------------------------

    /// Start a fresh model. Iterations are reset to the default.
    pub fn create_new_model(&mut self, topic_count: usize, alpha: f64, beta: f64) -> Result<()> {
        let params = ModelParams::new(topic_count, alpha, beta)?;
        self.install_model(params)
    }

    /// Start a fresh model with `alpha = 50 / K` and `beta = 0.03`.
    pub fn create_new_model_default(&mut self, topic_count: usize) -> Result<()> {
        let params = ModelParams::with_defaults(topic_count)?;
        self.install_model(params)
    }

    fn install_model(&mut self, params: ModelParams) -> Result<()> {
        let engine = self.factory.create(&params).map_err(Error::Engine)?;
        self.settings.run.iterations = crate::engine::config::DEFAULT_ITERATIONS;
        self.cache = Some(ResultCache::new(params.topic_count));
        self.engine = Some(engine);
        info!(topics = params.topic_count, alpha = params.alpha, beta = params.beta, "Created topic model");
        Ok(())
    }

    /// Restore a serialized model. On failure the session is left without one.
    pub fn load_existing_model(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match self.factory.load_serialized(path) {
            Ok(engine) => {
                let topics = engine.params().topic_count;
                self.cache = Some(ResultCache::new(topics));
                self.engine = Some(engine);
                info!(path = %path.display(), topics, "Restored topic model");
                Ok(())
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Unable to restore saved topic model");
                self.engine = None;
                self.cache = None;
                Err(Error::Engine(e))
            }
        }
    }

    // RUN CONFIGURATION ----------------------------------------------------

    pub fn set_iterations(&mut self, iterations: i64) -> Result<()> {
        if iterations < 1 {
            return Err(Error::InvalidIterations(iterations));
        }
        if iterations < RECOMMENDED_MIN_ITERATIONS {
            warn!(
                iterations,
                "Few iterations; for best results think on the order of 100-400, where 250-300 is usually optimal"
            );
        }
        self.settings.run.iterations = iterations;
        Ok(())
    }

    pub fn use_threads(&mut self, threads: usize) {
        if threads == 0 || threads > MAX_RECOMMENDED_THREADS {
            warn!(
                threads,
                "Use between 1 and {MAX_RECOMMENDED_THREADS} threads; more than the machine's cores slows inference down"
            );
        }
        self.settings.run.threads = threads;
    }

    /// How often the engine reports intermediate topics, and how many words each.
    pub fn set_intermediate_results(&mut self, every: usize, words: usize) {
        self.settings.run.show_topics_interval = every;
        self.settings.run.show_top_words = words;
    }

    pub fn save_intermediate_state(&mut self, path: impl Into<PathBuf>, every: usize) {
        self.settings.run.intermediate_state = Some(Checkpoint {
            path: path.into(),
            every,
        });
    }

    pub fn save_intermediate_model(&mut self, path: impl Into<PathBuf>, every: usize) {
        self.settings.run.intermediate_model = Some(Checkpoint {
            path: path.into(),
            every,
        });
    }

    pub fn save_finished_model(&mut self, path: impl Into<PathBuf>) {
        self.settings.finished_model = Some(path.into());
    }

    pub fn save_finished_state(&mut self, path: impl Into<PathBuf>) {
        self.settings.finished_state = Some(path.into());
    }

    // STOPWORDS AND PRUNING ------------------------------------------------

    fn warn_if_frozen(&self, setting: &str) {
        if self.pipeline.is_some() {
            warn!(
                setting,
                documents = self.corpus.len(),
                "Pipeline already in use; this only affects documents in a new session"
            );
        }
    }

    pub fn remove_word(&mut self, word: &str) {
        self.warn_if_frozen("stopword");
        self.settings
            .pipeline
            .custom_stopwords
            .insert(word.to_lowercase());
    }

    pub fn remove_common_english_words(&mut self) {
        if self.settings.pipeline.english_stopwords {
            warn!("Common English words already added, ignoring");
            return;
        }
        self.warn_if_frozen("english_stopwords");
        self.settings.pipeline.english_stopwords = true;
    }

    pub fn remove_html(&mut self) {
        if self.settings.pipeline.filter_html {
            warn!("HTML filtering already enabled, ignoring");
            return;
        }
        self.warn_if_frozen("filter_html");
        self.settings.pipeline.filter_html = true;
    }

    /// Keep or drop the full token streams needed for realignment.
    pub fn cache_tokens(&mut self, keep: bool) {
        self.warn_if_frozen("cache_tokens");
        self.settings.pipeline.cache_tokens = keep;
    }

    pub fn prune_words_occurring_less_than(&mut self, threshold: usize) {
        self.settings.prune.min_count = Some(threshold);
    }

    pub fn disable_frequency_pruning(&mut self) {
        self.settings.prune.min_count = None;
    }

    pub fn prune_to_top_words_using_information_gain(&mut self, words: usize) {
        self.settings.prune.top_n = Some(words);
    }

    // DOCUMENTS ------------------------------------------------------------

    fn add_raw(&mut self, raw: RawDocument) -> Result<()> {
        let pipeline = self
            .pipeline
            .get_or_insert_with(|| Pipeline::new(&self.settings.pipeline));
        let doc = pipeline.process(raw, self.corpus.alphabet_mut());
        self.corpus.push(doc)
    }

    pub fn add_document_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.add_raw(RawDocument::from_text(text))
    }

    pub fn add_document_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let raw = RawDocument::from_file(path)?;
        self.add_raw(raw)
    }

    /// Add every readable file under `dir`. Returns how many were added.
    pub fn add_documents_in_directory(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let docs = source::load_directory(dir)?;
        let count = docs.len();
        for raw in docs {
            self.add_raw(raw)?;
        }
        Ok(count)
    }

    /// Replace the corpus with one prepared earlier. Its ids must be valid
    /// against its own alphabet.
    pub fn use_prepared_corpus(&mut self, corpus: Corpus) -> Result<()> {
        corpus.validate()?;
        if !self.corpus.is_empty() {
            warn!(
                discarded = self.corpus.len(),
                "Replacing documents already added to the session"
            );
        }
        self.corpus = corpus;
        Ok(())
    }

    // INFERENCE ------------------------------------------------------------

    /// Prune, hand the corpus to the engine, and run it to completion.
    ///
    /// The session's corpus only moves to the pruned generation once the engine
    /// succeeds; after a failure the call can simply be repeated.
    pub fn extract_topics(&mut self) -> Result<InferenceReport> {
        let engine = self.engine.as_mut().ok_or(Error::NoModel)?;
        if self.corpus.is_empty() {
            return Err(Error::NoDocuments);
        }
        let config = EngineConfig::derive(engine.params(), &self.settings.run)?;

        let (pruned, prune_report) = prune::run(&self.corpus, &self.settings.prune)?;

        engine.configure(&config).map_err(Error::Engine)?;
        info!(
            documents = pruned.len(),
            vocabulary = pruned.alphabet().len(),
            topics = config.model.topic_count,
            iterations = config.iterations,
            "Starting inference; this may take a long time for large corpora"
        );
        engine.add_corpus(&pruned).map_err(Error::Engine)?;
        if let Err(e) = engine.estimate() {
            error!(error = %e, "Estimation failed");
            return Err(Error::Engine(e));
        }

        let report = InferenceReport {
            prune: prune_report,
            documents: pruned.len(),
            tokens: pruned.feature_count(),
            save_failures: Vec::new(),
        };
        self.corpus = pruned;
        self.cache = Some(ResultCache::new(config.model.topic_count));

        Ok(InferenceReport {
            save_failures: self.save_finished(),
            ..report
        })
    }

    fn save_finished(&self) -> Vec<String> {
        let mut failures = Vec::new();
        let Some(engine) = &self.engine else {
            return failures;
        };

        if let Some(path) = &self.settings.finished_model {
            info!(path = %path.display(), "Saving model to disk");
            if let Err(e) = engine.serialize(path) {
                error!(error = %e, "Couldn't write topic model");
                failures.push(format!("{e:#}"));
            }
        }
        if let Some(path) = &self.settings.finished_state {
            info!(path = %path.display(), "Saving model state to disk");
            if let Err(e) = engine.dump_state(path) {
                error!(error = %e, "Couldn't write topic model state");
                failures.push(format!("{e:#}"));
            }
        }
        failures
    }

    // RESULTS --------------------------------------------------------------

    /// The `n` best words of `topic`. Topics run from 0 to K-1.
    pub fn top_words(&mut self, topic: usize, n: usize) -> Result<Vec<String>> {
        let engine = self.engine.as_ref().ok_or(Error::NoModel)?;
        let cache = self
            .cache
            .get_or_insert_with(|| ResultCache::new(engine.params().topic_count));
        cache.top_words(engine, topic, n)
    }

    /// The `n` highest-weighted words of `topic`, with weights.
    pub fn weighted_words(&mut self, topic: usize, n: usize) -> Result<Vec<WeightedWord>> {
        let engine = self.engine.as_ref().ok_or(Error::NoModel)?;
        let cache = self
            .cache
            .get_or_insert_with(|| ResultCache::new(engine.params().topic_count));
        cache.weighted_words(engine, topic, n)
    }

    pub fn num_processed_documents(&self) -> Result<usize> {
        let engine = self.engine.as_ref().ok_or(Error::NoModel)?;
        Ok(engine.num_documents())
    }

    /// Per-token topics for document `index`, stopwords included when the
    /// document's token stream was cached.
    pub fn topic_assignments(&self, index: usize) -> Result<Realignment> {
        let engine = self.engine.as_ref().ok_or(Error::NoModel)?;
        let count = engine.num_documents();
        let inferred = engine
            .document_assignments(index)
            .ok_or(Error::DocumentOutOfRange { index, count })?;

        let doc = self.corpus.documents().get(index);
        if let Some(tokens) = doc.and_then(|d| d.cached_tokens.as_deref()) {
            return Ok(Realignment {
                assignments: realign::reconstruct(
                    tokens,
                    &inferred.feature_ids,
                    &inferred.topics,
                    engine.alphabet(),
                ),
                includes_stopwords: true,
            });
        }

        if doc.is_some() {
            warn!(
                document = index,
                "Token caching was off; assignments exclude stopwords"
            );
        } else {
            warn!(
                document = index,
                "Document not in this session's corpus (restored model?); assignments exclude stopwords"
            );
        }
        Ok(Realignment {
            assignments: realign::engine_visible(
                &inferred.feature_ids,
                &inferred.topics,
                engine.alphabet(),
            )?,
            includes_stopwords: false,
        })
    }
}
