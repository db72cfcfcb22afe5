// Replay engine: an InferenceEngine backed by a recorded sampling state.
//
// It performs no sampling. "Estimating" means checking that a recorded state
// dump matches the corpus token for token, then serving topic rankings and
// per-document assignments from it. This lets prepared corpora be paired
// with the output of an external topic-model run.
//
// State dump format, one token per line after the headers:
//
//   #doc source pos typeindex type topic
//   #alpha : 0.5 0.5
//   #beta : 0.03
//   0 a.txt 0 0 cat 1

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{EngineConfig, ModelParams};
use super::traits::{DocumentAssignments, EngineFactory, InferenceEngine, WeightedWord};
use crate::alphabet::Alphabet;
use crate::corpus::Corpus;

const STATE_HEADER: &str = "#doc source pos typeindex type topic";

/// A recorded document: the (term, topic) pair for each token the engine saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedDocument {
    pub source: String,
    pub tokens: Vec<(String, usize)>,
}

/// A parsed plain-text state dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDump {
    /// Per-topic alpha values from the `#alpha` header, if present
    pub alpha: Vec<f64>,
    pub beta: Option<f64>,
    pub documents: Vec<RecordedDocument>,
}

impl StateDump {
    /// Topic count implied by the dump: the `#alpha` width when present,
    /// otherwise one more than the highest recorded topic.
    pub fn topic_count(&self) -> Option<usize> {
        if !self.alpha.is_empty() {
            return Some(self.alpha.len());
        }
        self.documents
            .iter()
            .flat_map(|d| d.tokens.iter().map(|(_, topic)| topic + 1))
            .max()
    }

    /// Sum of the per-topic alpha values, when the header was present.
    pub fn alpha_sum(&self) -> Option<f64> {
        (!self.alpha.is_empty()).then(|| self.alpha.iter().sum())
    }
}

fn parse_header_values(rest: &str) -> Result<Vec<f64>> {
    let values = rest.trim_start().strip_prefix(':').unwrap_or(rest);
    values
        .split_whitespace()
        .map(|v| v.parse::<f64>().with_context(|| format!("bad header value {v:?}")))
        .collect()
}

/// Parse the plain-text state format.
pub fn parse_state_dump(text: &str) -> Result<StateDump> {
    let mut dump = StateDump::default();

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("#alpha") {
            dump.alpha = parse_header_values(rest).with_context(|| format!("line {lineno}"))?;
            continue;
        }
        if let Some(rest) = line.strip_prefix("#beta") {
            dump.beta = parse_header_values(rest)
                .with_context(|| format!("line {lineno}"))?
                .first()
                .copied();
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            bail!("line {lineno}: expected 6 fields (doc source pos typeindex type topic), found {}", fields.len());
        }
        let doc: usize = fields[0].parse().with_context(|| format!("line {lineno}: bad doc index"))?;
        let pos: usize = fields[2].parse().with_context(|| format!("line {lineno}: bad position"))?;
        let topic: usize = fields[5].parse().with_context(|| format!("line {lineno}: bad topic"))?;

        if doc + 1 < dump.documents.len() {
            bail!("line {lineno}: document {doc} appears after document {}", dump.documents.len() - 1);
        }
        while dump.documents.len() <= doc {
            dump.documents.push(RecordedDocument::default());
        }
        let record = &mut dump.documents[doc];
        if pos != record.tokens.len() {
            bail!("line {lineno}: expected position {} in document {doc}, found {pos}", record.tokens.len());
        }
        record.source = fields[1].to_string();
        record.tokens.push((fields[4].to_string(), topic));
    }

    Ok(dump)
}

fn dump_field(source: &str) -> String {
    if source.is_empty() {
        "NA".to_string()
    } else {
        source.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

#[derive(Serialize, Deserialize)]
struct SerializedModel {
    params: ModelParams,
    documents: Vec<RecordedDocument>,
}

/// Corpus contents copied at `add_corpus` time.
struct CorpusView {
    alphabet: Alphabet,
    features: Vec<Vec<usize>>,
    sources: Vec<String>,
}

pub struct ReplayEngine {
    params: ModelParams,
    recorded: Vec<RecordedDocument>,
    config: Option<EngineConfig>,
    corpus: Option<CorpusView>,
    alphabet: Alphabet,
    sources: Vec<String>,
    assignments: Vec<DocumentAssignments>,
    /// Per topic: (feature id, count), ranked by count then id
    ranked: Vec<Vec<(usize, usize)>>,
}

impl ReplayEngine {
    /// Build an engine from recorded documents. Results are immediately
    /// available against an alphabet built from the recorded terms.
    pub fn from_recorded(params: ModelParams, recorded: Vec<RecordedDocument>) -> Result<Self> {
        let mut alphabet = Alphabet::new();
        let mut assignments = Vec::with_capacity(recorded.len());
        for (d, doc) in recorded.iter().enumerate() {
            let mut entry = DocumentAssignments::default();
            for (term, topic) in &doc.tokens {
                if *topic >= params.topic_count {
                    bail!(
                        "document {d}: topic {topic} is outside a {}-topic model",
                        params.topic_count
                    );
                }
                entry.feature_ids.push(alphabet.intern(term));
                entry.topics.push(*topic);
            }
            assignments.push(entry);
        }

        let mut engine = Self {
            params,
            sources: recorded.iter().map(|d| d.source.clone()).collect(),
            recorded,
            config: None,
            corpus: None,
            alphabet,
            assignments,
            ranked: Vec::new(),
        };
        engine.rank();
        Ok(engine)
    }

    fn rank(&mut self) {
        let mut counts: Vec<HashMap<usize, usize>> = vec![HashMap::new(); self.params.topic_count];
        for doc in &self.assignments {
            for (&id, &topic) in doc.feature_ids.iter().zip(&doc.topics) {
                *counts[topic].entry(id).or_insert(0) += 1;
            }
        }
        self.ranked = counts
            .into_iter()
            .map(|topic_counts| {
                let mut ranked: Vec<(usize, usize)> = topic_counts.into_iter().collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                ranked
            })
            .collect();
    }

    /// The current assignments as (term, topic) records.
    fn recorded_now(&self) -> Vec<RecordedDocument> {
        self.assignments
            .iter()
            .enumerate()
            .map(|(d, doc)| RecordedDocument {
                source: self.sources.get(d).cloned().unwrap_or_default(),
                tokens: doc
                    .feature_ids
                    .iter()
                    .zip(&doc.topics)
                    .map(|(&id, &topic)| {
                        (self.alphabet.term_of(id).unwrap_or_default().to_string(), topic)
                    })
                    .collect(),
            })
            .collect()
    }

    /// Render the current state in the plain-text dump format.
    pub fn render_state(&self) -> String {
        let k = self.params.topic_count;
        let mut out = String::new();
        let _ = writeln!(out, "{STATE_HEADER}");
        let per_topic = self.params.alpha / k as f64;
        let alphas: Vec<String> = (0..k).map(|_| per_topic.to_string()).collect();
        let _ = writeln!(out, "#alpha : {}", alphas.join(" "));
        let _ = writeln!(out, "#beta : {}", self.params.beta);

        for (d, doc) in self.assignments.iter().enumerate() {
            let source = dump_field(self.sources.get(d).map(String::as_str).unwrap_or(""));
            for (pos, (&id, &topic)) in doc.feature_ids.iter().zip(&doc.topics).enumerate() {
                let term = self.alphabet.term_of(id).unwrap_or_default();
                let _ = writeln!(out, "{d} {source} {pos} {id} {term} {topic}");
            }
        }
        out
    }

    fn checkpoint(&self) {
        let Some(config) = &self.config else {
            return;
        };
        if let Some(cp) = &config.intermediate_state {
            if let Err(e) = self.dump_state(&cp.path) {
                warn!(error = %e, path = %cp.path.display(), "Failed to write state checkpoint");
            }
        }
        if let Some(cp) = &config.intermediate_model {
            if let Err(e) = self.serialize(&cp.path) {
                warn!(error = %e, path = %cp.path.display(), "Failed to write model checkpoint");
            }
        }
    }
}

impl InferenceEngine for ReplayEngine {
    fn params(&self) -> ModelParams {
        self.params
    }

    fn configure(&mut self, config: &EngineConfig) -> Result<()> {
        if config.model.topic_count != self.params.topic_count {
            bail!(
                "configured for {} topics but the recorded state has {}",
                config.model.topic_count,
                self.params.topic_count
            );
        }
        debug!(
            iterations = config.iterations,
            threads = config.threads,
            "Replay engine ignores sampling schedule"
        );
        self.config = Some(config.clone());
        Ok(())
    }

    fn add_corpus(&mut self, corpus: &Corpus) -> Result<()> {
        self.corpus = Some(CorpusView {
            alphabet: corpus.alphabet().clone(),
            features: corpus
                .documents()
                .iter()
                .map(|d| d.features.ids().to_vec())
                .collect(),
            sources: corpus.documents().iter().map(|d| d.source_id.clone()).collect(),
        });
        Ok(())
    }

    fn estimate(&mut self) -> Result<()> {
        let Some(view) = &self.corpus else {
            bail!("no corpus added to the replay engine");
        };
        if self.recorded.len() > view.features.len() {
            bail!(
                "recorded state has {} documents but the corpus has {}",
                self.recorded.len(),
                view.features.len()
            );
        }

        let empty = RecordedDocument::default();
        let mut assignments = Vec::with_capacity(view.features.len());
        for (d, features) in view.features.iter().enumerate() {
            let record = self.recorded.get(d).unwrap_or(&empty);
            if record.tokens.len() != features.len() {
                bail!(
                    "document {d} ({}): recorded state has {} tokens, corpus has {}",
                    view.sources[d],
                    record.tokens.len(),
                    features.len()
                );
            }
            let mut topics = Vec::with_capacity(features.len());
            for (pos, (&id, (term, topic))) in features.iter().zip(&record.tokens).enumerate() {
                let expected = view.alphabet.term_of(id).unwrap_or_default();
                if expected != term.as_str() {
                    bail!("document {d} position {pos}: recorded {term:?}, corpus has {expected:?}");
                }
                topics.push(*topic);
            }
            assignments.push(DocumentAssignments {
                feature_ids: features.clone(),
                topics,
            });
        }

        self.alphabet = view.alphabet.clone();
        self.sources = view.sources.clone();
        self.assignments = assignments;
        self.rank();

        info!(
            documents = self.assignments.len(),
            tokens = self.assignments.iter().map(|a| a.topics.len()).sum::<usize>(),
            "Replayed recorded topic assignments"
        );
        self.checkpoint();
        Ok(())
    }

    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn num_documents(&self) -> usize {
        self.assignments.len()
    }

    fn top_words(&self, topic: usize, n: usize) -> Vec<String> {
        self.sorted_weighted_words(topic)
            .into_iter()
            .take(n)
            .map(|w| w.word)
            .collect()
    }

    fn sorted_weighted_words(&self, topic: usize) -> Vec<WeightedWord> {
        self.ranked
            .get(topic)
            .map(|ranked| {
                ranked
                    .iter()
                    .filter_map(|&(id, count)| {
                        self.alphabet
                            .term_of(id)
                            .map(|term| WeightedWord::new(term, count as f64))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn document_assignments(&self, doc: usize) -> Option<DocumentAssignments> {
        self.assignments.get(doc).cloned()
    }

    fn serialize(&self, path: &Path) -> Result<()> {
        let model = SerializedModel {
            params: self.params,
            documents: self.recorded_now(),
        };
        let json = serde_json::to_string(&model)?;
        fs::write(path, json)
            .with_context(|| format!("Couldn't write topic model to {}", path.display()))
    }

    fn dump_state(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render_state())
            .with_context(|| format!("Couldn't write topic model state to {}", path.display()))
    }
}

/// Creates replay engines from a state dump, or restores serialized ones.
#[derive(Debug, Clone, Default)]
pub struct ReplayFactory {
    pub state_path: Option<PathBuf>,
}

impl ReplayFactory {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: Some(state_path.into()),
        }
    }
}

impl EngineFactory for ReplayFactory {
    type Engine = ReplayEngine;

    fn create(&self, params: &ModelParams) -> Result<ReplayEngine> {
        let Some(path) = &self.state_path else {
            bail!("the replay engine needs a recorded state dump to replay");
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state dump {}", path.display()))?;
        let dump = parse_state_dump(&text)
            .with_context(|| format!("Failed to parse state dump {}", path.display()))?;

        if !dump.alpha.is_empty() && dump.alpha.len() != params.topic_count {
            bail!(
                "state dump {} has {} topics, model was created with {}",
                path.display(),
                dump.alpha.len(),
                params.topic_count
            );
        }
        ReplayEngine::from_recorded(*params, dump.documents)
    }

    fn load_serialized(&self, path: &Path) -> Result<ReplayEngine> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Unable to restore saved topic model {}", path.display()))?;
        let model: SerializedModel = serde_json::from_str(&json)
            .with_context(|| format!("Unable to restore saved topic model {}", path.display()))?;
        if model.params.topic_count == 0 {
            bail!("saved topic model {} has no topics", path.display());
        }
        ReplayEngine::from_recorded(model.params, model.documents)
    }
}
