// Error types for the preparation and realignment core.
//
// Configuration mistakes, vocabulary rebuild failures and engine failures are
// returned as `Error`. Softer problems (too few iterations, repeated stopword
// sets, short word lists, realignment mismatches) are logged with `tracing`
// and never surface here.

use std::io;
use std::path::PathBuf;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Inference was requested before `create_new_model` or `load_existing_model`.
    #[error("no topic model: call create_new_model or load_existing_model first")]
    NoModel,

    /// Inference was requested before any document was added.
    #[error("no documents added: add a string, a file or a directory of files first")]
    NoDocuments,

    /// Fewer than one sampling iteration was requested.
    #[error("at least one iteration is required (got {0}); 100-400 is typical")]
    InvalidIterations(i64),

    /// A model needs at least one topic.
    #[error("topic count must be at least 1")]
    InvalidTopicCount,

    #[error("topic {topic} is out of range: expected 0..{topic_count}")]
    TopicOutOfRange { topic: usize, topic_count: usize },

    #[error("document {index} is out of range: {count} documents were processed")]
    DocumentOutOfRange { index: usize, count: usize },

    /// A feature id does not exist in the alphabet it was resolved against.
    #[error("feature id {id} is not valid in an alphabet of {size} terms")]
    FeatureOutOfRange { id: usize, size: usize },

    /// A rebuilt vocabulary generation does not cover every document.
    #[error("rebuilt {sequences} feature sequences for {documents} documents")]
    GenerationMismatch { documents: usize, sequences: usize },

    /// Two alphabet entries share the same term.
    #[error("term {0:?} appears more than once in the alphabet")]
    DuplicateTerm(String),

    #[error("failed to read {}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failure reported by the inference engine (estimation, serialization, loading).
    #[error("inference engine failure: {0:#}")]
    Engine(#[source] anyhow::Error),
}

impl Error {
    /// True for errors the caller can fix by changing how the session is configured
    /// or queried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoModel
                | Error::NoDocuments
                | Error::InvalidIterations(_)
                | Error::InvalidTopicCount
                | Error::TopicOutOfRange { .. }
                | Error::DocumentOutOfRange { .. }
        )
    }
}
