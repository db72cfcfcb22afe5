// topicprep: document preparation and result realignment for topic models
//
// This is the library root. The pipeline turns raw text into feature
// sequences over a shared alphabet, the prune passes shrink that alphabet,
// and realignment maps an engine's topic assignments back onto every word
// of the original documents. The engine itself sits behind a trait.

pub mod alphabet;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prune;
pub mod realign;
pub mod session;
pub mod source;

pub use error::{Error, Result};
pub use session::{TopicSession, VERSION};
