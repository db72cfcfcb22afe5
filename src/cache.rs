// Result cache: memoized per-topic word rankings.
//
// Rankings are pulled from the engine for every topic at once, to the depth
// of the largest request seen so far. A deeper request re-pulls; a new
// estimation run invalidates everything.

use tracing::{debug, warn};

use crate::engine::traits::{InferenceEngine, WeightedWord};
use crate::error::{Error, Result};

struct Memo<T> {
    depth: usize,
    per_topic: Vec<Vec<T>>,
}

impl<T: Clone> Memo<T> {
    fn serve(&self, topic: usize, n: usize) -> Vec<T> {
        let words = &self.per_topic[topic];
        if words.len() < n {
            warn!(
                topic,
                requested = n,
                available = words.len(),
                "Fewer words available than requested"
            );
        }
        words.iter().take(n).cloned().collect()
    }
}

/// Cached top words and weighted words for a `topic_count`-topic model.
pub struct ResultCache {
    topic_count: usize,
    top_words: Option<Memo<String>>,
    weighted_words: Option<Memo<WeightedWord>>,
}

impl ResultCache {
    pub fn new(topic_count: usize) -> Self {
        Self {
            topic_count,
            top_words: None,
            weighted_words: None,
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topic_count
    }

    /// Drop everything; the next request pulls from the engine again.
    pub fn invalidate(&mut self) {
        self.top_words = None;
        self.weighted_words = None;
    }

    /// Depth currently cached for top words, if anything is cached.
    pub fn top_words_depth(&self) -> Option<usize> {
        self.top_words.as_ref().map(|m| m.depth)
    }

    fn check_topic(&self, topic: usize) -> Result<()> {
        if topic >= self.topic_count {
            return Err(Error::TopicOutOfRange {
                topic,
                topic_count: self.topic_count,
            });
        }
        Ok(())
    }

    /// The `n` best words of `topic`.
    pub fn top_words<E>(&mut self, engine: &E, topic: usize, n: usize) -> Result<Vec<String>>
    where
        E: InferenceEngine + ?Sized,
    {
        self.check_topic(topic)?;

        let cached = self.top_words.as_ref().map(|m| m.depth);
        if cached.map_or(true, |depth| depth < n) {
            let depth = cached.map_or(n, |d| d.max(n));
            debug!(depth, "Pulling top words from engine");
            let per_topic = (0..self.topic_count)
                .map(|t| engine.top_words(t, depth))
                .collect();
            self.top_words = Some(Memo { depth, per_topic });
        }

        Ok(self
            .top_words
            .as_ref()
            .map(|m| m.serve(topic, n))
            .unwrap_or_default())
    }

    /// The `n` highest-weighted words of `topic`, with weights.
    pub fn weighted_words<E>(
        &mut self,
        engine: &E,
        topic: usize,
        n: usize,
    ) -> Result<Vec<WeightedWord>>
    where
        E: InferenceEngine + ?Sized,
    {
        self.check_topic(topic)?;

        let cached = self.weighted_words.as_ref().map(|m| m.depth);
        if cached.map_or(true, |depth| depth < n) {
            let depth = cached.map_or(n, |d| d.max(n));
            debug!(depth, "Pulling weighted words from engine");
            let per_topic = (0..self.topic_count)
                .map(|t| {
                    let mut words = engine.sorted_weighted_words(t);
                    words.truncate(depth);
                    words
                })
                .collect();
            self.weighted_words = Some(Memo { depth, per_topic });
        }

        Ok(self
            .weighted_words
            .as_ref()
            .map(|m| m.serve(topic, n))
            .unwrap_or_default())
    }
}
