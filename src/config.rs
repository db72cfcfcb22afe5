use std::env;

use anyhow::{Context, Result};

use crate::engine::config::{RunSettings, DEFAULT_ITERATIONS};
use crate::pipeline::PipelineOptions;
use crate::prune::PruneOptions;
use crate::session::Settings;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override whatever is set here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of topics (TOPICPREP_TOPICS). No default.
    pub topics: Option<usize>,
    pub iterations: i64,
    pub threads: usize,
    /// Frequency threshold; 0 disables frequency pruning
    pub min_count: usize,
    /// Information-gain vocabulary cap, when set
    pub top_n: Option<usize>,
    pub cache_tokens: bool,
    pub english_stopwords: bool,
    pub filter_html: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topics: None,
            iterations: DEFAULT_ITERATIONS,
            threads: 1,
            min_count: 3,
            top_n: None,
            cache_tokens: true,
            english_stopwords: false,
            filter_html: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Unset keys fall
    /// back to defaults; set keys that don't parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            topics: parse_opt(&lookup, "TOPICPREP_TOPICS")?,
            iterations: parse_opt(&lookup, "TOPICPREP_ITERATIONS")?
                .unwrap_or(defaults.iterations),
            threads: parse_opt(&lookup, "TOPICPREP_THREADS")?.unwrap_or(defaults.threads),
            min_count: parse_opt(&lookup, "TOPICPREP_MIN_COUNT")?.unwrap_or(defaults.min_count),
            top_n: parse_opt(&lookup, "TOPICPREP_TOP_N")?,
            cache_tokens: parse_flag(&lookup, "TOPICPREP_CACHE_TOKENS")?
                .unwrap_or(defaults.cache_tokens),
            english_stopwords: parse_flag(&lookup, "TOPICPREP_ENGLISH_STOPWORDS")?
                .unwrap_or(defaults.english_stopwords),
            filter_html: parse_flag(&lookup, "TOPICPREP_FILTER_HTML")?
                .unwrap_or(defaults.filter_html),
        })
    }

    /// Session settings seeded from this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            pipeline: PipelineOptions {
                filter_html: self.filter_html,
                english_stopwords: self.english_stopwords,
                cache_tokens: self.cache_tokens,
                ..PipelineOptions::default()
            },
            prune: PruneOptions {
                min_count: (self.min_count > 0).then_some(self.min_count),
                top_n: self.top_n,
            },
            run: RunSettings {
                iterations: self.iterations,
                threads: self.threads,
                ..RunSettings::default()
            },
            finished_model: None,
            finished_state: None,
        }
    }

    /// Check that a topic count is configured.
    /// Call this before creating a fresh model.
    pub fn require_topics(&self) -> Result<usize> {
        match self.topics {
            Some(k) if k > 0 => Ok(k),
            Some(_) => anyhow::bail!("TOPICPREP_TOPICS must be at least 1."),
            None => anyhow::bail!(
                "TOPICPREP_TOPICS not set. Add it to your .env file or pass --topics."
            ),
        }
    }
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} has an invalid value: {raw:?}"))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => anyhow::bail!("{key} must be true or false, got {raw:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.iterations, 250);
        assert_eq!(config.min_count, 3);
        assert!(config.cache_tokens);
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("TOPICPREP_TOPICS", "20"),
            ("TOPICPREP_ITERATIONS", "400"),
            ("TOPICPREP_TOP_N", "5000"),
            ("TOPICPREP_ENGLISH_STOPWORDS", "yes"),
            ("TOPICPREP_CACHE_TOKENS", "false"),
        ]))
        .unwrap();
        assert_eq!(config.topics, Some(20));
        assert_eq!(config.iterations, 400);
        assert_eq!(config.top_n, Some(5000));
        assert!(config.english_stopwords);
        assert!(!config.cache_tokens);
    }

    #[test]
    fn test_invalid_number_is_error() {
        let result = Config::from_lookup(lookup_from(&[("TOPICPREP_TOPICS", "many")]));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("TOPICPREP_TOPICS"));
    }

    #[test]
    fn test_invalid_flag_is_error() {
        let result = Config::from_lookup(lookup_from(&[("TOPICPREP_FILTER_HTML", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_min_count_disables_frequency_pruning() {
        let config = Config::from_lookup(lookup_from(&[("TOPICPREP_MIN_COUNT", "0")])).unwrap();
        assert_eq!(config.settings().prune.min_count, None);
    }

    #[test]
    fn test_settings_carry_run_values() {
        let config = Config {
            iterations: 120,
            threads: 4,
            ..Config::default()
        };
        let settings = config.settings();
        assert_eq!(settings.run.iterations, 120);
        assert_eq!(settings.run.threads, 4);
        assert_eq!(settings.prune.min_count, Some(3));
    }

    #[test]
    fn test_require_topics() {
        assert!(Config::default().require_topics().is_err());
        let config = Config {
            topics: Some(0),
            ..Config::default()
        };
        assert!(config.require_topics().is_err());
        let config = Config {
            topics: Some(5),
            ..Config::default()
        };
        assert_eq!(config.require_topics().unwrap(), 5);
    }
}
