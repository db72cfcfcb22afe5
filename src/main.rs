use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use topicprep::config::Config;
use topicprep::corpus::Corpus;
use topicprep::engine::config::DEFAULT_BETA;
use topicprep::engine::replay::{parse_state_dump, ReplayFactory};
use topicprep::output::terminal;
use topicprep::pipeline::Pipeline;
use topicprep::prune::{self, PruneOptions};
use topicprep::session::TopicSession;
use topicprep::source::{self, RawDocument};

/// topicprep: prepare documents for topic inference and read results back.
///
/// Tokenizes and filters documents into a shared vocabulary, prunes it, and
/// maps engine output back onto every original word.
#[derive(Parser)]
#[command(name = "topicprep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a corpus from text, files, or directories and write it as JSON
    Prepare {
        /// Files or directories to load (or literal strings with --text)
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Treat inputs as document text instead of paths
        #[arg(long)]
        text: bool,

        /// Where to write the prepared corpus
        #[arg(long, default_value = "corpus.json")]
        out: PathBuf,

        /// Drop words occurring fewer than this many times (default: 3)
        #[arg(long)]
        min_count: Option<usize>,

        /// Skip frequency pruning
        #[arg(long)]
        no_frequency_prune: bool,

        /// Keep only the N most informative words
        #[arg(long)]
        top_n: Option<usize>,

        /// Remove common English words
        #[arg(long)]
        english: bool,

        /// Strip HTML markup before tokenizing
        #[arg(long)]
        html: bool,

        /// Extra words to remove (repeatable)
        #[arg(long = "stopword")]
        stopwords: Vec<String>,

        /// Don't keep token streams (realignment will skip stopwords)
        #[arg(long)]
        no_cache: bool,
    },

    /// Replay a recorded engine state against a prepared corpus and show topics
    Topics {
        /// Prepared corpus JSON
        #[arg(long)]
        corpus: PathBuf,

        /// Plain-text engine state dump
        #[arg(long)]
        state: PathBuf,

        /// Words per topic (default: 10)
        #[arg(long, default_value = "10")]
        words: usize,

        /// Topic count, when the state dump has no #alpha header
        #[arg(long)]
        topics: Option<usize>,

        /// Also save the replayed model as JSON
        #[arg(long)]
        save_model: Option<PathBuf>,
    },

    /// Show one document with every word labelled by topic
    Realign {
        /// Prepared corpus JSON
        #[arg(long)]
        corpus: PathBuf,

        /// Plain-text engine state dump
        #[arg(long)]
        state: PathBuf,

        /// Document index
        #[arg(long)]
        doc: usize,

        /// Topic count, when the state dump has no #alpha header
        #[arg(long)]
        topics: Option<usize>,

        /// Print plain word/topic pairs instead of colors
        #[arg(long)]
        plain: bool,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topicprep=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Prepare {
            inputs,
            text,
            out,
            min_count,
            no_frequency_prune,
            top_n,
            english,
            html,
            stopwords,
            no_cache,
        } => {
            let mut settings = config.settings();
            settings.pipeline.english_stopwords |= english;
            settings.pipeline.filter_html |= html;
            settings.pipeline.cache_tokens &= !no_cache;
            settings
                .pipeline
                .custom_stopwords
                .extend(stopwords.iter().map(|w| w.to_lowercase()));
            if let Some(n) = min_count {
                settings.prune.min_count = Some(n);
            }
            if no_frequency_prune {
                settings.prune.min_count = None;
            }
            if top_n.is_some() {
                settings.prune.top_n = top_n;
            }

            let raw = collect_inputs(&inputs, text)?;
            if raw.is_empty() {
                anyhow::bail!("No documents found in the given inputs.");
            }
            println!("Processing {} documents...", raw.len());

            let pipeline = Pipeline::new(&settings.pipeline);
            let mut corpus = Corpus::new();

            let pb = ProgressBar::new(raw.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar().template("  Documents [{bar:30}] {pos}/{len} ({eta})")?,
            );
            for doc in raw {
                let processed = pipeline.process(doc, corpus.alphabet_mut());
                corpus.push(processed)?;
                pb.inc(1);
            }
            pb.finish_and_clear();

            let (pruned, report) = prune::run(&corpus, &settings.prune)?;
            if settings.prune.is_active() {
                terminal::display_prune_report(&report);
            }
            terminal::display_corpus_summary(&pruned);

            let json = serde_json::to_string(&pruned)?;
            fs::write(&out, json)
                .with_context(|| format!("Failed to write corpus to {}", out.display()))?;
            println!("\n{} {}", "Corpus written to".bold(), out.display());
        }

        Commands::Topics {
            corpus,
            state,
            words,
            topics,
            save_model,
        } => {
            let mut session = replay_session(&config, &corpus, &state, topics)?;
            if let Some(path) = save_model {
                session.save_finished_model(path);
            }
            let report = session.extract_topics()?;
            for failure in &report.save_failures {
                println!("  {} {}", "Warning:".yellow(), failure);
            }

            let k = session.topic_count().unwrap_or_default();
            let ranked = (0..k)
                .map(|t| session.weighted_words(t, words))
                .collect::<topicprep::error::Result<Vec<_>>>()?;
            terminal::display_topics(&ranked);
        }

        Commands::Realign {
            corpus,
            state,
            doc,
            topics,
            plain,
        } => {
            let mut session = replay_session(&config, &corpus, &state, topics)?;
            session.extract_topics()?;

            let realignment = session.topic_assignments(doc)?;
            if plain {
                println!("{}", topicprep::output::plain_assignments(&realignment.assignments));
            } else {
                let source = session
                    .corpus()
                    .documents()
                    .get(doc)
                    .map(|d| d.source_id.as_str())
                    .unwrap_or("?");
                terminal::display_realignment(doc, source, &realignment);
            }
        }
    }

    Ok(())
}

/// Expand command-line inputs into raw documents.
fn collect_inputs(inputs: &[String], literal: bool) -> Result<Vec<RawDocument>> {
    if literal {
        return Ok(inputs.iter().map(RawDocument::from_text).collect());
    }

    let mut docs = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            let found = source::load_directory(path)
                .with_context(|| format!("Failed to load directory {input}"))?;
            info!(directory = %input, documents = found.len(), "Loaded directory");
            docs.extend(found);
        } else {
            docs.push(
                RawDocument::from_file(path).with_context(|| format!("Failed to load {input}"))?,
            );
        }
    }
    Ok(docs)
}

/// A session over an already-prepared corpus, with a replay engine created
/// from `state`. Pruning is off since the corpus was pruned when prepared.
fn replay_session(
    config: &Config,
    corpus_path: &Path,
    state_path: &Path,
    topics: Option<usize>,
) -> Result<TopicSession<ReplayFactory>> {
    let json = fs::read_to_string(corpus_path)
        .with_context(|| format!("Failed to read corpus {}", corpus_path.display()))?;
    let corpus: Corpus = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse corpus {}", corpus_path.display()))?;

    let dump_text = fs::read_to_string(state_path)
        .with_context(|| format!("Failed to read state dump {}", state_path.display()))?;
    let dump = parse_state_dump(&dump_text)
        .with_context(|| format!("Failed to parse state dump {}", state_path.display()))?;

    let k = match topics.or(config.topics).or_else(|| dump.topic_count()) {
        Some(k) => k,
        None => config.require_topics()?,
    };

    let mut settings = config.settings();
    settings.prune = PruneOptions::none();
    let iterations = settings.run.iterations;

    let mut session = TopicSession::with_settings(ReplayFactory::new(state_path), settings);
    match dump.alpha_sum() {
        Some(alpha) => {
            session.create_new_model(k, alpha, dump.beta.unwrap_or(DEFAULT_BETA))?
        }
        None => {
            warn!("State dump has no #alpha header; using default hyperparameters");
            session.create_new_model_default(k)?
        }
    }
    session.set_iterations(iterations)?;
    session.use_prepared_corpus(corpus)?;
    Ok(session)
}
