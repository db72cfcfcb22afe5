// Colored terminal output for corpora, topics, and realigned documents.
//
// main.rs display calls delegate here.

use colored::{Color, Colorize};

use crate::corpus::Corpus;
use crate::engine::traits::WeightedWord;
use crate::prune::PruneReport;
use crate::realign::{Realignment, TopicLabel};

const TOPIC_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

/// Display a summary of a prepared corpus.
pub fn display_corpus_summary(corpus: &Corpus) {
    println!(
        "\n{}",
        format!("=== Corpus ({} documents) ===", corpus.len()).bold()
    );
    println!("  Vocabulary: {}", corpus.alphabet().len());
    println!("  Tokens after stopwords: {}", corpus.feature_count());

    let cached = corpus
        .documents()
        .iter()
        .filter(|d| d.cached_tokens.is_some())
        .count();
    if cached < corpus.len() {
        println!(
            "  {} {} documents without a token cache; realignment will skip stopwords",
            "~".yellow(),
            corpus.len() - cached
        );
    }

    let labelled = corpus.documents().iter().filter(|d| d.label.is_some()).count();
    if labelled > 0 {
        println!("  Labelled documents: {labelled}");
    }
}

/// Display the vocabulary sizes from a prune run.
pub fn display_prune_report(report: &PruneReport) {
    println!("\n{}", "Pruning".bold());
    println!("  Before: {}", report.vocabulary_before);
    match report.after_frequency {
        Some(n) => println!("  After frequency pass: {n}"),
        None => println!("  Frequency pass: {}", "off".dimmed()),
    }
    match report.after_info_gain {
        Some(n) => println!("  After information-gain pass: {n}"),
        None => println!("  Information-gain pass: {}", "off".dimmed()),
    }
}

/// Display each topic's top weighted words.
pub fn display_topics(topics: &[Vec<WeightedWord>]) {
    if topics.is_empty() {
        println!("No topics to show.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Topics ({}) ===", topics.len()).bold()
    );
    println!();

    for (t, words) in topics.iter().enumerate() {
        let label = format!("{t:>3}").color(topic_color(t)).bold();
        if words.is_empty() {
            println!("  {label}  {}", "(no words)".dimmed());
            continue;
        }
        let rendered: Vec<String> = words
            .iter()
            .map(|w| {
                format!(
                    "{} {}",
                    super::truncate_chars(&w.word, 24),
                    format!("({:.0})", w.weight).dimmed()
                )
            })
            .collect();
        println!("  {label}  {}", rendered.join(", "));
    }
    println!();
}

/// Display a realigned document, each word colored by topic and stopwords dimmed.
pub fn display_realignment(index: usize, source: &str, realignment: &Realignment) {
    println!(
        "\n{}",
        format!("=== Document {index} ({source}) ===").bold()
    );
    if !realignment.includes_stopwords {
        println!(
            "  {} token cache unavailable; showing only words the engine saw",
            "Warning:".yellow()
        );
    }

    let rendered: Vec<String> = realignment
        .assignments
        .iter()
        .map(|a| match a.topic {
            TopicLabel::Topic(t) => format!(
                "{}{}",
                a.word.color(topic_color(t)),
                format!("/{t}").dimmed()
            ),
            TopicLabel::Stopword => a.word.dimmed().to_string(),
        })
        .collect();
    println!("  {}", rendered.join(" "));
    println!();
}

fn topic_color(topic: usize) -> Color {
    TOPIC_COLORS[topic % TOPIC_COLORS.len()]
}
