// Unit tests for vocabulary pruning.
//
// Each pass must rebuild the alphabet and every feature sequence together,
// leave cached token streams alone, and never touch the input generation.

use topicprep::corpus::Corpus;
use topicprep::pipeline::{Pipeline, PipelineOptions};
use topicprep::prune::frequency::{feature_weights, prune_by_frequency};
use topicprep::prune::info_gain::{information_gain, prune_to_top_n, select_top_n};
use topicprep::prune::{self, PruneOptions};
use topicprep::source::RawDocument;

fn build(docs: &[(&str, Option<&str>)], stopwords: &[&str]) -> Corpus {
    let pipeline = Pipeline::new(&PipelineOptions {
        custom_stopwords: stopwords.iter().map(|w| w.to_string()).collect(),
        ..Default::default()
    });
    let mut corpus = Corpus::new();
    for (text, label) in docs {
        let mut raw = RawDocument::from_text(*text);
        raw.label = label.map(str::to_string);
        let doc = pipeline.process(raw, corpus.alphabet_mut());
        corpus.push(doc).unwrap();
    }
    corpus
}

fn words(corpus: &Corpus, doc: usize) -> Vec<&str> {
    corpus.documents()[doc]
        .features
        .terms(corpus.alphabet())
        .unwrap()
}

fn vocabulary(corpus: &Corpus) -> Vec<&str> {
    corpus.alphabet().terms().collect()
}

// ============================================================
// Frequency pruning
// ============================================================

#[test]
fn threshold_above_every_count_empties_vocabulary() {
    let corpus = build(&[("the cat sat", None), ("the dog ran", None)], &["the"]);
    let pruned = prune_by_frequency(&corpus, 2).unwrap();

    assert!(pruned.alphabet().is_empty());
    for (before, after) in corpus.documents().iter().zip(pruned.documents()) {
        assert!(after.features.is_empty());
        assert_eq!(after.cached_tokens, before.cached_tokens);
        assert_eq!(after.cached_tokens.as_ref().unwrap().len(), 3);
    }
}

#[test]
fn survivors_keep_relative_order() {
    let corpus = build(
        &[("apple pear apple fig", None), ("fig apple kiwi fig", None)],
        &[],
    );
    let pruned = prune_by_frequency(&corpus, 2).unwrap();

    // apple=3, pear=1, fig=3, kiwi=1
    assert_eq!(vocabulary(&pruned), vec!["apple", "fig"]);
    assert_eq!(words(&pruned, 0), vec!["apple", "apple", "fig"]);
    assert_eq!(words(&pruned, 1), vec!["fig", "apple", "fig"]);
}

#[test]
fn weights_count_every_occurrence() {
    let corpus = build(&[("a b a", None), ("a c", None)], &[]);
    assert_eq!(feature_weights(&corpus).unwrap(), vec![3.0, 1.0, 1.0]);
}

#[test]
fn input_generation_is_untouched() {
    let corpus = build(&[("a b a", None)], &[]);
    let before = corpus.clone();
    let _ = prune_by_frequency(&corpus, 2).unwrap();
    assert_eq!(corpus.alphabet(), before.alphabet());
    assert_eq!(
        corpus.documents()[0].features,
        before.documents()[0].features
    );
}

// ============================================================
// Information-gain pruning
// ============================================================

#[test]
fn discriminating_terms_rank_highest() {
    let corpus = build(
        &[
            ("ball goal shared", Some("sports")),
            ("ball team shared", Some("sports")),
            ("paint canvas shared", Some("arts")),
            ("paint gallery shared", Some("arts")),
        ],
        &[],
    );
    let scores = information_gain(&corpus);
    let id = |t: &str| corpus.alphabet().id_of(t).unwrap();

    assert!((scores[id("ball")] - 1.0).abs() < 1e-9);
    assert!((scores[id("paint")] - 1.0).abs() < 1e-9);
    assert!(scores[id("shared")].abs() < 1e-9);
    assert!(scores[id("goal")] < scores[id("ball")]);

    let pruned = prune_to_top_n(&corpus, 2).unwrap();
    assert_eq!(vocabulary(&pruned), vec!["ball", "paint"]);
    assert_eq!(words(&pruned, 0), vec!["ball"]);
    assert_eq!(words(&pruned, 3), vec!["paint"]);
}

#[test]
fn single_class_falls_back_to_id_order() {
    let corpus = build(&[("zeta alpha", None), ("mid", None)], &[]);
    let pruned = prune_to_top_n(&corpus, 2).unwrap();
    assert_eq!(vocabulary(&pruned), vec!["zeta", "alpha"]);
}

#[test]
fn n_larger_than_vocabulary_keeps_everything() {
    let corpus = build(&[("a b", Some("x")), ("c", Some("y"))], &[]);
    let pruned = prune_to_top_n(&corpus, 100).unwrap();
    assert_eq!(vocabulary(&pruned), vocabulary(&corpus));
}

#[test]
fn n_zero_empties_vocabulary() {
    let corpus = build(&[("a b", None)], &[]);
    let pruned = prune_to_top_n(&corpus, 0).unwrap();
    assert!(pruned.alphabet().is_empty());
    assert!(pruned.documents()[0].features.is_empty());
}

#[test]
fn ties_break_by_ascending_id() {
    assert_eq!(select_top_n(&[0.5, 0.9, 0.5, 0.5], 2), vec![0, 1]);
    assert_eq!(select_top_n(&[0.0, 0.0, 0.0], 2), vec![0, 1]);
}

#[test]
fn mirrored_class_distributions_tie_by_id() {
    // 3 classes of 6 docs; "ff" is in x:1 y:2 z:5 docs, "gg" in x:5 y:2 z:1
    let mut texts = Vec::new();
    for (label, ff, gg) in [("x", 1, 5), ("y", 2, 2), ("z", 5, 1)] {
        for i in 0..6 {
            let mut text = String::from("pad");
            if i < ff {
                text.push_str(" ff");
            }
            if i < gg {
                text.push_str(" gg");
            }
            texts.push((text, label));
        }
    }
    let docs: Vec<(&str, Option<&str>)> = texts
        .iter()
        .map(|(text, label)| (text.as_str(), Some(*label)))
        .collect();
    let corpus = build(&docs, &[]);
    assert_eq!(vocabulary(&corpus), vec!["pad", "ff", "gg"]);

    let scores = information_gain(&corpus);
    assert_eq!(scores[1], scores[2]);
    assert!(scores[1] > scores[0]);

    let pruned = prune_to_top_n(&corpus, 1).unwrap();
    assert_eq!(vocabulary(&pruned), vec!["ff"]);
}

// ============================================================
// prune::run: both passes in sequence
// ============================================================

#[test]
fn frequency_runs_before_information_gain() {
    let corpus = build(
        &[
            ("ball ball rare", Some("sports")),
            ("ball shared", Some("sports")),
            ("paint paint", Some("arts")),
            ("paint shared", Some("arts")),
        ],
        &[],
    );
    let options = PruneOptions {
        min_count: Some(2),
        top_n: Some(2),
    };
    let (pruned, report) = prune::run(&corpus, &options).unwrap();

    assert_eq!(report.vocabulary_before, 4);
    assert_eq!(report.after_frequency, Some(3));
    assert_eq!(report.after_info_gain, Some(2));
    assert_eq!(report.vocabulary_after(), 2);
    assert_eq!(vocabulary(&pruned), vec!["ball", "paint"]);
}

#[test]
fn no_passes_copies_the_corpus() {
    let corpus = build(&[("a b a", None)], &[]);
    let (pruned, report) = prune::run(&corpus, &PruneOptions::none()).unwrap();
    assert!(!PruneOptions::none().is_active());
    assert_eq!(pruned.alphabet(), corpus.alphabet());
    assert_eq!(report.vocabulary_after(), 2);
    assert_eq!(report.after_frequency, None);
}

#[test]
fn default_options_prune_below_three() {
    let options = PruneOptions::default();
    assert_eq!(options.min_count, Some(3));
    assert_eq!(options.top_n, None);
}
