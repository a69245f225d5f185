//! Command-line interface
//!
//! Thin display layer over the core: loads a corpus, runs the benchmark,
//! and renders dataset statistics, score comparison, the evaluation report,
//! and ad hoc predictions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::benchmark::{default_candidates, BenchmarkOutcome, BenchmarkRunner};
use crate::corpus::loader::CorpusLoader;
use crate::corpus::split::{Split, Splitter};
use crate::corpus::{CategoryVocab, Corpus};
use crate::error::Result;
use crate::evaluation::{EvaluationReport, Evaluator};
use crate::predictor::Predictor;

#[derive(Parser)]
#[command(name = "triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consumer complaint classification: benchmark, select, predict")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train all candidate models, select the best, and report
    Benchmark {
        /// Input CSV file with text and label columns
        #[arg(short, long)]
        data: PathBuf,

        /// Text column name
        #[arg(long, default_value = "text")]
        text_column: String,

        /// Label column name
        #[arg(long, default_value = "label")]
        label_column: String,

        /// JSON file mapping category ids to names (defaults to the
        /// consumer-complaint categories)
        #[arg(long)]
        categories: Option<PathBuf>,

        /// Random seed for splitting and seeded candidates
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Texts to classify with the selected model (repeatable)
        #[arg(long)]
        predict: Vec<String>,
    },

    /// Show dataset statistics without training
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Text column name
        #[arg(long, default_value = "text")]
        text_column: String,

        /// Label column name
        #[arg(long, default_value = "label")]
        label_column: String,

        /// JSON file mapping category ids to names
        #[arg(long)]
        categories: Option<PathBuf>,
    },
}

/// The consumer-complaint category table used when no mapping file is given.
fn default_categories() -> Result<CategoryVocab> {
    CategoryVocab::new(vec![
        (0, "Credit reporting, repair, or other"),
        (1, "Debt collection"),
        (2, "Consumer Loan"),
        (3, "Mortgage"),
    ])
}

fn load_categories(path: Option<&PathBuf>) -> Result<CategoryVocab> {
    match path {
        None => default_categories(),
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let raw: BTreeMap<String, String> = serde_json::from_str(&content)?;
            let mut pairs = Vec::with_capacity(raw.len());
            for (id, name) in raw {
                let id = id.parse::<u32>().map_err(|_| {
                    crate::error::TriageError::ValidationError(format!(
                        "category id '{}' is not a nonnegative integer",
                        id
                    ))
                })?;
                pairs.push((id, name));
            }
            CategoryVocab::new(pairs)
        }
    }
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", "─".repeat(56).truecolor(100, 100, 100));
}

fn kv(key: &str, value: &str) {
    println!("  {:<28} {}", key.truecolor(140, 140, 140), value.white());
}

fn print_stats(corpus: &Corpus, vocab: &CategoryVocab) {
    let stats = corpus.stats();

    section("Dataset");
    kv("Samples", &stats.n_samples.to_string());
    kv("Categories", &vocab.len().to_string());
    kv(
        "Text length (chars)",
        &format!(
            "mean {:.1}, min {}, max {}",
            stats.mean_text_len, stats.min_text_len, stats.max_text_len
        ),
    );
    kv("Mean word count", &format!("{:.1}", stats.mean_word_count));

    section("Class distribution");
    for (id, count) in &stats.class_counts {
        let name = vocab.name(*id).unwrap_or("?");
        let pct = 100.0 * *count as f64 / stats.n_samples as f64;
        println!(
            "  {:>3}  {:<40} {:>4} samples ({:>5.1}%)",
            id.to_string().truecolor(120, 170, 255),
            name,
            count,
            pct
        );
    }
}

fn print_split(split: &Split) {
    section("Split");
    kv("Training samples", &split.training.len().to_string());
    kv("Evaluation samples", &split.evaluation.len().to_string());
}

fn print_scores(outcome: &BenchmarkOutcome) {
    section("Model performance");
    for record in outcome.ranked_scores() {
        let marker = if record.name == outcome.selected.name() {
            "▸".truecolor(100, 210, 120)
        } else {
            " ".normal()
        };
        println!(
            "  {} {:<25} {:.4} ({:.2}%)",
            marker,
            record.name,
            record.accuracy,
            record.accuracy * 100.0
        );
    }
    println!();
    println!(
        "  {} {}",
        "selected:".truecolor(140, 140, 140),
        outcome.selected.name().white().bold()
    );
}

fn print_report(report: &EvaluationReport) {
    section("Classification report");
    println!(
        "  {:<40} {:>9} {:>9} {:>9} {:>8}",
        "", "precision", "recall", "f1", "support"
    );
    for metrics in &report.per_class {
        println!(
            "  {:<40} {:>9.3} {:>9.3} {:>9.3} {:>8}",
            metrics.name, metrics.precision, metrics.recall, metrics.f1, metrics.support
        );
    }

    section("Confusion matrix");
    let categories = report.confusion.categories();
    print!("  {:>8}", "actual↓");
    for id in categories {
        print!(" {:>6}", id);
    }
    println!();
    for (i, id) in categories.iter().enumerate() {
        print!("  {:>8}", id);
        for j in 0..categories.len() {
            print!(" {:>6}", report.confusion.counts()[[i, j]]);
        }
        println!();
    }

    section("Per-class accuracy");
    for metrics in &report.per_class {
        match metrics.accuracy {
            Some(acc) => println!("  {:<40} {:.3}", metrics.name, acc),
            None => println!(
                "  {:<40} {}",
                metrics.name,
                "no test examples".truecolor(140, 140, 140)
            ),
        }
    }
}

pub fn cmd_info(
    data: &PathBuf,
    text_column: &str,
    label_column: &str,
    categories: Option<&PathBuf>,
) -> Result<()> {
    let vocab = load_categories(categories)?;
    let corpus = CorpusLoader::new()
        .with_text_column(text_column)
        .with_label_column(label_column)
        .load_csv(data, &vocab)?;

    print_stats(&corpus, &vocab);
    Ok(())
}

pub fn cmd_benchmark(
    data: &PathBuf,
    text_column: &str,
    label_column: &str,
    categories: Option<&PathBuf>,
    seed: u64,
    predict: &[String],
) -> Result<()> {
    let vocab = load_categories(categories)?;
    let corpus = CorpusLoader::new()
        .with_text_column(text_column)
        .with_label_column(label_column)
        .load_csv(data, &vocab)?;

    print_stats(&corpus, &vocab);

    let split = Splitter::new().with_seed(seed).split(&corpus)?;
    print_split(&split);

    let runner = BenchmarkRunner::new(default_candidates()).with_seed(seed);
    let outcome = runner.run(&split)?;
    print_scores(&outcome);

    let report = Evaluator::new(&vocab).evaluate(&outcome.selected, &split.evaluation)?;
    print_report(&report);

    if !predict.is_empty() {
        let predictor = Predictor::new(&vocab, &outcome.selected);
        section("Predictions");
        for text in predict {
            let id = predictor.predict(text)?;
            let name = predictor.category_name(id).unwrap_or("?");
            println!("  {}", format!("\"{}\"", text).truecolor(140, 140, 140));
            println!("    → {} {}", id.to_string().truecolor(120, 170, 255), name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_table() {
        let vocab = default_categories().unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.name(1), Some("Debt collection"));
        assert_eq!(vocab.name(3), Some("Mortgage"));
    }
}
