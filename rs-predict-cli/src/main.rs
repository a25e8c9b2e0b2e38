//! Corpus-to-model build tool.
//!
//! Aggregates a text corpus into frequency tables, writes the raw
//! count artifacts, prunes the model under the configured budgets and
//! writes the probability artifacts.
//!
//! Usage: rs-predict-cli <corpus.txt> [--out DIR] [--top-k N]
//!        [--min-unigram N] [--min-bigram N] [--min-trigram N] [--min-cap N]

use std::path::PathBuf;
use std::process;

use rs_predict_core::artifacts;
use rs_predict_core::model::corpus_model::RawModel;
use rs_predict_core::model::probability::convert;
use rs_predict_core::model::pruner::{prune, PruneConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args: Vec<String> = std::env::args().collect();
	if args.len() < 2 {
		eprintln!(
			"Usage: {} <corpus.txt> [--out DIR] [--top-k N] [--min-unigram N] [--min-bigram N] [--min-trigram N] [--min-cap N]",
			args[0]
		);
		eprintln!("  --out DIR       : Output directory for model artifacts (default: models)");
		eprintln!("  --top-k N       : Maximum vocabulary size (default: 20000)");
		eprintln!("  --min-unigram N : Minimum word count (default: 5)");
		eprintln!("  --min-bigram N  : Minimum bigram/completion successor count (default: 3)");
		eprintln!("  --min-trigram N : Minimum trigram successor count (default: 2)");
		eprintln!("  --min-cap N     : Minimum capitalization form weight (default: 2)");
		process::exit(1);
	}

	let corpus_path = &args[1];
	let output_dir = PathBuf::from(
		parse_value(&args, "--out").unwrap_or_else(|| "models".to_owned()),
	);

	let defaults = PruneConfig::default();
	let config = PruneConfig {
		top_k: parse_number(&args, "--top-k").unwrap_or(defaults.top_k as u64) as usize,
		min_unigram_count: parse_number(&args, "--min-unigram").unwrap_or(defaults.min_unigram_count),
		min_bigram_count: parse_number(&args, "--min-bigram").unwrap_or(defaults.min_bigram_count),
		min_trigram_count: parse_number(&args, "--min-trigram").unwrap_or(defaults.min_trigram_count),
		min_cap_count: parse_number(&args, "--min-cap").unwrap_or(defaults.min_cap_count),
	};
	config.validate()?;

	println!("[1/4] Processing corpus file: {}", corpus_path);
	let model = RawModel::from_corpus_file(corpus_path)?;
	println!("  Processed {} sentences", model.sentences());
	println!("  Found {} unique words", model.unigrams().len());
	println!("  Found {} unique prefixes", model.completions().len());
	println!("  Found {} capitalization patterns", model.cap_patterns().len());

	println!("[2/4] Saving raw count models to {}", output_dir.display());
	artifacts::save_raw_counts(&model, &output_dir)?;

	println!("[3/4] Optimizing model for mobile usage...");
	let (pruned, stats) = prune(&model, &config)?;
	println!("  Original model size: {:.2} MB", as_megabytes(stats.original_bytes));
	println!("  Optimized model size: {:.2} MB", as_megabytes(stats.optimized_bytes));
	println!("  Size reduction: {:.2}%", stats.reduction_percent());
	println!(
		"  Vocabulary size reduced from {} to {} words",
		stats.vocabulary_before, stats.vocabulary_after
	);
	println!(
		"  Capitalization patterns reduced from {} to {}",
		stats.cap_patterns_before, stats.cap_patterns_after
	);

	println!("[4/4] Converting counts to probabilities...");
	let (probs, convert_stats) = convert(&pruned);
	if convert_stats.trigram_overshoots > 0 {
		println!(
			"  Warning: {} trigram probabilities exceed 1.0 (pruned denominator)",
			convert_stats.trigram_overshoots
		);
	}
	artifacts::save_probabilities(&probs, &output_dir)?;

	println!("Processing complete. Files saved to: {}", output_dir.display());
	Ok(())
}

/// Returns the string value following `flag`, if present.
fn parse_value(args: &[String], flag: &str) -> Option<String> {
	args.iter()
		.position(|a| a == flag)
		.and_then(|i| args.get(i + 1))
		.cloned()
}

/// Returns the numeric value following `flag`, if present and valid.
fn parse_number(args: &[String], flag: &str) -> Option<u64> {
	parse_value(args, flag).and_then(|s| s.parse().ok())
}

fn as_megabytes(bytes: usize) -> f64 {
	bytes as f64 / (1024.0 * 1024.0)
}
