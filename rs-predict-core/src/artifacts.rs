//! Model artifact persistence.
//!
//! The pipeline ships as ten JSON documents: five raw-count tables and
//! five probability tables, each a nested key → value map. Writes are
//! atomic (serialize into a temporary file in the destination
//! directory, then persist over the target path) so a crashed run
//! never leaves a half-written artifact behind. Table iteration order
//! is deterministic, so identical inputs produce byte-identical files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::model::corpus_model::RawModel;
use crate::model::probability::ProbabilityModel;

/// File name of the unigram count artifact.
pub const UNIGRAMS_FILE: &str = "unigrams.json";
/// File name of the bigram count artifact.
pub const BIGRAMS_FILE: &str = "bigrams.json";
/// File name of the trigram count artifact.
pub const TRIGRAMS_FILE: &str = "trigrams.json";
/// File name of the completion count artifact.
pub const COMPLETIONS_FILE: &str = "completions.json";
/// File name of the capitalization count artifact.
pub const CAP_PATTERNS_FILE: &str = "cap_patterns.json";

/// File name of the unigram probability artifact.
pub const UNIGRAM_PROBS_FILE: &str = "unigram_probs.json";
/// File name of the bigram probability artifact.
pub const BIGRAM_PROBS_FILE: &str = "bigram_probs.json";
/// File name of the trigram probability artifact.
pub const TRIGRAM_PROBS_FILE: &str = "trigram_probs.json";
/// File name of the completion probability artifact.
pub const COMPLETION_PROBS_FILE: &str = "completion_probs.json";
/// File name of the capitalization probability artifact.
pub const CAP_PATTERN_PROBS_FILE: &str = "cap_patterns_probs.json";

/// Writes the five raw-count tables of a model into `dir`.
///
/// The directory is created if missing. Each table lands in its own
/// JSON document, written atomically.
pub fn save_raw_counts(model: &RawModel, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
	fs::create_dir_all(dir)?;
	write_json(model.unigrams(), &dir.join(UNIGRAMS_FILE))?;
	write_json(model.bigrams(), &dir.join(BIGRAMS_FILE))?;
	write_json(model.trigrams(), &dir.join(TRIGRAMS_FILE))?;
	write_json(model.completions(), &dir.join(COMPLETIONS_FILE))?;
	write_json(model.cap_patterns(), &dir.join(CAP_PATTERNS_FILE))?;
	Ok(())
}

/// Loads the five raw-count tables from `dir` into a model.
///
/// # Errors
/// Missing or unreadable documents are fatal; there is no fallback
/// for absent input.
pub fn load_raw_counts(dir: &Path) -> Result<RawModel, Box<dyn std::error::Error>> {
	Ok(RawModel::from_tables(
		read_json(&dir.join(UNIGRAMS_FILE))?,
		read_json(&dir.join(BIGRAMS_FILE))?,
		read_json(&dir.join(TRIGRAMS_FILE))?,
		read_json(&dir.join(COMPLETIONS_FILE))?,
		read_json(&dir.join(CAP_PATTERNS_FILE))?,
	))
}

/// Writes the five probability tables into `dir`.
pub fn save_probabilities(
	model: &ProbabilityModel,
	dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
	fs::create_dir_all(dir)?;
	write_json(model.unigram_probs(), &dir.join(UNIGRAM_PROBS_FILE))?;
	write_json(model.bigram_probs(), &dir.join(BIGRAM_PROBS_FILE))?;
	write_json(model.trigram_probs(), &dir.join(TRIGRAM_PROBS_FILE))?;
	write_json(model.completion_probs(), &dir.join(COMPLETION_PROBS_FILE))?;
	write_json(model.cap_pattern_probs(), &dir.join(CAP_PATTERN_PROBS_FILE))?;
	Ok(())
}

/// Loads the five probability tables from `dir`.
pub fn load_probabilities(dir: &Path) -> Result<ProbabilityModel, Box<dyn std::error::Error>> {
	Ok(ProbabilityModel::from_tables(
		read_json(&dir.join(UNIGRAM_PROBS_FILE))?,
		read_json(&dir.join(BIGRAM_PROBS_FILE))?,
		read_json(&dir.join(TRIGRAM_PROBS_FILE))?,
		read_json(&dir.join(COMPLETION_PROBS_FILE))?,
		read_json(&dir.join(CAP_PATTERN_PROBS_FILE))?,
	))
}

/// Serializes a value as JSON into `path` atomically.
fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let parent = path.parent().unwrap_or_else(|| Path::new("."));
	let temp_file = NamedTempFile::new_in(parent)?;
	let writer = BufWriter::new(&temp_file);
	serde_json::to_writer(writer, value)?;
	temp_file.persist(path)?;
	Ok(())
}

/// Deserializes a JSON document from `path`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
	let file = File::open(path)?;
	let reader = BufReader::new(file);
	Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::probability::convert;
	use crate::model::pruner::{prune, PruneConfig};

	fn sample_model() -> RawModel {
		let mut model = RawModel::new();
		model.observe_line("The Quick fox JUMPS over the lazy dog.");
		model.observe_line("the quick fox runs.");
		model
	}

	fn lax_config() -> PruneConfig {
		PruneConfig {
			top_k: 20000,
			min_unigram_count: 1,
			min_bigram_count: 1,
			min_trigram_count: 1,
			min_cap_count: 1,
		}
	}

	#[test]
	fn test_raw_counts_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let model = sample_model();
		save_raw_counts(&model, dir.path()).unwrap();
		let loaded = load_raw_counts(dir.path()).unwrap();
		assert_eq!(loaded.unigrams(), model.unigrams());
		assert_eq!(loaded.bigrams(), model.bigrams());
		assert_eq!(loaded.trigrams(), model.trigrams());
		assert_eq!(loaded.completions(), model.completions());
		assert_eq!(loaded.cap_patterns(), model.cap_patterns());
	}

	#[test]
	fn test_probability_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let (pruned, _) = prune(&sample_model(), &lax_config()).unwrap();
		let (probs, _) = convert(&pruned);
		save_probabilities(&probs, dir.path()).unwrap();
		let loaded = load_probabilities(dir.path()).unwrap();
		assert_eq!(loaded, probs);
	}

	#[test]
	fn test_missing_artifact_is_fatal() {
		let dir = tempfile::tempdir().unwrap();
		assert!(load_raw_counts(dir.path()).is_err());
	}

	#[test]
	fn test_identical_models_write_identical_bytes() {
		let dir_a = tempfile::tempdir().unwrap();
		let dir_b = tempfile::tempdir().unwrap();
		save_raw_counts(&sample_model(), dir_a.path()).unwrap();
		save_raw_counts(&sample_model(), dir_b.path()).unwrap();
		for name in [
			UNIGRAMS_FILE,
			BIGRAMS_FILE,
			TRIGRAMS_FILE,
			COMPLETIONS_FILE,
			CAP_PATTERNS_FILE,
		] {
			let a = fs::read(dir_a.path().join(name)).unwrap();
			let b = fs::read(dir_b.path().join(name)).unwrap();
			assert_eq!(a, b);
		}
	}
}
