use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::corpus_model::RawModel;
use super::tables::{CountTable, NestedTable};

/// Maximum number of successors kept per bigram/trigram/completion
/// context after pruning.
pub const MAX_SUCCESSORS: usize = 10;

/// Maximum number of surface forms kept per capitalization entry.
pub const MAX_CAP_FORMS: usize = 3;

/// Pruning budgets applied when shrinking a raw model.
///
/// # Fields
/// - `top_k`: maximum vocabulary size (most frequent words win).
/// - `min_unigram_count`: minimum count for a word to stay in the vocabulary.
/// - `min_bigram_count`: minimum successor count for bigrams and completions.
/// - `min_trigram_count`: minimum successor count for trigrams.
/// - `min_cap_count`: minimum weight for a capitalization surface form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PruneConfig {
	pub top_k: usize,
	pub min_unigram_count: u64,
	pub min_bigram_count: u64,
	pub min_trigram_count: u64,
	pub min_cap_count: u64,
}

impl Default for PruneConfig {
	fn default() -> Self {
		Self {
			top_k: 20000,
			min_unigram_count: 5,
			min_bigram_count: 3,
			min_trigram_count: 2,
			min_cap_count: 2,
		}
	}
}

impl PruneConfig {
	/// Validates the configuration.
	///
	/// # Errors
	/// Returns an error if `top_k` is 0. Thresholds are unsigned, so
	/// negative values are unrepresentable.
	pub fn validate(&self) -> Result<(), String> {
		if self.top_k == 0 {
			return Err("top_k must be >= 1".to_owned());
		}
		Ok(())
	}
}

/// Size-reduction statistics reported by a pruning pass.
///
/// Byte sizes are measured on the serialized JSON form of the five
/// tables, the shape in which the model ships. Observability only;
/// correctness never depends on these numbers.
#[derive(Clone, Copy, Debug, Default)]
pub struct PruneStats {
	pub original_bytes: usize,
	pub optimized_bytes: usize,
	pub vocabulary_before: usize,
	pub vocabulary_after: usize,
	pub cap_patterns_before: usize,
	pub cap_patterns_after: usize,
}

impl PruneStats {
	/// Percentage of serialized bytes removed by pruning.
	pub fn reduction_percent(&self) -> f64 {
		if self.original_bytes == 0 {
			return 0.0;
		}
		100.0 * (1.0 - self.optimized_bytes as f64 / self.original_bytes as f64)
	}
}

/// The pruned frequency model.
///
/// # Invariants
/// - The vocabulary holds at most `top_k` words, each with a count
///   meeting `min_unigram_count`.
/// - Every bigram/trigram context word, every bigram/trigram/completion
///   successor and every capitalization word key is present in the
///   vocabulary.
/// - No context holds more than `MAX_SUCCESSORS` successors; no word
///   holds more than `MAX_CAP_FORMS` surface forms.
/// - Completion prefixes are at least 2 characters long.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PrunedModel {
	vocabulary: CountTable,
	bigrams: NestedTable,
	trigrams: NestedTable,
	completions: NestedTable,
	cap_patterns: NestedTable,
}

impl PrunedModel {
	/// Surviving vocabulary (lowercased word → count).
	pub fn vocabulary(&self) -> &CountTable {
		&self.vocabulary
	}

	/// Pruned bigram counts.
	pub fn bigrams(&self) -> &NestedTable {
		&self.bigrams
	}

	/// Pruned trigram counts.
	pub fn trigrams(&self) -> &NestedTable {
		&self.trigrams
	}

	/// Pruned completion counts.
	pub fn completions(&self) -> &NestedTable {
		&self.completions
	}

	/// Pruned capitalization counts.
	pub fn cap_patterns(&self) -> &NestedTable {
		&self.cap_patterns
	}
}

/// Prunes a raw model under the given budgets.
///
/// # Algorithm
/// 1. Rank unigrams by count descending (ties broken by word order),
///    truncate to `top_k`, then drop entries under `min_unigram_count`.
/// 2. Keep bigram contexts and successors that survive in the
///    vocabulary, successors meeting `min_bigram_count`, capped at the
///    top `MAX_SUCCESSORS` per context.
/// 3. Same for trigrams, requiring both context words to survive,
///    with `min_trigram_count`.
/// 4. Keep completion prefixes of length >= 2 characters; successor
///    filtering uses `min_bigram_count` and the same cap.
/// 5. Keep capitalization entries for surviving words, forms meeting
///    `min_cap_count`, capped at `MAX_CAP_FORMS`.
///
/// All "top N" selections use the explicit (count desc, key asc)
/// ordering, making the output independent of map iteration order.
///
/// # Errors
/// Returns an error if the configuration is invalid.
pub fn prune(raw: &RawModel, config: &PruneConfig) -> Result<(PrunedModel, PruneStats), String> {
	config.validate()?;

	let mut ranked: Vec<(&str, u64)> = raw.unigrams().iter().collect();
	sort_ranked(&mut ranked);
	ranked.truncate(config.top_k);

	let mut vocabulary = CountTable::new();
	for (word, count) in ranked {
		if count >= config.min_unigram_count {
			vocabulary.add(word, count);
		}
	}

	let mut pruned = PrunedModel {
		vocabulary,
		bigrams: NestedTable::new(),
		trigrams: NestedTable::new(),
		completions: NestedTable::new(),
		cap_patterns: NestedTable::new(),
	};

	for (context, successors) in raw.bigrams().rows() {
		if !pruned.vocabulary.contains(context) {
			continue;
		}
		let row = filter_row(successors, config.min_bigram_count, MAX_SUCCESSORS, |word| {
			pruned.vocabulary.contains(word)
		});
		pruned.bigrams.insert_row(context, row);
	}

	for (context, successors) in raw.trigrams().rows() {
		let Some((first, second)) = context.split_once(' ') else {
			continue;
		};
		if !pruned.vocabulary.contains(first) || !pruned.vocabulary.contains(second) {
			continue;
		}
		let row = filter_row(successors, config.min_trigram_count, MAX_SUCCESSORS, |word| {
			pruned.vocabulary.contains(word)
		});
		pruned.trigrams.insert_row(context, row);
	}

	for (prefix, successors) in raw.completions().rows() {
		// Single-character prefixes predict too broadly to be worth
		// their size on device.
		if prefix.chars().count() < 2 {
			continue;
		}
		let row = filter_row(successors, config.min_bigram_count, MAX_SUCCESSORS, |word| {
			pruned.vocabulary.contains(word)
		});
		pruned.completions.insert_row(prefix, row);
	}

	for (word, forms) in raw.cap_patterns().rows() {
		if !pruned.vocabulary.contains(word) {
			continue;
		}
		let row = filter_row(forms, config.min_cap_count, MAX_CAP_FORMS, |_| true);
		pruned.cap_patterns.insert_row(word, row);
	}

	let stats = PruneStats {
		original_bytes: serialized_size(
			raw.unigrams(),
			raw.bigrams(),
			raw.trigrams(),
			raw.completions(),
			raw.cap_patterns(),
		)?,
		optimized_bytes: serialized_size(
			&pruned.vocabulary,
			&pruned.bigrams,
			&pruned.trigrams,
			&pruned.completions,
			&pruned.cap_patterns,
		)?,
		vocabulary_before: raw.unigrams().len(),
		vocabulary_after: pruned.vocabulary.len(),
		cap_patterns_before: raw.cap_patterns().len(),
		cap_patterns_after: pruned.cap_patterns.len(),
	};

	Ok((pruned, stats))
}

/// Filters one successor row: membership check, minimum count, then
/// the deterministic top-`cap` selection.
fn filter_row<F>(
	successors: &BTreeMap<String, u64>,
	min_count: u64,
	cap: usize,
	keep: F,
) -> BTreeMap<String, u64>
where
	F: Fn(&str) -> bool,
{
	let mut kept: Vec<(&str, u64)> = successors
		.iter()
		.map(|(word, count)| (word.as_str(), *count))
		.filter(|&(word, count)| count >= min_count && keep(word))
		.collect();
	sort_ranked(&mut kept);
	kept.truncate(cap);
	kept.into_iter().map(|(word, count)| (word.to_owned(), count)).collect()
}

/// Orders entries by count descending, ties by key ascending.
fn sort_ranked(entries: &mut [(&str, u64)]) {
	entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
}

/// Total serialized JSON size of a five-table model, in bytes.
fn serialized_size(
	unigrams: &CountTable,
	bigrams: &NestedTable,
	trigrams: &NestedTable,
	completions: &NestedTable,
	cap_patterns: &NestedTable,
) -> Result<usize, String> {
	let mut total = 0;
	total += serde_json::to_string(unigrams).map_err(|e| e.to_string())?.len();
	total += serde_json::to_string(bigrams).map_err(|e| e.to_string())?.len();
	total += serde_json::to_string(trigrams).map_err(|e| e.to_string())?.len();
	total += serde_json::to_string(completions).map_err(|e| e.to_string())?.len();
	total += serde_json::to_string(cap_patterns).map_err(|e| e.to_string())?.len();
	Ok(total)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::corpus_model::RawModel;

	fn model_from(lines: &[&str]) -> RawModel {
		let mut model = RawModel::new();
		for line in lines {
			model.observe_line(line);
		}
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
	fn test_invalid_top_k_is_rejected() {
		let model = model_from(&["some words"]);
		let config = PruneConfig { top_k: 0, ..PruneConfig::default() };
		assert!(prune(&model, &config).is_err());
	}

	#[test]
	fn test_top_k_one_keeps_single_highest_word() {
		// "the" appears 4 times, everything else less often.
		let model = model_from(&[
			"the fox and the dog and the cat saw the bird",
		]);
		let config = PruneConfig { top_k: 1, min_unigram_count: 1, ..lax_config() };
		let (pruned, _) = prune(&model, &config).unwrap();
		assert_eq!(pruned.vocabulary().len(), 1);
		assert_eq!(pruned.vocabulary().get("the"), 4);
		// Every n-gram row referencing a dropped word disappears.
		assert!(pruned.bigrams().is_empty());
		assert!(pruned.trigrams().is_empty());
		// Only completions of the surviving word remain.
		assert_eq!(pruned.completions().len(), 1);
		assert!(pruned.completions().row("th").is_some());
	}

	#[test]
	fn test_tie_break_is_lexicographic() {
		let model = model_from(&["zebra apple zebra apple mango"]);
		let config = PruneConfig { top_k: 1, ..lax_config() };
		let (pruned, _) = prune(&model, &config).unwrap();
		// "apple" and "zebra" both count 2; "apple" wins the tie.
		assert_eq!(pruned.vocabulary().get("apple"), 2);
		assert_eq!(pruned.vocabulary().len(), 1);
	}

	#[test]
	fn test_min_unigram_count_applies_after_top_k() {
		let model = model_from(&["the the the fox fox dog"]);
		let config = PruneConfig { top_k: 2, min_unigram_count: 3, ..lax_config() };
		let (pruned, _) = prune(&model, &config).unwrap();
		// Truncation keeps {the: 3, fox: 2}; the threshold then drops "fox".
		assert_eq!(pruned.vocabulary().len(), 1);
		assert_eq!(pruned.vocabulary().get("the"), 3);
	}

	#[test]
	fn test_min_unigram_count_can_empty_the_vocabulary() {
		let line = "the quick fox";
		let model = model_from(&[line, line]);
		let config = PruneConfig { min_unigram_count: 3, ..lax_config() };
		let (pruned, _) = prune(&model, &config).unwrap();
		assert!(pruned.vocabulary().is_empty());
		assert!(pruned.bigrams().is_empty());
		assert!(pruned.cap_patterns().is_empty());
	}

	#[test]
	fn test_successor_fanout_is_capped() {
		// 12 distinct successors of "the", with distinct counts.
		let mut lines = Vec::new();
		let successors = [
			"ant", "bee", "cat", "dog", "eel", "fox", "gnu", "hen", "ibex", "jay", "koi", "lynx",
		];
		for (i, successor) in successors.iter().enumerate() {
			for _ in 0..=i {
				lines.push(format!("the {}", successor));
			}
		}
		let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
		let model = model_from(&refs);
		let (pruned, _) = prune(&model, &lax_config()).unwrap();

		let row = pruned.bigrams().row("the").unwrap();
		assert_eq!(row.len(), MAX_SUCCESSORS);
		// The two rarest successors were cut.
		assert!(!row.contains_key("ant"));
		assert!(!row.contains_key("bee"));
		assert!(row.contains_key("lynx"));
	}

	#[test]
	fn test_single_character_prefixes_are_dropped() {
		let model = model_from(&["apple apricot ant apple apricot ant"]);
		let (pruned, _) = prune(&model, &lax_config()).unwrap();
		assert!(pruned.completions().row("a").is_none());
		assert!(pruned.completions().row("ap").is_some());
	}

	#[test]
	fn test_cap_forms_capped_at_three() {
		// Four surface forms of "mix" with distinct weights.
		let model = model_from(&[
			"say mix mix mix mix",
			"say MIx MIx MIx",
			"say miX miX",
			"say mIx",
		]);
		let (pruned, _) = prune(&model, &lax_config()).unwrap();
		let row = pruned.cap_patterns().row("mix").unwrap();
		assert_eq!(row.len(), MAX_CAP_FORMS);
		assert!(!row.contains_key("mIx"));
	}

	#[test]
	fn test_referential_closure() {
		let model = model_from(&[
			"The Quick fox JUMPS over the lazy dog.",
			"the quick fox runs fast.",
			"a lazy dog sleeps.",
		]);
		let config = PruneConfig { top_k: 5, ..lax_config() };
		let (pruned, _) = prune(&model, &config).unwrap();

		for (context, row) in pruned.bigrams().rows() {
			assert!(pruned.vocabulary().contains(context));
			for successor in row.keys() {
				assert!(pruned.vocabulary().contains(successor));
			}
		}
		for (context, row) in pruned.trigrams().rows() {
			let (first, second) = context.split_once(' ').unwrap();
			assert!(pruned.vocabulary().contains(first));
			assert!(pruned.vocabulary().contains(second));
			for successor in row.keys() {
				assert!(pruned.vocabulary().contains(successor));
			}
		}
		for (_, row) in pruned.completions().rows() {
			for successor in row.keys() {
				assert!(pruned.vocabulary().contains(successor));
			}
		}
		for (word, _) in pruned.cap_patterns().rows() {
			assert!(pruned.vocabulary().contains(word));
		}
	}

	#[test]
	fn test_stats_report_shrinkage() {
		let model = model_from(&[
			"the quick fox jumps over the lazy dog",
			"the quick fox jumps over the lazy dog",
			"rare words appear once only here",
		]);
		let config = PruneConfig { min_unigram_count: 2, ..lax_config() };
		let (_, stats) = prune(&model, &config).unwrap();
		assert!(stats.optimized_bytes < stats.original_bytes);
		assert!(stats.vocabulary_after < stats.vocabulary_before);
		assert!(stats.reduction_percent() > 0.0);
	}
}
