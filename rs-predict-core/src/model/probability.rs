use serde::{Deserialize, Serialize};

use super::pruner::PrunedModel;
use super::tables::{NestedProbTable, ProbTable};

/// The final model artifact: five conditional probability tables.
///
/// # Invariants
/// - Every row with a nonzero denominator sums to 1.0 within
///   floating-point tolerance, except trigram rows (see below).
/// - Contexts whose denominator is zero or absent are omitted, never
///   emitted with NaN or infinite values.
///
/// Trigram rows divide successor counts taken against the full corpus
/// by a bigram denominator that survived independent pruning. A
/// surviving bigram entry keeps its full raw count, which bounds the
/// trigram numerator, so surviving ratios stay in range; a context
/// whose bigram entry was pruned away is omitted. Ratios are emitted
/// verbatim either way, and any value above 1.0 is counted in
/// `ConvertStats::trigram_overshoots` rather than clamped.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProbabilityModel {
	unigram_probs: ProbTable,
	bigram_probs: NestedProbTable,
	trigram_probs: NestedProbTable,
	completion_probs: NestedProbTable,
	cap_pattern_probs: NestedProbTable,
}

impl ProbabilityModel {
	/// Unigram probabilities (word → probability).
	pub fn unigram_probs(&self) -> &ProbTable {
		&self.unigram_probs
	}

	/// Bigram probabilities (word → successor probabilities).
	pub fn bigram_probs(&self) -> &NestedProbTable {
		&self.bigram_probs
	}

	/// Trigram probabilities (space-joined word pair → successor probabilities).
	pub fn trigram_probs(&self) -> &NestedProbTable {
		&self.trigram_probs
	}

	/// Completion probabilities (prefix → surface-form probabilities).
	pub fn completion_probs(&self) -> &NestedProbTable {
		&self.completion_probs
	}

	/// Capitalization probabilities (word → surface-form probabilities).
	pub fn cap_pattern_probs(&self) -> &NestedProbTable {
		&self.cap_pattern_probs
	}

	/// Rebuilds a model from five already-converted tables.
	///
	/// Used by the artifact loader.
	pub(crate) fn from_tables(
		unigram_probs: ProbTable,
		bigram_probs: NestedProbTable,
		trigram_probs: NestedProbTable,
		completion_probs: NestedProbTable,
		cap_pattern_probs: NestedProbTable,
	) -> Self {
		Self {
			unigram_probs,
			bigram_probs,
			trigram_probs,
			completion_probs,
			cap_pattern_probs,
		}
	}
}

/// Observability counters from a conversion pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConvertStats {
	/// Number of trigram entries whose ratio exceeded 1.0 because the
	/// bigram denominator was pruned harder than the trigram numerator.
	pub trigram_overshoots: usize,
}

/// Converts a pruned model's counts into conditional probabilities.
///
/// # Behavior
/// - Unigram: count / total surviving unigram count.
/// - Bigram: successor count / pruned unigram count of the context.
/// - Trigram: successor count / pruned bigram count of the context pair.
/// - Completion and capitalization: count / row total.
/// - Every division guards its denominator; zero or absent
///   denominators omit the row instead of emitting invalid values.
pub fn convert(pruned: &PrunedModel) -> (ProbabilityModel, ConvertStats) {
	let mut model = ProbabilityModel::default();
	let mut stats = ConvertStats::default();

	let total_words = pruned.vocabulary().total();
	if total_words > 0 {
		for (word, count) in pruned.vocabulary().iter() {
			model.unigram_probs.insert(word, count as f64 / total_words as f64);
		}
	}

	for (context, successors) in pruned.bigrams().rows() {
		let context_count = pruned.vocabulary().get(context);
		if context_count == 0 {
			continue;
		}
		for (successor, count) in successors {
			model
				.bigram_probs
				.insert(context, successor, *count as f64 / context_count as f64);
		}
	}

	for (context, successors) in pruned.trigrams().rows() {
		let Some((first, second)) = context.split_once(' ') else {
			continue;
		};
		let pair_count = pruned.bigrams().get(first, second);
		if pair_count == 0 {
			continue;
		}
		for (successor, count) in successors {
			let prob = *count as f64 / pair_count as f64;
			if prob > 1.0 {
				stats.trigram_overshoots += 1;
			}
			model.trigram_probs.insert(context, successor, prob);
		}
	}

	for (prefix, words) in pruned.completions().rows() {
		let total: u64 = words.values().sum();
		if total == 0 {
			continue;
		}
		for (word, count) in words {
			model
				.completion_probs
				.insert(prefix, word, *count as f64 / total as f64);
		}
	}

	for (word, forms) in pruned.cap_patterns().rows() {
		let total: u64 = forms.values().sum();
		if total == 0 {
			continue;
		}
		for (form, count) in forms {
			model
				.cap_pattern_probs
				.insert(word, form, *count as f64 / total as f64);
		}
	}

	(model, stats)
}
