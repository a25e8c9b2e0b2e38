use std::collections::BTreeMap;

use rand::Rng;

use super::probability::ProbabilityModel;

/// Read-side query surface over a finished probability model.
///
/// This is what a keyboard front end does with the artifacts: ranked
/// next-word suggestion with trigram-to-bigram backoff, prefix
/// completion, capitalization restoration, and weighted random
/// sampling for demo text generation.
///
/// # Notes
/// - The predictor borrows the model; building it is free.
/// - All ranked results order by probability descending, ties broken
///   by word order, so results are reproducible.
#[derive(Debug)]
pub struct Predictor<'a> {
	model: &'a ProbabilityModel,
}

impl<'a> Predictor<'a> {
	/// Creates a predictor over a converted model.
	pub fn new(model: &'a ProbabilityModel) -> Self {
		Self { model }
	}

	/// Suggests up to `count` next words after the given context.
	///
	/// # Behavior
	/// - With two or more context words, tries the trigram row of the
	///   last two, falling back to the bigram row of the last word.
	/// - With one context word, uses its bigram row.
	/// - With no context, falls back to the unigram distribution.
	pub fn suggest_next(&self, context: &[&str], count: usize) -> Vec<(String, f64)> {
		match self.candidate_row(context) {
			Some(row) => ranked(row, count),
			None => {
				let mut entries: Vec<(String, f64)> = self
					.model
					.unigram_probs()
					.iter()
					.map(|(word, prob)| (word.to_owned(), prob))
					.collect();
				sort_ranked(&mut entries);
				entries.truncate(count);
				entries
			}
		}
	}

	/// Suggests up to `count` full words completing a typed prefix.
	///
	/// Prefixes shorter than 2 characters have no entries by
	/// construction and return nothing.
	pub fn complete(&self, prefix: &str, count: usize) -> Vec<(String, f64)> {
		let key = prefix.to_lowercase();
		match self.model.completion_probs().row(&key) {
			Some(row) => ranked(row, count),
			None => Vec::new(),
		}
	}

	/// Restores the most probable surface form of a lowercase-modeled
	/// word, falling back to the word as given.
	pub fn restore_case(&self, word: &str) -> String {
		let key = word.to_lowercase();
		let best = self.model.cap_pattern_probs().row(&key).and_then(|row| {
			row.iter()
				.max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
				.map(|(form, _)| form.clone())
		});
		best.unwrap_or_else(|| word.to_owned())
	}

	/// Draws a random next word after the given context, weighted by
	/// probability.
	///
	/// Uses the same candidate row as `suggest_next`; returns `None`
	/// when no row matches the context.
	pub fn sample_next(&self, context: &[&str]) -> Option<String> {
		let row = self.candidate_row(context)?;
		let total: f64 = row.values().sum();
		if total <= 0.0 {
			return None;
		}

		// Randomly select a word proportionally to its probability.
		let mut r = rand::rng().random_range(0.0..total);

		let mut fallback = None;
		for (word, prob) in row {
			if r < *prob {
				return Some(word.clone());
			}
			r -= prob;
			fallback = Some(word.clone());
		}

		// Fallback: should not happen, but kept for safety.
		fallback
	}

	/// Returns the successor probability row for a context, applying
	/// trigram-to-bigram backoff.
	fn candidate_row(&self, context: &[&str]) -> Option<&BTreeMap<String, f64>> {
		if context.len() >= 2 {
			let first = context[context.len() - 2].to_lowercase();
			let second = context[context.len() - 1].to_lowercase();
			let key = format!("{} {}", first, second);
			if let Some(row) = self.model.trigram_probs().row(&key) {
				return Some(row);
			}
		}
		let last = context.last()?.to_lowercase();
		self.model.bigram_probs().row(&last)
	}
}

/// Ranks one probability row: probability descending, ties by word.
fn ranked(row: &BTreeMap<String, f64>, count: usize) -> Vec<(String, f64)> {
	let mut entries: Vec<(String, f64)> = row
		.iter()
		.map(|(word, prob)| (word.clone(), *prob))
		.collect();
	sort_ranked(&mut entries);
	entries.truncate(count);
	entries
}

fn sort_ranked(entries: &mut [(String, f64)]) {
	entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}
