use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A one-level frequency table mapping a word to its occurrence count.
///
/// Conceptually this is the unigram table, but it is also used for the
/// surviving vocabulary after pruning.
///
/// ## Responsibilities
/// - Accumulate occurrence counts during learning
/// - Answer lookups with a default of zero for absent words
/// - Merge with another table by summing counts key-wise (parallel learning support)
///
/// ## Invariants
/// - Every stored count is strictly positive
/// - Iteration order is the lexicographic key order, making
///   serialization deterministic
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct CountTable {
	/// Occurrence counts indexed by word.
	counts: BTreeMap<String, u64>,
}

impl CountTable {
	/// Creates a new empty table.
	pub fn new() -> Self {
		Self { counts: BTreeMap::new() }
	}

	/// Records `weight` occurrences of `word`.
	///
	/// - If the word already exists, its count is increased.
	/// - Otherwise, a new entry is created.
	pub fn add(&mut self, word: &str, weight: u64) {
		*self.counts.entry(word.to_owned()).or_insert(0) += weight;
	}

	/// Returns the count of `word`, or 0 if it was never observed.
	pub fn get(&self, word: &str) -> u64 {
		self.counts.get(word).copied().unwrap_or(0)
	}

	/// Returns true if `word` has a recorded count.
	pub fn contains(&self, word: &str) -> bool {
		self.counts.contains_key(word)
	}

	/// Number of distinct words in the table.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	/// Returns true if the table holds no entries.
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Sum of all counts in the table.
	pub fn total(&self) -> u64 {
		self.counts.values().sum()
	}

	/// Iterates over `(word, count)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.counts.iter().map(|(word, count)| (word.as_str(), *count))
	}

	/// Merges another table into this one.
	///
	/// Counts for matching words are summed; missing words are copied.
	///
	/// This method is intended for parallel learning, where multiple
	/// partial tables are combined into a single one.
	pub fn merge(&mut self, other: &Self) {
		for (word, count) in &other.counts {
			*self.counts.entry(word.clone()).or_insert(0) += *count;
		}
	}
}

/// A two-level frequency table mapping an outer context key to an
/// inner successor table.
///
/// Used for bigrams (word → successors), trigrams (space-joined word
/// pair → successors), completions (prefix → surface forms) and
/// capitalization patterns (word → surface forms).
///
/// ## Invariants
/// - Every stored row is non-empty with strictly positive counts
///   (rows are created by incrementing)
/// - Iteration order is the lexicographic key order at both levels
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct NestedTable {
	/// Successor counts indexed by context key.
	rows: BTreeMap<String, BTreeMap<String, u64>>,
}

impl NestedTable {
	/// Creates a new empty table.
	pub fn new() -> Self {
		Self { rows: BTreeMap::new() }
	}

	/// Records `weight` occurrences of `successor` under `context`.
	pub fn add(&mut self, context: &str, successor: &str, weight: u64) {
		*self
			.rows
			.entry(context.to_owned())
			.or_default()
			.entry(successor.to_owned())
			.or_insert(0) += weight;
	}

	/// Returns the count of `successor` under `context`, or 0.
	pub fn get(&self, context: &str, successor: &str) -> u64 {
		self.rows
			.get(context)
			.and_then(|row| row.get(successor))
			.copied()
			.unwrap_or(0)
	}

	/// Returns the successor row for `context`, if any.
	pub fn row(&self, context: &str) -> Option<&BTreeMap<String, u64>> {
		self.rows.get(context)
	}

	/// Inserts a pre-built successor row under `context`.
	///
	/// Empty rows are ignored to preserve the non-empty-row invariant.
	pub fn insert_row(&mut self, context: &str, row: BTreeMap<String, u64>) {
		if !row.is_empty() {
			self.rows.insert(context.to_owned(), row);
		}
	}

	/// Number of distinct context keys.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	/// Returns true if the table holds no rows.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Iterates over `(context, successor row)` pairs in key order.
	pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, u64>)> {
		self.rows.iter().map(|(context, row)| (context.as_str(), row))
	}

	/// Merges another table into this one, summing successor counts.
	pub fn merge(&mut self, other: &Self) {
		for (context, row) in &other.rows {
			let target = self.rows.entry(context.clone()).or_default();
			for (successor, count) in row {
				*target.entry(successor.clone()).or_insert(0) += *count;
			}
		}
	}
}

/// A one-level probability table mapping a word to its probability.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ProbTable {
	probs: BTreeMap<String, f64>,
}

impl ProbTable {
	/// Creates a new empty table.
	pub fn new() -> Self {
		Self { probs: BTreeMap::new() }
	}

	/// Sets the probability of `word`.
	pub fn insert(&mut self, word: &str, prob: f64) {
		self.probs.insert(word.to_owned(), prob);
	}

	/// Returns the probability of `word`, if present.
	pub fn get(&self, word: &str) -> Option<f64> {
		self.probs.get(word).copied()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.probs.len()
	}

	/// Returns true if the table holds no entries.
	pub fn is_empty(&self) -> bool {
		self.probs.is_empty()
	}

	/// Iterates over `(word, probability)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.probs.iter().map(|(word, prob)| (word.as_str(), *prob))
	}
}

/// A two-level probability table mapping a context key to a
/// successor probability row.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct NestedProbTable {
	rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl NestedProbTable {
	/// Creates a new empty table.
	pub fn new() -> Self {
		Self { rows: BTreeMap::new() }
	}

	/// Sets the probability of `successor` under `context`.
	pub fn insert(&mut self, context: &str, successor: &str, prob: f64) {
		self.rows
			.entry(context.to_owned())
			.or_default()
			.insert(successor.to_owned(), prob);
	}

	/// Returns the successor probability row for `context`, if any.
	pub fn row(&self, context: &str) -> Option<&BTreeMap<String, f64>> {
		self.rows.get(context)
	}

	/// Number of distinct context keys.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	/// Returns true if the table holds no rows.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Iterates over `(context, successor row)` pairs in key order.
	pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
		self.rows.iter().map(|(context, row)| (context.as_str(), row))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_count_table_defaults_to_zero() {
		let mut table = CountTable::new();
		assert_eq!(table.get("missing"), 0);
		table.add("hello", 1);
		table.add("hello", 2);
		assert_eq!(table.get("hello"), 3);
		assert_eq!(table.total(), 3);
	}

	#[test]
	fn test_count_table_merge_sums() {
		let mut a = CountTable::new();
		a.add("the", 2);
		a.add("fox", 1);
		let mut b = CountTable::new();
		b.add("the", 3);
		b.add("dog", 1);
		a.merge(&b);
		assert_eq!(a.get("the"), 5);
		assert_eq!(a.get("fox"), 1);
		assert_eq!(a.get("dog"), 1);
		assert_eq!(a.len(), 3);
	}

	#[test]
	fn test_nested_table_accessors() {
		let mut table = NestedTable::new();
		assert_eq!(table.get("the", "fox"), 0);
		table.add("the", "fox", 1);
		table.add("the", "fox", 1);
		table.add("the", "dog", 1);
		assert_eq!(table.get("the", "fox"), 2);
		assert_eq!(table.row("the").map(|r| r.len()), Some(2));
		assert!(table.row("a").is_none());
	}

	#[test]
	fn test_nested_table_merge_sums() {
		let mut a = NestedTable::new();
		a.add("the", "fox", 1);
		let mut b = NestedTable::new();
		b.add("the", "fox", 2);
		b.add("lazy", "dog", 1);
		a.merge(&b);
		assert_eq!(a.get("the", "fox"), 3);
		assert_eq!(a.get("lazy", "dog"), 1);
	}

	#[test]
	fn test_nested_table_ignores_empty_rows() {
		let mut table = NestedTable::new();
		table.insert_row("the", BTreeMap::new());
		assert!(table.is_empty());
	}

	#[test]
	fn test_serialization_is_a_bare_map() {
		let mut table = CountTable::new();
		table.add("b", 2);
		table.add("a", 1);
		let json = serde_json::to_string(&table).unwrap();
		assert_eq!(json, r#"{"a":1,"b":2}"#);
	}
}
