use std::path::Path;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::io::{build_output_path, read_file};
use super::tables::{CountTable, NestedTable};
use super::tokenizer::{capitalize, CaseClass, LineTokenizer};

/// The raw frequency model accumulated from a corpus.
///
/// This struct manages the five count tables of the pipeline:
/// - `unigrams`: lowercased word → occurrence count.
/// - `bigrams`: word → successor counts.
/// - `trigrams`: space-joined word pair → successor counts.
/// - `completions`: word prefix → surface-form counts.
/// - `cap_patterns`: lowercased word → observed surface-form weights.
///
/// Aggregation is a commutative, associative accumulation: merging two
/// models sums their counts key-wise, so a corpus can be split into
/// chunks, aggregated in parallel and merged afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawModel {
	unigrams: CountTable,
	bigrams: NestedTable,
	trigrams: NestedTable,
	completions: NestedTable,
	cap_patterns: NestedTable,
	sentences: u64,
	#[serde(skip)]
	tokenizer: LineTokenizer,
}

impl RawModel {
	/// Returns a default, empty `RawModel`.
	///
	/// All tables start empty and the tokenizer starts in
	/// sentence-start state, as at the beginning of a corpus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads a `RawModel` from a corpus file, using a binary cache if
	/// one exists.
	///
	/// - `filepath` is the input text file.
	/// - Checks if a binary file exists for fast loading.
	/// - Uses `postcard` for compact serialization/deserialization.
	/// - Calls `read_corpus_file` if the binary does not exist.
	pub fn from_corpus_file<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let binary_data_path = build_output_path(&filepath, "bin")?;
		if binary_data_path.exists() {
			let bytes = std::fs::read(binary_data_path)?;
			Ok(postcard::from_bytes(&bytes)?)
		} else {
			Self::read_corpus_file(&filepath, binary_data_path)
		}
	}

	/// Reads a corpus file, splits its lines into chunks, aggregates
	/// partial models in parallel, merges them into a final `RawModel`,
	/// and serializes it.
	///
	/// # Parameters
	/// - `filename`: Input text file.
	/// - `binary_data_path`: Output path for the serialized binary model.
	///
	/// # Returns
	/// - `Ok(RawModel)`: The merged and serialized model.
	/// - `Err(...)`: If file I/O or serialization fails.
	///
	/// # Behavior
	/// - Splits input lines into chunks (based on CPU cores * factor).
	/// - Spawns threads aggregating a partial model per chunk.
	/// - Merges all partial models sequentially.
	/// - Serializes the final model to `binary_data_path` for future fast loading.
	///
	/// # Notes
	/// - Uses MPSC channels to collect models from threads.
	/// - Each chunk starts in sentence-start state, like the corpus start.
	fn read_corpus_file<PF, PB>(filename: PF, binary_data_path: PB) -> Result<RawModel, Box<dyn std::error::Error>>
	where
		PF: AsRef<Path>,
		PB: AsRef<Path>,
	{
		let lines = read_file(&filename)?;
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = ((lines.len() + chunks - 1) / chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial_model = RawModel::new();
				for line in chunk {
					partial_model.observe_line(&line);
				}
				tx.send(partial_model).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut final_model = RawModel::new();
		for partial_model in rx.iter() {
			final_model.merge(&partial_model);
		}

		let bytes = postcard::to_stdvec(&final_model)?;
		std::fs::write(binary_data_path, bytes)?;

		Ok(final_model)
	}

	/// Feeds one raw corpus line into the model.
	///
	/// # Behavior
	/// - Tokenizes and classifies the line; blank, mostly-uppercase and
	///   punctuation-only lines contribute nothing.
	/// - Walks tokens left to right updating all five tables.
	/// - Counts the line as one sentence if it produced tokens.
	pub fn observe_line(&mut self, line: &str) {
		let tokens = self.tokenizer.tokenize(line);
		if tokens.is_empty() {
			return;
		}

		for token in &tokens {
			self.unigrams.add(&token.lower, 1);

			match token.class {
				CaseClass::Abbreviation => {
					// Force uppercase for abbreviations, higher weight.
					self.cap_patterns.add(&token.lower, &token.surface.to_uppercase(), 3);
				}
				CaseClass::ProperNoun => {
					// The capitalized form dominates, but the word also
					// occurs uncapitalized.
					self.cap_patterns.add(&token.lower, &capitalize(&token.lower), 2);
					self.cap_patterns.add(&token.lower, &token.lower, 1);
				}
				CaseClass::SentenceInitial => {
					// Sentence-initial casing is positional, not lexical.
				}
				CaseClass::Plain => {
					self.cap_patterns.add(&token.lower, &token.surface, 1);
				}
			}

			let (completion_form, completion_weight) = match token.class {
				CaseClass::Abbreviation => (token.surface.to_uppercase(), 2),
				CaseClass::SentenceInitial => (token.lower.clone(), 1),
				CaseClass::ProperNoun | CaseClass::Plain => (token.surface.clone(), 1),
			};
			// Every proper prefix of the lowercased token, by characters.
			for (byte_index, _) in token.lower.char_indices().skip(1) {
				self.completions
					.add(&token.lower[..byte_index], &completion_form, completion_weight);
			}
		}

		let lowers: Vec<&str> = tokens.iter().map(|t| t.lower.as_str()).collect();
		for pair in lowers.windows(2) {
			self.bigrams.add(pair[0], pair[1], 1);
		}
		for triple in lowers.windows(3) {
			self.trigrams
				.add(&format!("{} {}", triple[0], triple[1]), triple[2], 1);
		}

		self.sentences += 1;
	}

	/// Merges another `RawModel` into this one.
	///
	/// # Behavior
	/// - Sums all five tables key-wise and adds the sentence counts.
	/// - The tokenizer state of `other` is not carried over; merging is
	///   a pure combination of accumulated counts.
	pub fn merge(&mut self, other: &Self) {
		self.unigrams.merge(&other.unigrams);
		self.bigrams.merge(&other.bigrams);
		self.trigrams.merge(&other.trigrams);
		self.completions.merge(&other.completions);
		self.cap_patterns.merge(&other.cap_patterns);
		self.sentences += other.sentences;
	}

	/// Rebuilds a model from five already-aggregated tables.
	///
	/// Used by the artifact loader; the sentence counter is not part of
	/// the persisted artifacts and restarts at zero.
	pub(crate) fn from_tables(
		unigrams: CountTable,
		bigrams: NestedTable,
		trigrams: NestedTable,
		completions: NestedTable,
		cap_patterns: NestedTable,
	) -> Self {
		Self {
			unigrams,
			bigrams,
			trigrams,
			completions,
			cap_patterns,
			sentences: 0,
			tokenizer: LineTokenizer::new(),
		}
	}

	/// Unigram counts (lowercased word → count).
	pub fn unigrams(&self) -> &CountTable {
		&self.unigrams
	}

	/// Bigram counts (word → successor counts).
	pub fn bigrams(&self) -> &NestedTable {
		&self.bigrams
	}

	/// Trigram counts (space-joined word pair → successor counts).
	pub fn trigrams(&self) -> &NestedTable {
		&self.trigrams
	}

	/// Completion counts (prefix → surface-form counts).
	pub fn completions(&self) -> &NestedTable {
		&self.completions
	}

	/// Capitalization counts (lowercased word → surface-form weights).
	pub fn cap_patterns(&self) -> &NestedTable {
		&self.cap_patterns
	}

	/// Number of sentences that contributed tokens.
	pub fn sentences(&self) -> u64 {
		self.sentences
	}
}
