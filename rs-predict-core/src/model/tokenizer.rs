/// Capitalization role assigned to a token from its surface form and
/// its position within the sentence.
///
/// # Variants
/// - `Abbreviation`: fully uppercase, at least 2 characters (ex. "USA").
/// - `ProperNoun`: capitalized word that is not sentence-initial (ex. "Paris").
/// - `SentenceInitial`: first word of a sentence; its casing carries no
///   information and is never learned from.
/// - `Plain`: anything else, recorded as typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseClass {
	Abbreviation,
	ProperNoun,
	SentenceInitial,
	Plain,
}

/// A single word token produced from one corpus line.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
	/// The surface form as typed, punctuation stripped.
	pub surface: String,
	/// The lowercased form used as the modeling key.
	pub lower: String,
	/// The capitalization role of this occurrence.
	pub class: CaseClass,
}

/// Splits corpus lines into classified word tokens while tracking
/// sentence boundaries across lines.
///
/// # Responsibilities
/// - Strip punctuation and split lines into word tokens
/// - Discard blank lines and mostly-uppercase lines (headers, shouting)
/// - Classify each token's capitalization role
/// - Track whether the next line starts a new sentence
///
/// # Invariants
/// - Produced tokens are never empty strings
/// - A discarded line always forces sentence-start for the next line
#[derive(Clone, Debug, PartialEq)]
pub struct LineTokenizer {
	sentence_start: bool,
}

impl Default for LineTokenizer {
	fn default() -> Self {
		Self::new()
	}
}

impl LineTokenizer {
	/// Creates a tokenizer positioned at the start of a corpus.
	pub fn new() -> Self {
		Self { sentence_start: true }
	}

	/// Returns true if the next token at position 0 starts a sentence.
	pub fn at_sentence_start(&self) -> bool {
		self.sentence_start
	}

	/// Tokenizes one raw corpus line into classified tokens.
	///
	/// # Behavior
	/// - A blank line yields no tokens and forces sentence-start.
	/// - A line whose alphabetic characters are more than 50% uppercase
	///   is treated as non-natural text: it yields no tokens and forces
	///   sentence-start.
	/// - Otherwise every character that is neither alphanumeric, `_`
	///   nor whitespace is stripped, the remainder splits on
	///   whitespace, and empty fragments are dropped.
	/// - A line that strips to zero tokens leaves the sentence-start
	///   state untouched.
	/// - After a tokenized line, sentence-start is set for the next
	///   line iff the final raw word ends with `.`, `!` or `?`.
	///   The raw word is inspected because stripping removes the very
	///   characters that mark the boundary.
	///
	/// # Notes
	/// - UTF-8 safe: operates on characters, not bytes.
	pub fn tokenize(&mut self, line: &str) -> Vec<Token> {
		let line = line.trim();
		if line.is_empty() {
			self.sentence_start = true;
			return Vec::new();
		}

		if is_mostly_caps(line) {
			self.sentence_start = true;
			return Vec::new();
		}

		let mut tokens = Vec::new();
		let mut ends_sentence = false;
		for raw_word in line.split_whitespace() {
			let surface: String = raw_word
				.chars()
				.filter(|c| c.is_alphanumeric() || *c == '_')
				.collect();
			ends_sentence = matches!(raw_word.chars().last(), Some('.' | '!' | '?'));
			if surface.is_empty() {
				continue;
			}

			let position = tokens.len();
			let class = classify(&surface, position == 0 && self.sentence_start);
			let lower = surface.to_lowercase();
			tokens.push(Token { surface, lower, class });
		}

		if tokens.is_empty() {
			return tokens;
		}

		self.sentence_start = ends_sentence;
		tokens
	}
}

/// Classifies a stripped token from its surface form and whether it
/// opens a sentence.
///
/// Abbreviations win over every other class, including sentence-initial
/// position: "NASA said" still records "NASA" as an abbreviation.
fn classify(surface: &str, sentence_initial: bool) -> CaseClass {
	if is_abbreviation(surface) {
		CaseClass::Abbreviation
	} else if is_proper_noun_shape(surface) && !sentence_initial {
		CaseClass::ProperNoun
	} else if sentence_initial {
		CaseClass::SentenceInitial
	} else {
		CaseClass::Plain
	}
}

/// Returns true if more than 50% of the line's alphabetic characters
/// are uppercase.
///
/// Lines without any alphabetic character are not considered
/// mostly-uppercase.
fn is_mostly_caps(line: &str) -> bool {
	let mut letters: u32 = 0;
	let mut uppercase: u32 = 0;
	for c in line.chars() {
		if c.is_alphabetic() {
			letters += 1;
			if c.is_uppercase() {
				uppercase += 1;
			}
		}
	}
	letters > 0 && uppercase * 2 > letters
}

/// Returns true if the token is a likely abbreviation: at least 2
/// characters, at least one cased character, and no lowercase one.
fn is_abbreviation(token: &str) -> bool {
	let mut chars = 0;
	let mut has_cased = false;
	for c in token.chars() {
		chars += 1;
		if c.is_lowercase() {
			return false;
		}
		if c.is_uppercase() {
			has_cased = true;
		}
	}
	chars >= 2 && has_cased
}

/// Returns true if the token is shaped like a proper noun: uppercase
/// first character, at least one lowercase and no uppercase character
/// in the remainder, length > 1.
fn is_proper_noun_shape(token: &str) -> bool {
	let mut chars = token.chars();
	let first = match chars.next() {
		Some(c) => c,
		None => return false,
	};
	if !first.is_uppercase() {
		return false;
	}
	let mut has_lowercase = false;
	let mut rest_len = 0;
	for c in chars {
		rest_len += 1;
		if c.is_uppercase() {
			return false;
		}
		if c.is_lowercase() {
			has_lowercase = true;
		}
	}
	rest_len >= 1 && has_lowercase
}

/// Returns the capitalized form of a lowercased word: first character
/// uppercased, remainder unchanged.
pub(crate) fn capitalize(lower: &str) -> String {
	let mut chars = lower.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn classes(tokenizer: &mut LineTokenizer, line: &str) -> Vec<(String, CaseClass)> {
		tokenizer
			.tokenize(line)
			.into_iter()
			.map(|t| (t.surface, t.class))
			.collect()
	}

	#[test]
	fn test_scenario_line_classification() {
		let mut tokenizer = LineTokenizer::new();
		let tokens = tokenizer.tokenize("The Quick fox JUMPS over the lazy dog.");
		let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
		assert_eq!(
			surfaces,
			vec!["The", "Quick", "fox", "JUMPS", "over", "the", "lazy", "dog"]
		);
		assert_eq!(tokens[0].class, CaseClass::SentenceInitial);
		assert_eq!(tokens[1].class, CaseClass::ProperNoun);
		assert_eq!(tokens[2].class, CaseClass::Plain);
		assert_eq!(tokens[3].class, CaseClass::Abbreviation);
		assert_eq!(tokens[7].lower, "dog");
		// The trailing period starts a new sentence on the next line.
		assert!(tokenizer.at_sentence_start());
	}

	#[test]
	fn test_mostly_caps_line_is_skipped() {
		let mut tokenizer = LineTokenizer::new();
		tokenizer.tokenize("some words here");
		assert!(!tokenizer.at_sentence_start());
		assert!(tokenizer.tokenize("CHAPTER ONE").is_empty());
		assert!(tokenizer.at_sentence_start());
	}

	#[test]
	fn test_blank_line_forces_sentence_start() {
		let mut tokenizer = LineTokenizer::new();
		tokenizer.tokenize("no boundary yet");
		assert!(!tokenizer.at_sentence_start());
		assert!(tokenizer.tokenize("   ").is_empty());
		assert!(tokenizer.at_sentence_start());
	}

	#[test]
	fn test_proper_noun_requires_non_initial_position() {
		let mut tokenizer = LineTokenizer::new();
		// "Paris" opens a sentence: classified as sentence-initial.
		let tokens = classes(&mut tokenizer, "Paris is lovely");
		assert_eq!(tokens[0], ("Paris".to_owned(), CaseClass::SentenceInitial));
		// Mid-sentence on the next line (no boundary), position 0 is
		// no longer sentence-initial.
		let tokens = classes(&mut tokenizer, "Paris again");
		assert_eq!(tokens[0], ("Paris".to_owned(), CaseClass::ProperNoun));
	}

	#[test]
	fn test_abbreviation_wins_over_sentence_initial() {
		let mut tokenizer = LineTokenizer::new();
		let tokens = classes(&mut tokenizer, "NASA launched a rocket");
		assert_eq!(tokens[0], ("NASA".to_owned(), CaseClass::Abbreviation));
	}

	#[test]
	fn test_punctuation_only_fragments_are_dropped() {
		let mut tokenizer = LineTokenizer::new();
		let tokens = tokenizer.tokenize("- hello , world !");
		let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
		assert_eq!(surfaces, vec!["hello", "world"]);
		// Position 0 is "hello", the surviving first token.
		assert_eq!(tokens[0].class, CaseClass::SentenceInitial);
		// The trailing "!" fragment still marks a sentence boundary.
		assert!(tokenizer.at_sentence_start());
	}

	#[test]
	fn test_line_without_tokens_keeps_state() {
		let mut tokenizer = LineTokenizer::new();
		tokenizer.tokenize("mid sentence here");
		assert!(!tokenizer.at_sentence_start());
		assert!(tokenizer.tokenize("...").is_empty());
		assert!(!tokenizer.at_sentence_start());
	}

	#[test]
	fn test_shape_helpers() {
		assert!(is_abbreviation("USA"));
		assert!(is_abbreviation("A1B"));
		assert!(!is_abbreviation("U"));
		assert!(!is_abbreviation("12"));
		assert!(!is_abbreviation("Usa"));
		assert!(is_proper_noun_shape("Paris"));
		assert!(!is_proper_noun_shape("PARIS"));
		assert!(!is_proper_noun_shape("A1"));
		assert!(!is_proper_noun_shape("P"));
		assert!(!is_mostly_caps("1234 !!"));
		assert!(is_mostly_caps("AB c"));
		assert!(!is_mostly_caps("Ab cd"));
	}

	#[test]
	fn test_capitalize() {
		assert_eq!(capitalize("quick"), "Quick");
		assert_eq!(capitalize(""), "");
	}
}
