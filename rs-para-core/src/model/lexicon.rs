use std::collections::BTreeSet;

use log::debug;

use crate::error::{Error, Result};
use super::similarity;
use super::synonym_map::normalize;

/// Default minimum similarity ratio between a word and a lexicon candidate.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Source of extra synonym candidates consulted at paraphrase time.
///
/// Implementations must never fail: an unusable source returns no candidates.
pub trait LexicalExpander {
	/// Returns candidate replacements for `word`, lowercased.
	fn expand(&self, word: &str) -> BTreeSet<String>;
}

/// Expander used when no lexical database is installed or enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLexicon;

impl LexicalExpander for NoLexicon {
	fn expand(&self, _word: &str) -> BTreeSet<String> {
		BTreeSet::new()
	}
}

/// Raw access to a lexical database.
pub trait LexicalDatabase: Send {
	/// Returns every lemma sharing a sense with `word`, as stored
	/// (multi-word lemmas keep their `_` separator).
	fn related_lemmas(&self, word: &str) -> Vec<String>;
}

/// Expander filtering database lemmas by string similarity.
///
/// For a word `w`, a lemma is kept when, after replacing `_` by a space and
/// lowercasing, it:
/// - differs from `w`
/// - is purely alphabetic
/// - has a similarity ratio with `w` of at least `confidence`
///
/// The similarity filter approximates morphological relatedness only: it
/// says nothing about meaning.
pub struct SimilarityExpander {
	database: Box<dyn LexicalDatabase>,
	confidence: f64,
}

impl SimilarityExpander {
	/// Creates an expander over `database` with the default confidence.
	pub fn new<D: LexicalDatabase + 'static>(database: D) -> Self {
		Self { database: Box::new(database), confidence: DEFAULT_CONFIDENCE }
	}

	/// Returns the current confidence threshold.
	pub fn confidence(&self) -> f64 {
		self.confidence
	}

	/// Sets the confidence threshold (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_confidence(&mut self, confidence: f64) -> Result<()> {
		validate_confidence(confidence)?;
		self.confidence = confidence;
		Ok(())
	}

	/// Applies the normalization and similarity filter to one lemma.
	fn accept(&self, word: &str, lemma: &str) -> Option<String> {
		let candidate = lemma.replace('_', " ").to_lowercase();
		if candidate == word || candidate.is_empty() || !candidate.chars().all(char::is_alphabetic) {
			return None;
		}

		let score = similarity::ratio(word, &candidate);
		if score >= self.confidence {
			Some(candidate)
		} else {
			debug!("Rejected lexicon candidate {candidate:?} for {word:?} (ratio {score:.3})");
			None
		}
	}
}

impl LexicalExpander for SimilarityExpander {
	fn expand(&self, word: &str) -> BTreeSet<String> {
		let word = normalize(word);
		self.database
			.related_lemmas(&word)
			.iter()
			.filter_map(|lemma| self.accept(&word, lemma))
			.collect()
	}
}

impl std::fmt::Debug for SimilarityExpander {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SimilarityExpander")
			.field("database", &"<LexicalDatabase>")
			.field("confidence", &self.confidence)
			.finish()
	}
}

/// Checks that a confidence threshold lies in `[0.0, 1.0]`.
pub(crate) fn validate_confidence(confidence: f64) -> Result<()> {
	if !(0.0..=1.0).contains(&confidence) {
		return Err(Error::InvalidConfig(format!(
			"lexicon confidence must be between 0.0 and 1.0, got {confidence}"
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Fixed(Vec<&'static str>);

	impl LexicalDatabase for Fixed {
		fn related_lemmas(&self, _word: &str) -> Vec<String> {
			self.0.iter().map(|s| s.to_string()).collect()
		}
	}

	#[test]
	fn no_lexicon_is_empty() {
		assert!(NoLexicon.expand("make").is_empty());
	}

	#[test]
	fn quick_is_accepted_at_exact_threshold() {
		let mut expander = SimilarityExpander::new(Fixed(vec!["quick"]));
		expander.set_confidence(0.8).unwrap();

		assert_eq!(expander.expand("quack").into_iter().collect::<Vec<_>>(), ["quick"]);
	}

	#[test]
	fn quick_is_rejected_above_ratio() {
		let mut expander = SimilarityExpander::new(Fixed(vec!["quick"]));
		expander.set_confidence(0.81).unwrap();

		assert!(expander.expand("quack").is_empty());
	}

	#[test]
	fn candidates_are_normalized_and_filtered() {
		let mut expander = SimilarityExpander::new(Fixed(vec!["Make", "make_up", "Makes", "mak3", "create"]));
		expander.set_confidence(0.0).unwrap();

		let candidates = expander.expand("MAKE");

		// "make" equals the word, "make up" has a space, "mak3" a digit
		assert_eq!(candidates.into_iter().collect::<Vec<_>>(), ["create", "makes"]);
	}

	#[test]
	fn default_threshold_keeps_close_forms_only() {
		let expander = SimilarityExpander::new(Fixed(vec!["makes", "create"]));
		assert_eq!(expander.expand("make").into_iter().collect::<Vec<_>>(), ["makes"]);
	}

	#[test]
	fn confidence_out_of_range_is_rejected() {
		let mut expander = SimilarityExpander::new(Fixed(vec![]));
		assert!(expander.set_confidence(1.5).is_err());
		assert!(expander.set_confidence(-0.1).is_err());
		assert_eq!(expander.confidence(), DEFAULT_CONFIDENCE);
	}
}
