use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use rand::Rng;
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use super::config::SubstitutionPolicy;
use super::lexicon::LexicalExpander;
use super::synonym_map::{normalize, SynonymMap};

/// Word tokens: runs of alphanumeric characters between word boundaries.
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word pattern"));

/// Splits `text` into word tokens.
///
/// Punctuation and whitespace are dropped, so rebuilding a text from its
/// tokens loses both.
pub fn tokenize(text: &str) -> Vec<&str> {
	WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Where a replacement came from.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
	/// The knowledge store (learned or default entries).
	Learned,
	/// Only the external lexical database offered it.
	ExternalLexicon,
}

/// One token substitution inside a variation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
	/// Token as typed by the user.
	pub original: String,
	/// Token written in its place.
	pub replacement: String,
	/// Zero-based index in the output token sequence.
	pub position: usize,
	pub provenance: Provenance,
}

/// One candidate output of a paraphrase request.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParaphraseVariation {
	tokens: Vec<String>,
	changes: Vec<ChangeRecord>,
}

impl ParaphraseVariation {
	/// Output tokens joined with single spaces.
	pub fn text(&self) -> String {
		self.tokens.join(" ")
	}

	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	/// Substitutions, in token order.
	pub fn changes(&self) -> &[ChangeRecord] {
		&self.changes
	}

	/// Returns the change made at `position`, if any.
	pub fn change_at(&self, position: usize) -> Option<&ChangeRecord> {
		self.changes.iter().find(|c| c.position == position)
	}
}

/// Replacement candidates of one token.
///
/// Learned candidates come first; `learned` is their count.
#[derive(Debug, Default)]
struct Candidates {
	words: Vec<String>,
	learned: usize,
}

impl Candidates {
	fn gather(word: &str, synonyms: &SynonymMap, lexicon: &dyn LexicalExpander) -> Self {
		let mut words: Vec<String> = synonyms
			.synonyms_of(word)
			.iter()
			.filter(|s| s.as_str() != word)
			.cloned()
			.collect();
		let learned = words.len();

		for candidate in lexicon.expand(word) {
			if candidate != word && !words.contains(&candidate) {
				words.push(candidate);
			}
		}

		Self { words, learned }
	}

	fn provenance(&self, index: usize) -> Provenance {
		if index < self.learned {
			Provenance::Learned
		} else {
			Provenance::ExternalLexicon
		}
	}
}

/// Randomised synonym substitution.
///
/// # Behavior
/// - Text is tokenized with [`tokenize`]
/// - Each token's candidates are the knowledge-store synonyms of its
///   lowercase form, followed by lexicon candidates not already listed
/// - The policy decides whether a token with candidates is replaced; the
///   replacement is drawn uniformly among the candidates
/// - A candidate offered by both sources counts as `Learned`
/// - Unchanged tokens keep the user's casing; replacements are lowercase
///   unless `preserve_case` is set
///
/// Randomness is injected by the caller, so a seeded generator gives
/// reproducible output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParaphraseEngine {
	policy: SubstitutionPolicy,
	preserve_case: bool,
}

impl ParaphraseEngine {
	pub fn new(policy: SubstitutionPolicy) -> Self {
		Self { policy, preserve_case: false }
	}

	pub fn with_preserve_case(mut self, preserve_case: bool) -> Self {
		self.preserve_case = preserve_case;
		self
	}

	pub fn policy(&self) -> SubstitutionPolicy {
		self.policy
	}

	/// Produces `variation_count` independent variations of `text`.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` if `variation_count` is zero.
	pub fn paraphrase<R: Rng + ?Sized>(
		&self,
		text: &str,
		variation_count: usize,
		synonyms: &SynonymMap,
		lexicon: &dyn LexicalExpander,
		rng: &mut R,
	) -> Result<Vec<ParaphraseVariation>> {
		if variation_count == 0 {
			return Err(Error::InvalidConfig("variation count must be at least 1".to_owned()));
		}

		let tokens = tokenize(text);

		// Candidates only depend on the word, compute them once per call
		let mut cache: HashMap<String, Candidates> = HashMap::new();
		for token in &tokens {
			let word = normalize(token);
			if !cache.contains_key(&word) {
				let candidates = Candidates::gather(&word, synonyms, lexicon);
				cache.insert(word, candidates);
			}
		}
		debug!("Paraphrasing {} tokens ({} distinct) into {variation_count} variations", tokens.len(), cache.len());

		let variations = (0..variation_count)
			.map(|_| self.variation(&tokens, &cache, rng))
			.collect();
		Ok(variations)
	}

	fn variation<R: Rng + ?Sized>(&self, tokens: &[&str], cache: &HashMap<String, Candidates>, rng: &mut R) -> ParaphraseVariation {
		let mut output = Vec::with_capacity(tokens.len());
		let mut changes = Vec::new();

		for (position, token) in tokens.iter().enumerate() {
			let considered = match self.policy {
				SubstitutionPolicy::Exhaustive => true,
				SubstitutionPolicy::Probabilistic { rate } => rng.random::<f64>() < rate,
			};

			let candidates = cache.get(&normalize(token));
			let chosen = match candidates {
				Some(c) if considered && !c.words.is_empty() => Some((c, rng.random_range(0..c.words.len()))),
				_ => None,
			};

			match chosen {
				Some((candidates, index)) => {
					let word = &candidates.words[index];
					let replacement = if self.preserve_case { match_case(token, word) } else { word.clone() };
					changes.push(ChangeRecord {
						original: (*token).to_owned(),
						replacement: replacement.clone(),
						position,
						provenance: candidates.provenance(index),
					});
					output.push(replacement);
				}
				None => output.push((*token).to_owned()),
			}
		}

		ParaphraseVariation { tokens: output, changes }
	}
}

/// Gives `replacement` the capitalisation shape of `original`.
///
/// - `ALL CAPS` (two letters or more) → uppercase
/// - `Capitalised` → first letter uppercase
/// - anything else → unchanged
fn match_case(original: &str, replacement: &str) -> String {
	let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
	if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
		return replacement.to_uppercase();
	}

	if original.chars().next().is_some_and(char::is_uppercase) {
		let mut chars = replacement.chars();
		return match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => String::new(),
		};
	}

	replacement.to_owned()
}
