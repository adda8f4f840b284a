use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalizes a word for storage or lookup: surrounding whitespace is
/// removed and the result is lowercased.
pub fn normalize(word: &str) -> String {
	word.trim().to_lowercase()
}

/// Outcome of [`SynonymMap::add_pair`].
///
/// Synonymy is symmetric, so a single pair touches two directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairAddition {
	/// `word -> synonym` was newly inserted.
	pub forward: bool,
	/// `synonym -> word` was newly inserted.
	pub backward: bool,
}

impl PairAddition {
	/// Returns `true` if at least one direction was newly added.
	pub fn is_new(&self) -> bool {
		self.forward || self.backward
	}
}

/// Mapping from a lowercase word to its ordered list of lowercase synonyms.
///
/// # Invariants
/// - Keys and synonyms are normalized (see [`normalize`])
/// - No word lists itself as a synonym
/// - A synonym list never contains duplicates
///
/// Keys are kept sorted; the order of synonyms within a list is insertion order.
///
/// Serializes as a plain JSON object, which is also the persisted file format.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SynonymMap {
	entries: BTreeMap<String, Vec<String>>,
}

impl SynonymMap {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a map from raw, possibly un-normalized entries.
	///
	/// Keys colliding after lowercasing are merged in key order, duplicated
	/// synonyms and self references are dropped. Entries are one-directional:
	/// no symmetric counterpart is created.
	pub fn from_raw(raw: BTreeMap<String, Vec<String>>) -> Self {
		let mut map = Self::new();
		for (word, synonyms) in raw {
			let word = normalize(&word);
			if word.is_empty() {
				continue;
			}
			let list = map.entries.entry(word.clone()).or_default();
			for synonym in synonyms {
				let synonym = normalize(&synonym);
				if !synonym.is_empty() && synonym != word && !list.contains(&synonym) {
					list.push(synonym);
				}
			}
		}
		map
	}

	/// Returns the synonyms stored for `word`, after normalization.
	///
	/// Returns an empty slice if the word is unknown.
	pub fn synonyms_of(&self, word: &str) -> &[String] {
		self.entries
			.get(&normalize(word))
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Returns `true` if `word` has an entry (possibly empty).
	pub fn contains(&self, word: &str) -> bool {
		self.entries.contains_key(&normalize(word))
	}

	/// Inserts `word -> synonym` and `synonym -> word`.
	///
	/// - Both strings are normalized first
	/// - Existing directions are left untouched
	/// - A pair whose sides are equal (or empty) is a no-op
	pub fn add_pair(&mut self, word: &str, synonym: &str) -> PairAddition {
		let word = normalize(word);
		let synonym = normalize(synonym);
		if word.is_empty() || synonym.is_empty() || word == synonym {
			return PairAddition::default();
		}

		PairAddition {
			forward: self.push_unique(&word, &synonym),
			backward: self.push_unique(&synonym, &word),
		}
	}

	/// Appends `synonym` to the list of `word` if missing.
	fn push_unique(&mut self, word: &str, synonym: &str) -> bool {
		let list = self.entries.entry(word.to_owned()).or_default();
		if list.iter().any(|s| s == synonym) {
			return false;
		}
		list.push(synonym.to_owned());
		true
	}

	/// Inserts every entry of `defaults` whose key is absent from this map.
	///
	/// Entries already present, learned or not, are never overwritten.
	/// Returns the number of inserted keys.
	pub fn merge_defaults(&mut self, defaults: &SynonymMap) -> usize {
		let mut inserted = 0;
		for (word, synonyms) in &defaults.entries {
			if !self.entries.contains_key(word) {
				self.entries.insert(word.clone(), synonyms.clone());
				inserted += 1;
			}
		}
		inserted
	}

	/// Iterates entries in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
	}

	/// Number of words with an entry.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<W, S, I> FromIterator<(W, I)> for SynonymMap
where
	W: AsRef<str>,
	S: AsRef<str>,
	I: IntoIterator<Item = S>,
{
	/// Collects raw `(word, synonyms)` entries through [`SynonymMap::from_raw`].
	fn from_iter<T: IntoIterator<Item = (W, I)>>(iter: T) -> Self {
		let raw = iter
			.into_iter()
			.map(|(word, synonyms)| {
				let list = synonyms.into_iter().map(|s| s.as_ref().to_owned()).collect();
				(word.as_ref().to_owned(), list)
			})
			.collect();
		Self::from_raw(raw)
	}
}

/// Synonyms added during the most recent batch-learn run, per word.
///
/// Used for reporting only; never persisted.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct LearningDelta {
	added: BTreeMap<String, Vec<String>>,
}

impl LearningDelta {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the directions reported by `addition` for the normalized pair.
	pub fn record(&mut self, word: &str, synonym: &str, addition: PairAddition) {
		if addition.forward {
			self.added.entry(normalize(word)).or_default().push(normalize(synonym));
		}
		if addition.backward {
			self.added.entry(normalize(synonym)).or_default().push(normalize(word));
		}
	}

	/// Returns the synonyms newly added for `word` in the last run.
	pub fn added_for(&self, word: &str) -> &[String] {
		self.added.get(&normalize(word)).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.added.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
	}

	pub fn is_empty(&self) -> bool {
		self.added.is_empty()
	}

	pub fn clear(&mut self) {
		self.added.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_pair_is_symmetric() {
		let mut map = SynonymMap::new();
		let added = map.add_pair("Happy", "JOYFUL");

		assert_eq!(added, PairAddition { forward: true, backward: true });
		assert_eq!(map.synonyms_of("happy"), ["joyful"]);
		assert_eq!(map.synonyms_of("joyful"), ["happy"]);
	}

	#[test]
	fn add_pair_is_idempotent() {
		let mut once = SynonymMap::new();
		once.add_pair("big", "large");

		let mut twice = SynonymMap::new();
		twice.add_pair("big", "large");
		let second = twice.add_pair("BIG", " large ");

		assert!(!second.is_new());
		assert_eq!(once, twice);
	}

	#[test]
	fn add_pair_reports_only_missing_direction() {
		let mut map: SynonymMap = [("go", vec!["travel"])].into_iter().collect();
		let added = map.add_pair("go", "travel");

		assert_eq!(added, PairAddition { forward: false, backward: true });
		assert_eq!(map.synonyms_of("travel"), ["go"]);
	}

	#[test]
	fn self_pair_is_rejected() {
		let mut map = SynonymMap::new();
		assert!(!map.add_pair("Same", "same").is_new());
		assert!(map.is_empty());
	}

	#[test]
	fn lookup_is_case_insensitive() {
		let map: SynonymMap = [("make", vec!["create"])].into_iter().collect();
		assert_eq!(map.synonyms_of("MAKE"), ["create"]);
		assert!(map.synonyms_of("unknown").is_empty());
	}

	#[test]
	fn from_raw_normalizes_and_drops_self_references() {
		let mut raw = BTreeMap::new();
		raw.insert("Big".to_owned(), vec!["LARGE".to_owned(), "big".to_owned()]);
		raw.insert("big".to_owned(), vec!["large".to_owned(), "huge".to_owned()]);

		let map = SynonymMap::from_raw(raw);

		assert_eq!(map.len(), 1);
		assert_eq!(map.synonyms_of("big"), ["large", "huge"]);
	}

	#[test]
	fn merge_defaults_never_overwrites() {
		let mut map: SynonymMap = [("make", vec!["forge"])].into_iter().collect();
		let defaults: SynonymMap = [("make", vec!["create"]), ("say", vec!["state"])].into_iter().collect();

		assert_eq!(map.merge_defaults(&defaults), 1);
		assert_eq!(map.synonyms_of("make"), ["forge"]);
		assert_eq!(map.synonyms_of("say"), ["state"]);
	}

	#[test]
	fn delta_records_new_directions() {
		let mut delta = LearningDelta::new();
		delta.record("Go", "move", PairAddition { forward: false, backward: true });

		assert!(delta.added_for("go").is_empty());
		assert_eq!(delta.added_for("move"), ["go"]);
	}
}
