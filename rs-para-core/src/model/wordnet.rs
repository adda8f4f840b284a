use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use super::lexicon::LexicalDatabase;
use super::synonym_map::normalize;

/// Part of speech of a synset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
	Noun,
	Verb,
	Adjective,
	Adverb,
}

impl PartOfSpeech {
	/// Lookup order.
	pub const ALL: [PartOfSpeech; 4] = [Self::Noun, Self::Verb, Self::Adjective, Self::Adverb];

	/// Parses the `ss_type` field of a data line. Satellite adjectives (`s`)
	/// are adjectives.
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"n" => Some(Self::Noun),
			"v" => Some(Self::Verb),
			"a" | "s" => Some(Self::Adjective),
			"r" => Some(Self::Adverb),
			_ => None,
		}
	}

	/// Base name shared by the `data.*` and `*.exc` files.
	fn file_stem(self) -> &'static str {
		match self {
			Self::Noun => "noun",
			Self::Verb => "verb",
			Self::Adjective => "adj",
			Self::Adverb => "adv",
		}
	}

	/// Inflection detachment rules, `(suffix, replacement)`.
	fn suffix_rules(self) -> &'static [(&'static str, &'static str)] {
		match self {
			Self::Noun => &[
				("s", ""),
				("ses", "s"),
				("ves", "f"),
				("xes", "x"),
				("zes", "z"),
				("ches", "ch"),
				("shes", "sh"),
				("men", "man"),
				("ies", "y"),
			],
			Self::Verb => &[
				("s", ""),
				("ies", "y"),
				("es", "e"),
				("es", ""),
				("ed", "e"),
				("ed", ""),
				("ing", "e"),
				("ing", ""),
			],
			Self::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
			Self::Adverb => &[],
		}
	}
}

/// One synset: its part of speech and lemmas, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synset {
	pub pos: PartOfSpeech,
	pub lemmas: Vec<String>,
}

impl Synset {
	pub fn new<I, S>(pos: PartOfSpeech, lemmas: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { pos, lemmas: lemmas.into_iter().map(Into::into).collect() }
	}
}

/// In-memory WordNet synset table loaded from a `dict/` directory.
///
/// Only the lemma lists of each synset are kept; pointers and glosses are
/// dropped. Inflected words are reduced to their base forms before lookup,
/// using the `*.exc` exception lists first and the suffix rules of each part
/// of speech otherwise: `dogs` finds the senses of `dog`.
#[derive(Debug, Default)]
pub struct WordNet {
	synsets: Vec<Synset>,
	/// Lowercase lemma → indices into `synsets`.
	index: HashMap<String, Vec<usize>>,
	/// Irregular inflection → base forms, per part of speech.
	exceptions: HashMap<PartOfSpeech, HashMap<String, Vec<String>>>,
}

impl WordNet {
	/// Loads every `data.*` file found in `dir`, and the matching `*.exc`
	/// exception lists when present.
	///
	/// # Errors
	/// Returns `Error::LexiconUnavailable` if `dir` is not a directory, holds
	/// no data file, a file cannot be read, or no synset was found.
	pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
		let dir = dir.as_ref();
		if !dir.is_dir() {
			return Err(Error::LexiconUnavailable(format!("{} is not a directory", dir.display())));
		}

		let mut synsets = Vec::new();
		let mut exceptions = HashMap::new();
		let mut found = false;
		for pos in PartOfSpeech::ALL {
			let path = dir.join(format!("data.{}", pos.file_stem()));
			if !path.is_file() {
				debug!("WordNet file {} not found, skipping", path.display());
				continue;
			}
			found = true;
			read_lines(&path, |line| synsets.extend(parse_synset(line)))?;

			let path = dir.join(format!("{}.exc", pos.file_stem()));
			if path.is_file() {
				let mut table: HashMap<String, Vec<String>> = HashMap::new();
				read_lines(&path, |line| {
					let mut words = line.split_whitespace();
					if let Some(inflected) = words.next() {
						table.entry(inflected.to_owned()).or_default().extend(words.map(str::to_owned));
					}
				})?;
				exceptions.insert(pos, table);
			}
		}

		if !found {
			return Err(Error::LexiconUnavailable(format!("no WordNet data files in {}", dir.display())));
		}
		if synsets.is_empty() {
			return Err(Error::LexiconUnavailable(format!("no synsets found in {}", dir.display())));
		}

		let mut wordnet = Self::from_synsets(synsets);
		wordnet.exceptions = exceptions;
		info!("Loaded {} WordNet synsets from {}", wordnet.synsets.len(), dir.display());
		Ok(wordnet)
	}

	/// Builds a table from already-parsed synsets, without exception lists.
	pub fn from_synsets(synsets: Vec<Synset>) -> Self {
		let mut index: HashMap<String, Vec<usize>> = HashMap::new();
		for (id, synset) in synsets.iter().enumerate() {
			for lemma in &synset.lemmas {
				let ids = index.entry(lemma.to_lowercase()).or_default();
				if ids.last() != Some(&id) {
					ids.push(id);
				}
			}
		}
		Self { synsets, index, exceptions: HashMap::new() }
	}

	/// Number of synsets loaded.
	pub fn len(&self) -> usize {
		self.synsets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.synsets.is_empty()
	}

	/// Base forms of `word` that exist as `pos` lemmas.
	///
	/// An exception entry takes precedence over the suffix rules. The word
	/// itself counts as a base form when it is a lemma.
	pub fn base_forms(&self, word: &str, pos: PartOfSpeech) -> Vec<String> {
		let mut forms = vec![word.to_owned()];
		match self.exceptions.get(&pos).and_then(|table| table.get(word)) {
			Some(bases) => forms.extend(bases.iter().cloned()),
			None => {
				for (suffix, replacement) in pos.suffix_rules() {
					if let Some(stem) = word.strip_suffix(suffix) {
						forms.push(format!("{stem}{replacement}"));
					}
				}
			}
		}

		let mut known: Vec<String> = Vec::new();
		for form in forms {
			if !known.contains(&form) && self.synset_ids(&form, pos).next().is_some() {
				known.push(form);
			}
		}
		known
	}

	fn synset_ids<'a>(&'a self, lemma: &str, pos: PartOfSpeech) -> impl Iterator<Item = usize> + 'a {
		self.index
			.get(lemma)
			.into_iter()
			.flatten()
			.copied()
			.filter(move |&id| self.synsets[id].pos == pos)
	}
}

impl LexicalDatabase for WordNet {
	fn related_lemmas(&self, word: &str) -> Vec<String> {
		let key = normalize(word).replace(' ', "_");
		let mut ids = Vec::new();
		for pos in PartOfSpeech::ALL {
			for form in self.base_forms(&key, pos) {
				for id in self.synset_ids(&form, pos) {
					if !ids.contains(&id) {
						ids.push(id);
					}
				}
			}
		}
		ids.into_iter()
			.flat_map(|id| self.synsets[id].lemmas.iter().cloned())
			.collect()
	}
}

/// Feeds every line of `path` to `f`.
fn read_lines<F: FnMut(&str)>(path: &Path, mut f: F) -> Result<()> {
	let unavailable = |e: std::io::Error| Error::LexiconUnavailable(format!("{}: {e}", path.display()));
	let file = File::open(path).map_err(unavailable)?;
	for line in BufReader::new(file).lines() {
		f(&line.map_err(unavailable)?);
	}
	Ok(())
}

/// Extracts the synset of one data-file line.
///
/// Line layout: `offset lex_filenum ss_type w_cnt word lex_id [word lex_id...] ... | gloss`,
/// `w_cnt` being two hexadecimal digits. License lines start with a space.
/// Adjective lemmas may carry a syntactic marker such as `(p)`, which is
/// removed.
fn parse_synset(line: &str) -> Option<Synset> {
	if line.starts_with(' ') || line.trim().is_empty() {
		return None;
	}

	let data = line.split('|').next()?;
	let fields: Vec<&str> = data.split_whitespace().collect();
	let pos = PartOfSpeech::from_tag(fields.get(2)?)?;
	let count = usize::from_str_radix(fields.get(3)?, 16).ok()?;

	let mut lemmas = Vec::with_capacity(count);
	for k in 0..count {
		let raw = fields.get(4 + 2 * k)?;
		let lemma = match raw.find('(') {
			Some(marker) if raw.ends_with(')') => &raw[..marker],
			_ => raw,
		};
		lemmas.push(lemma.to_owned());
	}
	Some(Synset { pos, lemmas })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	use crate::model::lexicon::{LexicalExpander, SimilarityExpander};

	const VERBS: &str = "  1 This software and database is being provided to you, the LICENSEE, by\n\
		01617192 36 v 04 make 0 create 0 produce 0 make_up 1 001 @ 01617192 v 0000 | make or cause to be\n\
		02560585 41 v 02 make 1 makes 0 000 | fictional sense\n\
		01835496 38 v 01 run 0 000 | move fast\n\
		not a synset line\n";

	const NOUNS: &str = "02084071 05 n 02 dog 0 domestic_dog 0 000 | a member of the genus Canis\n\
		09945905 18 n 01 man 0 000 | an adult person who is male\n\
		10285313 18 n 01 mouse 0 000 | a small rodent\n";

	const ADJECTIVES: &str = "00001740 00 a 02 able(p) 0 capable 0 000 | having the means\n";

	fn wordnet_in(dir: &Path) -> WordNet {
		fs::write(dir.join("data.verb"), VERBS).unwrap();
		fs::write(dir.join("data.noun"), NOUNS).unwrap();
		fs::write(dir.join("data.adj"), ADJECTIVES).unwrap();
		fs::write(dir.join("noun.exc"), "mice mouse\n").unwrap();
		fs::write(dir.join("verb.exc"), "ran run\n").unwrap();
		WordNet::open(dir).unwrap()
	}

	#[test]
	fn parses_lemmas_and_skips_noise() {
		assert_eq!(
			parse_synset("01617192 36 v 04 make 0 create 0 produce 0 make_up 1 001 @ 01617192 v 0000 | x"),
			Some(Synset::new(PartOfSpeech::Verb, ["make", "create", "produce", "make_up"]))
		);
		assert_eq!(parse_synset("  1 license text"), None);
		assert_eq!(parse_synset("garbage"), None);
	}

	#[test]
	fn strips_adjective_markers() {
		assert_eq!(parse_synset(ADJECTIVES.trim_end()), Some(Synset::new(PartOfSpeech::Adjective, ["able", "capable"])));
		assert_eq!(parse_synset("00002000 00 s 01 hot 0 000 | x").map(|s| s.pos), Some(PartOfSpeech::Adjective));
	}

	#[test]
	fn open_indexes_every_sense() {
		let dir = tempfile::tempdir().unwrap();
		let wordnet = wordnet_in(dir.path());

		assert_eq!(wordnet.len(), 7);
		assert_eq!(
			wordnet.related_lemmas("Make"),
			["make", "create", "produce", "make_up", "make", "makes"]
		);
		assert_eq!(wordnet.related_lemmas("make up"), ["make", "create", "produce", "make_up"]);
		assert_eq!(wordnet.related_lemmas("able"), ["able", "capable"]);
		assert!(wordnet.related_lemmas("unknown").is_empty());
	}

	#[test]
	fn inflected_words_find_their_base_senses() {
		let dir = tempfile::tempdir().unwrap();
		let wordnet = wordnet_in(dir.path());

		assert_eq!(wordnet.related_lemmas("dogs"), ["dog", "domestic_dog"]);
		assert_eq!(wordnet.related_lemmas("men"), ["man"]);
		assert_eq!(wordnet.related_lemmas("created"), ["make", "create", "produce", "make_up"]);
		assert_eq!(wordnet.base_forms("dogs", PartOfSpeech::Verb), Vec::<String>::new());
	}

	#[test]
	fn exceptions_override_suffix_rules() {
		let dir = tempfile::tempdir().unwrap();
		let wordnet = wordnet_in(dir.path());

		assert_eq!(wordnet.base_forms("mice", PartOfSpeech::Noun), ["mouse"]);
		assert_eq!(wordnet.related_lemmas("ran"), ["run"]);
	}

	#[test]
	fn expander_accepts_base_form_of_plural() {
		let dir = tempfile::tempdir().unwrap();
		let expander = SimilarityExpander::new(wordnet_in(dir.path()));

		assert_eq!(expander.expand("dogs").into_iter().collect::<Vec<_>>(), ["dog"]);
	}

	#[test]
	fn missing_database_is_unavailable() {
		let dir = tempfile::tempdir().unwrap();

		assert!(matches!(WordNet::open(dir.path().join("nope")), Err(Error::LexiconUnavailable(_))));
		assert!(matches!(WordNet::open(dir.path()), Err(Error::LexiconUnavailable(_))));
	}
}
