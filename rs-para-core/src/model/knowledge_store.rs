use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::io;
use super::synonym_map::{PairAddition, SynonymMap};

/// Default name of the persisted knowledge file.
pub const DEFAULT_KNOWLEDGE_FILE: &str = "synonym_knowledge.json";

/// Built-in synonyms merged into every store on open.
pub fn default_synonyms() -> SynonymMap {
	[
		("make", ["create", "construct", "build", "generate"]),
		("say", ["state", "mention", "declare", "express"]),
		("go", ["travel", "move", "proceed", "advance"]),
		("get", ["obtain", "receive", "acquire", "secure"]),
		("take", ["grab", "seize", "collect", "retrieve"]),
	]
		.into_iter()
		.collect()
}

/// Persisted, mutable synonym knowledge.
///
/// # Responsibilities
/// - Load the `SynonymMap` from its JSON file (missing file = empty store)
/// - Merge built-in defaults without touching learned entries
/// - Add symmetric synonym pairs
/// - Write the whole map back on demand (last write wins)
///
/// I/O failures never poison the in-memory map: they are returned to the
/// caller and the store keeps working.
#[derive(Debug)]
pub struct KnowledgeStore {
	synonyms: SynonymMap,
	path: Option<PathBuf>,
}

impl KnowledgeStore {
	/// Creates an empty store that is not backed by any file.
	///
	/// `persist` is a no-op for such a store.
	pub fn in_memory() -> Self {
		Self { synonyms: SynonymMap::new(), path: None }
	}

	/// Creates a store holding `synonyms`, backed by `path`.
	pub fn with_synonyms<P: AsRef<Path>>(path: P, synonyms: SynonymMap) -> Self {
		Self { synonyms, path: Some(path.as_ref().to_path_buf()) }
	}

	/// Opens the store backed by `path` and merges the built-in defaults.
	///
	/// A read or parse failure is returned next to the store, which then
	/// starts from the defaults only.
	pub fn open<P: AsRef<Path>>(path: P) -> (Self, Option<Error>) {
		let path = path.as_ref();
		let (synonyms, error) = match Self::load(path) {
			Ok(synonyms) => (synonyms, None),
			Err(e) => {
				warn!("{e}; starting with an empty knowledge store");
				(SynonymMap::new(), Some(e))
			}
		};

		let mut store = Self::with_synonyms(path, synonyms);
		let inserted = store.merge_defaults(&default_synonyms());
		debug!("Merged {inserted} default entries into the knowledge store");
		(store, error)
	}

	/// Reads and normalizes the knowledge file at `path`.
	///
	/// A missing file yields an empty map, not an error.
	///
	/// # Errors
	/// Returns `Error::StorageRead` if the file exists but cannot be read or
	/// is not a JSON object of string arrays.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<SynonymMap> {
		let path = path.as_ref();
		if !path.exists() {
			debug!("No knowledge file at {}, starting empty", path.display());
			return Ok(SynonymMap::new());
		}

		let content = fs::read_to_string(path).map_err(|e| Error::storage_read(path, e))?;
		let raw: BTreeMap<String, Vec<String>> =
			serde_json::from_str(&content).map_err(|e| Error::storage_read(path, e))?;

		let synonyms = SynonymMap::from_raw(raw);
		info!("Loaded {} knowledge entries from {}", synonyms.len(), path.display());
		Ok(synonyms)
	}

	/// Inserts every default entry whose key is absent.
	///
	/// Returns the number of inserted keys.
	pub fn merge_defaults(&mut self, defaults: &SynonymMap) -> usize {
		self.synonyms.merge_defaults(defaults)
	}

	/// Records `word` and `synonym` as synonyms of each other.
	///
	/// Both strings are lowercased. Nothing changes if the pair is known.
	pub fn add_synonym_pair(&mut self, word: &str, synonym: &str) -> PairAddition {
		let addition = self.synonyms.add_pair(word, synonym);
		if addition.is_new() {
			debug!("Learned pair ({word}, {synonym})");
		}
		addition
	}

	/// Writes the full map to the backing file, replacing its content.
	///
	/// # Errors
	/// Returns `Error::StorageWrite` if the write fails. The in-memory map
	/// is unaffected either way.
	pub fn persist(&self) -> Result<()> {
		match &self.path {
			Some(path) => {
				self.export(path)?;
				info!("Saved {} knowledge entries to {}", self.synonyms.len(), path.display());
				Ok(())
			}
			None => Ok(()),
		}
	}

	/// Dumps the current map to `path` in the persisted file format.
	///
	/// # Errors
	/// Returns `Error::StorageWrite` if the write fails.
	pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		io::write_pretty_json(path, &self.synonyms).map_err(|e| {
			let error = Error::storage_write(path, e);
			warn!("{error}");
			error
		})
	}

	/// Read-only view of the knowledge.
	pub fn synonyms(&self) -> &SynonymMap {
		&self.synonyms
	}

	/// Backing file, if any.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_file_opens_with_defaults_only() {
		let dir = tempfile::tempdir().unwrap();
		let (store, error) = KnowledgeStore::open(dir.path().join("knowledge.json"));

		assert!(error.is_none());
		assert_eq!(store.synonyms(), &default_synonyms());
	}

	#[test]
	fn corrupt_file_is_reported_and_replaced_by_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("knowledge.json");
		fs::write(&path, "{ not json").unwrap();

		let (store, error) = KnowledgeStore::open(&path);

		assert!(matches!(error, Some(Error::StorageRead { .. })));
		assert_eq!(store.synonyms().synonyms_of("make"), ["create", "construct", "build", "generate"]);
	}

	#[test]
	fn wrong_shape_is_a_read_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("knowledge.json");
		fs::write(&path, r#"{"make": "create"}"#).unwrap();

		assert!(matches!(KnowledgeStore::load(&path), Err(Error::StorageRead { .. })));
	}

	#[test]
	fn learned_entries_win_over_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("knowledge.json");
		fs::write(&path, r#"{"make": ["forge"]}"#).unwrap();

		let (store, error) = KnowledgeStore::open(&path);

		assert!(error.is_none());
		assert_eq!(store.synonyms().synonyms_of("make"), ["forge"]);
		assert_eq!(store.synonyms().synonyms_of("say"), ["state", "mention", "declare", "express"]);
	}

	#[test]
	fn persist_then_load_round_trips_order() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("knowledge.json");
		let (mut store, _) = KnowledgeStore::open(&path);
		store.add_synonym_pair("happy", "joyful");
		store.add_synonym_pair("happy", "cheerful");

		store.persist().unwrap();

		let loaded = KnowledgeStore::load(&path).unwrap();
		assert_eq!(&loaded, store.synonyms());
		assert_eq!(loaded.synonyms_of("happy"), ["joyful", "cheerful"]);
	}

	#[test]
	fn failed_persist_keeps_memory_state() {
		let dir = tempfile::tempdir().unwrap();
		// A directory cannot be replaced by the temporary file.
		let path = dir.path().join("occupied");
		fs::create_dir_all(path.join("child")).unwrap();
		let mut store = KnowledgeStore::with_synonyms(&path, SynonymMap::new());
		store.add_synonym_pair("big", "large");

		assert!(matches!(store.persist(), Err(Error::StorageWrite { .. })));
		assert_eq!(store.synonyms().synonyms_of("big"), ["large"]);
	}

	#[test]
	fn in_memory_store_persists_nowhere() {
		let mut store = KnowledgeStore::in_memory();
		store.add_synonym_pair("a", "b");
		assert!(store.persist().is_ok());
		assert!(store.path().is_none());
	}
}
