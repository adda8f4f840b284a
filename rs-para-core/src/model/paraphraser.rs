use std::path::Path;

use log::{info, warn};
use rand::Rng;

use crate::error::{Error, Result};
use super::batch_learner::{BatchLearner, LearnFailure, LearnReport};
use super::config::{ParaphraserConfig, SubstitutionPolicy};
use super::engine::{ParaphraseEngine, ParaphraseVariation};
use super::knowledge_store::KnowledgeStore;
use super::lexicon::{validate_confidence, LexicalExpander, NoLexicon, SimilarityExpander};
use super::synonym_map::{LearningDelta, PairAddition, SynonymMap};
use super::wordnet::WordNet;

/// High-level paraphraser combining every component.
///
/// # Responsibilities
/// - Own the knowledge store and the batch learner
/// - Hold the optional lexicon and its runtime toggle
/// - Run the paraphrase engine against the current knowledge
///
/// Front-ends should only talk to this type. It is not synchronized: a
/// front-end serving several sessions must wrap it in a lock.
#[derive(Debug)]
pub struct Paraphraser {
	store: KnowledgeStore,
	learner: BatchLearner,
	lexicon: Option<SimilarityExpander>,
	use_lexicon: bool,
	engine: ParaphraseEngine,
}

impl Paraphraser {
	/// Creates a paraphraser from `config`.
	///
	/// # Behavior
	/// - Opens the knowledge file (defaults merged in)
	/// - Loads WordNet if `wordnet_dir` is set
	///
	/// Nothing here is fatal: a broken knowledge file or a missing lexicon
	/// is returned as a warning and the paraphraser runs with what is left.
	pub fn new(config: &ParaphraserConfig) -> (Self, Vec<Error>) {
		let mut warnings = Vec::new();

		let (store, error) = KnowledgeStore::open(&config.knowledge_file);
		warnings.extend(error);

		let lexicon = match &config.wordnet_dir {
			Some(dir) => match WordNet::open(dir) {
				Ok(wordnet) => {
					let mut expander = SimilarityExpander::new(wordnet);
					if let Err(e) = expander.set_confidence(config.lexicon_confidence()) {
						warn!("{e}; keeping confidence {}", expander.confidence());
						warnings.push(e);
					}
					Some(expander)
				}
				Err(e) => {
					warn!("{e}; continuing without lexicon");
					warnings.push(e);
					None
				}
			},
			None => None,
		};

		(Self::with_parts(store, lexicon, config), warnings)
	}

	/// Assembles a paraphraser from already-built parts.
	pub fn with_parts(store: KnowledgeStore, lexicon: Option<SimilarityExpander>, config: &ParaphraserConfig) -> Self {
		Self {
			store,
			learner: BatchLearner::new(),
			lexicon,
			use_lexicon: config.use_lexicon,
			engine: ParaphraseEngine::new(config.policy()).with_preserve_case(config.preserve_case),
		}
	}

	/// Produces `variation_count` variations of `text` using the thread RNG.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` if `variation_count` is zero.
	pub fn paraphrase(&self, text: &str, variation_count: usize) -> Result<Vec<ParaphraseVariation>> {
		self.paraphrase_with(text, variation_count, &mut rand::rng())
	}

	/// Same as [`Paraphraser::paraphrase`] with a caller-provided generator.
	pub fn paraphrase_with<R: Rng + ?Sized>(&self, text: &str, variation_count: usize, rng: &mut R) -> Result<Vec<ParaphraseVariation>> {
		self.engine.paraphrase(text, variation_count, self.store.synonyms(), self.expander(), rng)
	}

	/// Lexicon consulted by the engine: the loaded one when enabled.
	fn expander(&self) -> &dyn LexicalExpander {
		match &self.lexicon {
			Some(lexicon) if self.use_lexicon => lexicon as &dyn LexicalExpander,
			_ => &NoLexicon,
		}
	}

	/// Learns a CSV / TXT / TSV file, then saves the knowledge.
	pub fn learn_from_file<P: AsRef<Path>>(&mut self, path: P) -> std::result::Result<LearnReport, LearnFailure> {
		self.learner.learn_from_file(&mut self.store, path)
	}

	/// Learns every supported file of a directory, then saves the knowledge.
	pub fn learn_from_folder<P: AsRef<Path>>(&mut self, dir: P) -> std::result::Result<LearnReport, LearnFailure> {
		self.learner.learn_from_folder(&mut self.store, dir)
	}

	/// Adds one symmetric pair and saves the knowledge if it changed.
	///
	/// # Errors
	/// Returns `Error::StorageWrite` if saving fails; the pair stays learned.
	pub fn add_synonym_pair(&mut self, word: &str, synonym: &str) -> Result<PairAddition> {
		let addition = self.store.add_synonym_pair(word, synonym);
		if addition.is_new() {
			self.store.persist()?;
		}
		Ok(addition)
	}

	/// Synonyms added by the most recent batch learn.
	pub fn newly_added(&self) -> &LearningDelta {
		self.learner.newly_added()
	}

	/// Current knowledge, for inspection.
	pub fn knowledge(&self) -> &SynonymMap {
		self.store.synonyms()
	}

	/// Writes the current knowledge to `path` in the persisted format.
	pub fn export_knowledge<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		self.store.export(&path)?;
		info!("Knowledge exported to {}", path.as_ref().display());
		Ok(())
	}

	/// Returns `true` if a lexical database was loaded.
	pub fn has_lexicon(&self) -> bool {
		self.lexicon.is_some()
	}

	/// Returns `true` if lexicon candidates are currently consulted.
	pub fn uses_lexicon(&self) -> bool {
		self.use_lexicon && self.lexicon.is_some()
	}

	/// Enables or disables the lexicon for the next calls.
	pub fn set_use_lexicon(&mut self, use_lexicon: bool) {
		self.use_lexicon = use_lexicon;
	}

	/// Changes the lexicon confidence threshold (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range, whether or
	/// not a lexicon is loaded.
	pub fn set_lexicon_confidence(&mut self, confidence: f64) -> Result<()> {
		match &mut self.lexicon {
			Some(lexicon) => lexicon.set_confidence(confidence),
			None => validate_confidence(confidence),
		}
	}

	/// Returns the lexicon confidence threshold, if a lexicon is loaded.
	pub fn lexicon_confidence(&self) -> Option<f64> {
		self.lexicon.as_ref().map(SimilarityExpander::confidence)
	}

	pub fn policy(&self) -> SubstitutionPolicy {
		self.engine.policy()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use crate::model::engine::Provenance;
	use crate::model::wordnet::{PartOfSpeech, Synset};

	fn lexicon(lemmas: &[&str]) -> SimilarityExpander {
		SimilarityExpander::new(WordNet::from_synsets(vec![Synset::new(PartOfSpeech::Adjective, lemmas.iter().copied())]))
	}

	#[test]
	fn lexicon_toggle_changes_candidates() {
		let config = ParaphraserConfig::default();
		let mut paraphraser = Paraphraser::with_parts(KnowledgeStore::in_memory(), Some(lexicon(&["quack", "quick"])), &config);

		let with = paraphraser.paraphrase_with("quack", 1, &mut StdRng::seed_from_u64(0)).unwrap();
		assert_eq!(with[0].text(), "quick");
		assert_eq!(with[0].changes()[0].provenance, Provenance::ExternalLexicon);

		paraphraser.set_use_lexicon(false);
		assert!(!paraphraser.uses_lexicon());
		let without = paraphraser.paraphrase_with("quack", 1, &mut StdRng::seed_from_u64(0)).unwrap();
		assert_eq!(without[0].text(), "quack");
	}

	#[test]
	fn confidence_is_applied_to_loaded_lexicon() {
		let config = ParaphraserConfig::default();
		let mut paraphraser = Paraphraser::with_parts(KnowledgeStore::in_memory(), Some(lexicon(&["quack", "quick"])), &config);

		paraphraser.set_lexicon_confidence(0.9).unwrap();

		assert_eq!(paraphraser.lexicon_confidence(), Some(0.9));
		let variations = paraphraser.paraphrase_with("quack", 1, &mut StdRng::seed_from_u64(0)).unwrap();
		assert_eq!(variations[0].text(), "quack");
		assert!(paraphraser.set_lexicon_confidence(7.0).is_err());
	}

	#[test]
	fn configured_confidence_reaches_loaded_lexicon() {
		let dir = tempfile::tempdir().unwrap();
		let wordnet = dir.path().join("wordnet");
		std::fs::create_dir(&wordnet).unwrap();
		std::fs::write(wordnet.join("data.adj"), "00001740 00 a 02 quack 0 quick 0 000 | x\n").unwrap();
		let mut config = ParaphraserConfig::default();
		config.knowledge_file = dir.path().join("knowledge.json");
		config.wordnet_dir = Some(wordnet);
		config.set_lexicon_confidence(0.9).unwrap();

		let (paraphraser, warnings) = Paraphraser::new(&config);

		assert!(warnings.is_empty());
		assert_eq!(paraphraser.lexicon_confidence(), Some(0.9));
		let variations = paraphraser.paraphrase_with("quack", 1, &mut StdRng::seed_from_u64(0)).unwrap();
		assert_eq!(variations[0].text(), "quack");
	}

	#[test]
	fn missing_wordnet_is_a_warning() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = ParaphraserConfig::default();
		config.knowledge_file = dir.path().join("knowledge.json");
		config.wordnet_dir = Some(dir.path().join("wordnet"));

		let (paraphraser, warnings) = Paraphraser::new(&config);

		assert!(matches!(warnings.as_slice(), [Error::LexiconUnavailable(_)]));
		assert!(!paraphraser.has_lexicon());
		assert!(!paraphraser.knowledge().synonyms_of("make").is_empty());
	}

	#[test]
	fn direct_pairs_are_persisted() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("knowledge.json");
		let mut config = ParaphraserConfig::default();
		config.knowledge_file = path.clone();
		let (mut paraphraser, _) = Paraphraser::new(&config);

		assert!(paraphraser.add_synonym_pair("Happy", "glad").unwrap().is_new());

		let saved = KnowledgeStore::load(&path).unwrap();
		assert_eq!(saved.synonyms_of("glad"), ["happy"]);
	}
}
