use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;

use crate::error::Error;
use crate::io;
use super::knowledge_store::KnowledgeStore;
use super::synonym_map::LearningDelta;

/// Field separator of `.txt` / `.tsv` lines.
static LINE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\t]").expect("valid separator pattern"));

/// Record layout of a batch-learn file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
	/// `.csv`: comma-separated records, quoting allowed.
	Csv,
	/// `.txt` / `.tsv`: one record per line, split on a comma or a tab.
	Delimited,
}

impl RecordFormat {
	/// Extensions accepted for batch learning.
	pub const EXTENSIONS: [&'static str; 3] = ["csv", "txt", "tsv"];

	/// Picks the format matching `path`'s extension (case-insensitive).
	pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
		Self::from_extension(&io::extension(path)?)
	}

	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_lowercase().as_str() {
			"csv" => Some(RecordFormat::Csv),
			"txt" | "tsv" => Some(RecordFormat::Delimited),
			_ => None,
		}
	}
}

/// Counts of one batch-learn run.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearnReport {
	/// Well-formed `(word, synonym)` records seen.
	pub total_pairs_seen: usize,
	/// Records that added at least one new direction.
	pub new_pairs_added: usize,
}

/// A batch-learn run that stopped early.
///
/// Records applied before the failure stay in the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error} ({seen} pairs seen before stopping)", seen = .report.total_pairs_seen)]
pub struct LearnFailure {
	/// Counts accumulated before the failure.
	pub report: LearnReport,
	#[source]
	pub error: Error,
}

/// Feeds delimited synonym files into a [`KnowledgeStore`].
///
/// Each qualifying record `word<sep>synonym[<sep>ignored...]` becomes a
/// symmetric pair. Records with fewer than two non-empty fields are skipped
/// and not counted.
#[derive(Debug, Default)]
pub struct BatchLearner {
	delta: LearningDelta,
}

impl BatchLearner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Synonyms added by the most recent run.
	pub fn newly_added(&self) -> &LearningDelta {
		&self.delta
	}

	/// Learns every pair of `path` into `store`, then persists the store once.
	///
	/// # Behavior
	/// - The format is chosen from the file extension (see [`RecordFormat`])
	/// - The newly-added report is reset at the start of every call
	/// - On a read fault the run stops; applied records stay in memory and
	///   the store is not persisted
	///
	/// # Errors
	/// Returns a `LearnFailure` holding the partial counts and either
	/// `Error::LearnFile` (input problem) or `Error::StorageWrite` (the
	/// final persist failed; every record was applied).
	pub fn learn_from_file<P: AsRef<Path>>(&mut self, store: &mut KnowledgeStore, path: P) -> Result<LearnReport, LearnFailure> {
		let path = path.as_ref();
		self.delta.clear();
		let mut report = LearnReport::default();

		let outcome = self.learn_records(store, path, &mut report);
		Self::finish(store, path, report, outcome)
	}

	/// Learns every `.csv`, `.txt` and `.tsv` file directly inside `dir`,
	/// in file name order, then persists the store once.
	///
	/// The newly-added report covers the whole folder. The first failing
	/// file stops the run, like a fault inside a single file.
	///
	/// # Errors
	/// Same as [`BatchLearner::learn_from_file`]; an unreadable directory is
	/// an `Error::LearnFile`.
	pub fn learn_from_folder<P: AsRef<Path>>(&mut self, store: &mut KnowledgeStore, dir: P) -> Result<LearnReport, LearnFailure> {
		let dir = dir.as_ref();
		self.delta.clear();
		let mut report = LearnReport::default();

		let outcome = io::list_files(dir, &RecordFormat::EXTENSIONS)
			.map_err(|e| Error::learn_file(dir, e))
			.and_then(|files| {
				debug!("Learning from {} files in {}", files.len(), dir.display());
				files.iter().try_for_each(|file| self.learn_records(store, file, &mut report))
			});
		Self::finish(store, dir, report, outcome)
	}

	/// Dispatches one file to the reader matching its format.
	fn learn_records(&mut self, store: &mut KnowledgeStore, path: &Path, report: &mut LearnReport) -> crate::error::Result<()> {
		match RecordFormat::from_path(path) {
			Some(RecordFormat::Csv) => self.learn_csv(store, path, report),
			Some(RecordFormat::Delimited) => self.learn_lines(store, path, report),
			None => Err(Error::learn_file(path, "unsupported file extension, expected .csv, .txt or .tsv")),
		}
	}

	/// Persists after a complete run, or turns a fault into a `LearnFailure`.
	fn finish(
		store: &KnowledgeStore,
		source: &Path,
		report: LearnReport,
		outcome: crate::error::Result<()>,
	) -> Result<LearnReport, LearnFailure> {
		if let Err(error) = outcome.and_then(|_| store.persist()) {
			warn!("{error}");
			return Err(LearnFailure { report, error });
		}

		info!(
			"Learned {} new pairs out of {} from {}",
			report.new_pairs_added,
			report.total_pairs_seen,
			source.display()
		);
		Ok(report)
	}

	fn learn_csv(&mut self, store: &mut KnowledgeStore, path: &Path, report: &mut LearnReport) -> crate::error::Result<()> {
		let mut reader = csv::ReaderBuilder::new()
			.has_headers(false)
			.flexible(true)
			.trim(csv::Trim::All)
			.from_path(path)
			.map_err(|e| Error::learn_file(path, e))?;

		for record in reader.records() {
			let record = record.map_err(|e| Error::learn_file(path, e))?;
			if let (Some(word), Some(synonym)) = (record.get(0), record.get(1)) {
				self.apply(store, word, synonym, report);
			} else {
				debug!("Skipping short record {record:?}");
			}
		}
		Ok(())
	}

	fn learn_lines(&mut self, store: &mut KnowledgeStore, path: &Path, report: &mut LearnReport) -> crate::error::Result<()> {
		let file = File::open(path).map_err(|e| Error::learn_file(path, e))?;

		for line in BufReader::new(file).lines() {
			let line = line.map_err(|e| Error::learn_file(path, e))?;
			let mut fields = LINE_SEPARATOR.split(line.trim());
			if let (Some(word), Some(synonym)) = (fields.next(), fields.next()) {
				self.apply(store, word, synonym, report);
			} else {
				debug!("Skipping short line {line:?}");
			}
		}
		Ok(())
	}

	/// Applies one record with at least two fields.
	fn apply(&mut self, store: &mut KnowledgeStore, word: &str, synonym: &str, report: &mut LearnReport) {
		let (word, synonym) = (word.trim(), synonym.trim());
		if word.is_empty() || synonym.is_empty() {
			debug!("Skipping record with an empty field ({word:?}, {synonym:?})");
			return;
		}

		report.total_pairs_seen += 1;
		let addition = store.add_synonym_pair(word, synonym);
		if addition.is_new() {
			report.new_pairs_added += 1;
			self.delta.record(word, synonym, addition);
		}
	}
}
