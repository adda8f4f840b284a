use std::path::Path;

use thiserror::Error;

/// Errors surfaced by the paraphrasing core.
///
/// Every variant is recoverable: callers are expected to show the message
/// to the user and keep going with whatever state is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The knowledge file exists but could not be read or parsed.
	#[error("Error loading knowledge from {path}: {reason}")]
	StorageRead { path: String, reason: String },

	/// The knowledge (or export) file could not be written.
	#[error("Error saving knowledge to {path}: {reason}")]
	StorageWrite { path: String, reason: String },

	/// A batch-learn input file is missing, unreadable or unparsable.
	#[error("Error learning from {path}: {reason}")]
	LearnFile { path: String, reason: String },

	/// The external lexical database is missing or unusable.
	#[error("Lexical database unavailable: {0}")]
	LexiconUnavailable(String),

	/// A configuration value is out of range.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

impl Error {
	pub(crate) fn storage_read(path: &Path, reason: impl ToString) -> Self {
		Error::StorageRead { path: path.display().to_string(), reason: reason.to_string() }
	}

	pub(crate) fn storage_write(path: &Path, reason: impl ToString) -> Self {
		Error::StorageWrite { path: path.display().to_string(), reason: reason.to_string() }
	}

	pub(crate) fn learn_file(path: &Path, reason: impl ToString) -> Self {
		Error::LearnFile { path: path.display().to_string(), reason: reason.to_string() }
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
