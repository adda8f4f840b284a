//! Command line arguments of the `rs-para` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use rs_para_core::error::Result;
use rs_para_core::model::config::{ParaphraserConfig, SubstitutionPolicy};

/// rs-para - word-substitution paraphraser with a learnable synonym store
#[derive(Parser, Debug, Clone)]
#[command(name = "rs-para")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Knowledge file (JSON)
	#[arg(short, long, env = "RS_PARA_KNOWLEDGE", default_value = "synonym_knowledge.json")]
	pub knowledge: PathBuf,

	/// WordNet `dict/` directory used for extra candidates
	#[arg(short, long, env = "RS_PARA_WORDNET")]
	pub wordnet: Option<PathBuf>,

	/// Ignore the WordNet candidates even if a database is given
	#[arg(long)]
	pub no_lexicon: bool,

	/// Minimum similarity between a word and a WordNet candidate (0.0-1.0)
	#[arg(short, long, default_value_t = 0.8)]
	pub confidence: f64,

	/// Substitution policy
	#[arg(short, long, value_enum, default_value_t = PolicyArg::Exhaustive)]
	pub policy: PolicyArg,

	/// Replacement probability of the probabilistic policy (0.0-1.0)
	#[arg(short, long, default_value_t = SubstitutionPolicy::DEFAULT_RATE)]
	pub rate: f64,

	/// Keep the capitalisation of replaced words
	#[arg(long)]
	pub preserve_case: bool,

	/// Verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
	/// Replace every word that has a synonym
	Exhaustive,
	/// Replace each word with a fixed probability
	Probabilistic,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
	/// Paraphrase a text
	Paraphrase {
		/// Text to paraphrase
		text: String,

		/// Number of variations
		#[arg(short = 'n', long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
		variations: u8,

		/// Seed for reproducible output
		#[arg(short, long)]
		seed: Option<u64>,
	},

	/// Learn synonym pairs from a CSV / TXT / TSV file or a folder of them
	Learn {
		path: PathBuf,
	},

	/// Print the synonym knowledge
	Show,

	/// Export the synonym knowledge to a JSON file
	Export {
		path: PathBuf,
	},
}

impl Args {
	/// Builds the paraphraser configuration from the flags.
	///
	/// # Errors
	/// Returns an error if the confidence or rate is out of range.
	pub fn to_config(&self) -> Result<ParaphraserConfig> {
		let mut config = ParaphraserConfig::default();
		config.knowledge_file = self.knowledge.clone();
		config.wordnet_dir = self.wordnet.clone();
		config.use_lexicon = !self.no_lexicon;
		config.preserve_case = self.preserve_case;
		config.set_lexicon_confidence(self.confidence)?;
		config.set_policy(match self.policy {
			PolicyArg::Exhaustive => SubstitutionPolicy::Exhaustive,
			PolicyArg::Probabilistic => SubstitutionPolicy::probabilistic(self.rate)?,
		})?;
		Ok(config)
	}

	/// Log filter matching the verbosity flag.
	pub fn log_filter(&self) -> &'static str {
		match self.verbose {
			0 => "warn",
			1 => "info",
			_ => "debug",
		}
	}
}
