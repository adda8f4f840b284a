use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use super::knowledge_store::DEFAULT_KNOWLEDGE_FILE;
use super::lexicon::{validate_confidence, DEFAULT_CONFIDENCE};

/// How the engine decides whether to replace a token.
///
/// # Variants
/// - `Exhaustive`: every token with at least one candidate is replaced.
/// - `Probabilistic { rate }`: each token is considered with probability
///   `rate`; a considered token with candidates is always replaced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SubstitutionPolicy {
	#[default]
	Exhaustive,
	Probabilistic { rate: f64 },
}

impl SubstitutionPolicy {
	/// Replacement probability used when none is given.
	pub const DEFAULT_RATE: f64 = 0.3;

	/// Creates a probabilistic policy.
	///
	/// # Errors
	/// Returns an error if `rate` is outside `[0.0, 1.0]`.
	pub fn probabilistic(rate: f64) -> Result<Self> {
		if !(0.0..=1.0).contains(&rate) {
			return Err(Error::InvalidConfig(format!("substitution rate must be between 0.0 and 1.0, got {rate}")));
		}
		Ok(SubstitutionPolicy::Probabilistic { rate })
	}
}

impl FromStr for SubstitutionPolicy {
	type Err = Error;

	/// Accepts `exhaustive`, `probabilistic` or `probabilistic:<rate>`.
	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim().to_lowercase();
		match s.split_once(':') {
			None if s == "exhaustive" => Ok(SubstitutionPolicy::Exhaustive),
			None if s == "probabilistic" => SubstitutionPolicy::probabilistic(Self::DEFAULT_RATE),
			Some(("probabilistic", rate)) => {
				let rate = rate
					.trim()
					.parse::<f64>()
					.map_err(|_| Error::InvalidConfig(format!("invalid substitution rate {rate:?}")))?;
				SubstitutionPolicy::probabilistic(rate)
			}
			_ => Err(Error::InvalidConfig(format!(
				"policy must be 'exhaustive' or 'probabilistic[:rate]', got {s:?}"
			))),
		}
	}
}

/// Settings of a [`Paraphraser`](super::paraphraser::Paraphraser).
///
/// # Invariants
/// - `lexicon_confidence` is in `[0.0, 1.0]`
/// - a probabilistic `policy` has its rate in `[0.0, 1.0]`
#[derive(Debug, Clone, PartialEq)]
pub struct ParaphraserConfig {
	/// Persisted knowledge file.
	pub knowledge_file: PathBuf,

	/// WordNet `dict/` directory; `None` disables the lexicon entirely.
	pub wordnet_dir: Option<PathBuf>,

	/// Whether lexicon candidates are consulted (when a lexicon is loaded).
	pub use_lexicon: bool,

	/// Replacements copy the capitalisation of the token they replace.
	pub preserve_case: bool,

	/// Minimum similarity ratio for lexicon candidates.
	lexicon_confidence: f64,

	/// Substitution policy of the engine.
	policy: SubstitutionPolicy,
}

impl Default for ParaphraserConfig {
	fn default() -> Self {
		Self {
			knowledge_file: PathBuf::from(DEFAULT_KNOWLEDGE_FILE),
			wordnet_dir: None,
			use_lexicon: true,
			preserve_case: false,
			lexicon_confidence: DEFAULT_CONFIDENCE,
			policy: SubstitutionPolicy::Exhaustive,
		}
	}
}

impl ParaphraserConfig {
	/// Environment variable names read by [`ParaphraserConfig::from_env`].
	pub const ENV_KNOWLEDGE: &'static str = "RS_PARA_KNOWLEDGE";
	pub const ENV_WORDNET: &'static str = "RS_PARA_WORDNET";
	pub const ENV_USE_LEXICON: &'static str = "RS_PARA_USE_LEXICON";
	pub const ENV_CONFIDENCE: &'static str = "RS_PARA_CONFIDENCE";
	pub const ENV_POLICY: &'static str = "RS_PARA_POLICY";
	pub const ENV_PRESERVE_CASE: &'static str = "RS_PARA_PRESERVE_CASE";

	/// Defaults overlaid with the `RS_PARA_*` environment variables.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` if a variable holds an invalid value.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Defaults overlaid with the values returned by `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();

		if let Some(path) = lookup(Self::ENV_KNOWLEDGE) {
			config.knowledge_file = PathBuf::from(path);
		}
		if let Some(dir) = lookup(Self::ENV_WORDNET) {
			config.wordnet_dir = Some(PathBuf::from(dir));
		}
		if let Some(value) = lookup(Self::ENV_USE_LEXICON) {
			config.use_lexicon = parse_flag(Self::ENV_USE_LEXICON, &value)?;
		}
		if let Some(value) = lookup(Self::ENV_PRESERVE_CASE) {
			config.preserve_case = parse_flag(Self::ENV_PRESERVE_CASE, &value)?;
		}
		if let Some(value) = lookup(Self::ENV_CONFIDENCE) {
			let confidence = value
				.trim()
				.parse::<f64>()
				.map_err(|_| Error::InvalidConfig(format!("{} must be a number, got {value:?}", Self::ENV_CONFIDENCE)))?;
			config.set_lexicon_confidence(confidence)?;
		}
		if let Some(value) = lookup(Self::ENV_POLICY) {
			config.policy = value.parse()?;
		}

		Ok(config)
	}

	/// Returns the lexicon confidence threshold.
	pub fn lexicon_confidence(&self) -> f64 {
		self.lexicon_confidence
	}

	/// Sets the lexicon confidence threshold (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_lexicon_confidence(&mut self, confidence: f64) -> Result<()> {
		validate_confidence(confidence)?;
		self.lexicon_confidence = confidence;
		Ok(())
	}

	/// Returns the substitution policy.
	pub fn policy(&self) -> SubstitutionPolicy {
		self.policy
	}

	/// Sets the substitution policy.
	///
	/// # Errors
	/// Returns an error if a probabilistic rate is outside `[0.0, 1.0]`.
	pub fn set_policy(&mut self, policy: SubstitutionPolicy) -> Result<()> {
		if let SubstitutionPolicy::Probabilistic { rate } = policy {
			SubstitutionPolicy::probabilistic(rate)?;
		}
		self.policy = policy;
		Ok(())
	}
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(Error::InvalidConfig(format!("{name} must be a boolean, got {value:?}"))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn defaults() {
		let config = ParaphraserConfig::default();
		assert_eq!(config.knowledge_file, PathBuf::from("synonym_knowledge.json"));
		assert_eq!(config.lexicon_confidence(), 0.8);
		assert_eq!(config.policy(), SubstitutionPolicy::Exhaustive);
		assert!(config.use_lexicon);
		assert!(!config.preserve_case);
	}

	#[test]
	fn policy_parsing() {
		assert_eq!("exhaustive".parse::<SubstitutionPolicy>().unwrap(), SubstitutionPolicy::Exhaustive);
		assert_eq!(
			"Probabilistic".parse::<SubstitutionPolicy>().unwrap(),
			SubstitutionPolicy::Probabilistic { rate: 0.3 }
		);
		assert_eq!(
			"probabilistic:0.5".parse::<SubstitutionPolicy>().unwrap(),
			SubstitutionPolicy::Probabilistic { rate: 0.5 }
		);
		assert!("probabilistic:2".parse::<SubstitutionPolicy>().is_err());
		assert!("sometimes".parse::<SubstitutionPolicy>().is_err());
	}

	#[test]
	fn environment_overlay() {
		let config = ParaphraserConfig::from_lookup(lookup(&[
			("RS_PARA_KNOWLEDGE", "/tmp/k.json"),
			("RS_PARA_WORDNET", "/usr/share/wordnet"),
			("RS_PARA_USE_LEXICON", "no"),
			("RS_PARA_CONFIDENCE", "0.6"),
			("RS_PARA_POLICY", "probabilistic:0.25"),
			("RS_PARA_PRESERVE_CASE", "true"),
		]))
		.unwrap();

		assert_eq!(config.knowledge_file, PathBuf::from("/tmp/k.json"));
		assert_eq!(config.wordnet_dir, Some(PathBuf::from("/usr/share/wordnet")));
		assert!(!config.use_lexicon);
		assert!(config.preserve_case);
		assert_eq!(config.lexicon_confidence(), 0.6);
		assert_eq!(config.policy(), SubstitutionPolicy::Probabilistic { rate: 0.25 });
	}

	#[test]
	fn invalid_environment_values_are_reported() {
		assert!(ParaphraserConfig::from_lookup(lookup(&[("RS_PARA_CONFIDENCE", "1.2")])).is_err());
		assert!(ParaphraserConfig::from_lookup(lookup(&[("RS_PARA_USE_LEXICON", "maybe")])).is_err());
	}

	#[test]
	fn set_policy_validates_rate() {
		let mut config = ParaphraserConfig::default();
		assert!(config.set_policy(SubstitutionPolicy::Probabilistic { rate: -1.0 }).is_err());
		assert_eq!(config.policy(), SubstitutionPolicy::Exhaustive);
	}
}
