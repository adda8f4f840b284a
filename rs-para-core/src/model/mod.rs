//! Top-level module for the paraphrasing system.
//!
//! This module provides:
//! - The synonym knowledge representation (`SynonymMap`, `LearningDelta`)
//! - Its persisted store (`KnowledgeStore`)
//! - File-based learning (`BatchLearner`)
//! - Optional lexical expansion (`LexicalExpander`, `WordNet`)
//! - Substitution (`ParaphraseEngine`) and its settings (`ParaphraserConfig`)
//! - A high-level interface for front-ends (`Paraphraser`)

/// High-level interface wiring store, learner, lexicon and engine together.
pub mod paraphraser;

/// Tokenization, candidate selection and change tracking.
pub mod engine;

/// Engine and front-end settings, with environment overlay.
pub mod config;

/// Persisted synonym knowledge with built-in defaults.
pub mod knowledge_store;

/// CSV / TXT / TSV ingestion into the knowledge store.
pub mod batch_learner;

/// Lowercase word → synonyms map and learning report.
pub mod synonym_map;

/// Pluggable lexical expansion with a similarity filter.
pub mod lexicon;

/// WordNet database reader.
pub mod wordnet;

/// String similarity ratio used by the lexicon filter.
pub mod similarity;
