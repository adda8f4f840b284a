//! Word-substitution paraphrasing library.
//!
//! This crate provides a small, self-contained paraphrasing system including:
//! - A persisted, user-extensible synonym knowledge store
//! - Bidirectional batch learning from CSV / TXT / TSV files
//! - Optional candidate expansion from a WordNet lexical database
//! - Randomised per-token substitution with change tracking
//!
//! Front-ends should go through [`model::paraphraser::Paraphraser`], which
//! wires every component together.

/// Core paraphrasing models: knowledge store, learner, lexicon and engine.
///
/// This module exposes the high-level `Paraphraser` interface along with
/// the building blocks it is made of.
pub mod model;

/// Error types shared by every component.
pub mod error;

/// I/O utilities (extension detection, JSON writes, folder listing).
///
/// Not exposed
pub(crate) mod io;
