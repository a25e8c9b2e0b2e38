//! Predictive-text language model building library.
//!
//! This crate turns a raw text corpus into a size-bounded statistical
//! model for keyboard-style predictive input, including:
//! - Word tokenization with capitalization classification
//! - Unigram/bigram/trigram, completion and capitalization counting
//! - Vocabulary pruning under size and fan-out budgets
//! - Conversion of counts into conditional probability tables
//! - A read-side prediction surface over the finished model
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core pipeline: counting, pruning, probability conversion, prediction.
///
/// This module exposes the pipeline stages while keeping internal
/// helpers private.
pub mod model;

/// Model artifact persistence (JSON documents, atomic writes).
pub mod artifacts;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;
