//! Top-level module for the predictive-text model pipeline.
//!
//! This crate provides a corpus-to-model batch pipeline, including:
//! - Typed count tables (`CountTable`, `NestedTable`)
//! - Word tokenization with capitalization classes (`LineTokenizer`)
//! - Frequency aggregation over a corpus (`RawModel`)
//! - Vocabulary pruning (`PruneConfig`, `prune`)
//! - Probability conversion (`ProbabilityModel`, `convert`)
//! - A read-side query surface (`Predictor`)

/// One- and two-level count tables plus their probability variants.
///
/// All tables share the same accessor contract: lookups default to
/// zero, increments create entries on demand, and merging sums counts
/// key-wise.
pub mod tables;

/// Line tokenization, capitalization classification and
/// sentence-boundary tracking.
pub mod tokenizer;

/// Frequency aggregation over a token stream.
///
/// Supports loading from disk, parallel construction and merging.
pub mod corpus_model;

/// Vocabulary pruning under size and fan-out budgets.
///
/// Shrinks the raw tables while preserving referential closure
/// against the surviving vocabulary.
pub mod pruner;

/// Conversion of pruned counts into conditional probability tables.
pub mod probability;

/// Read-side prediction over a finished probability model.
///
/// Ranked suggestion, prefix completion, case restoration and
/// weighted random sampling.
pub mod predictor;
