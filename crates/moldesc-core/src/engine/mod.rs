//! # Engine Module
//!
//! The stateful layer that turns descriptor algorithms into annotated molecules.
//!
//! ## Overview
//!
//! Each input molecule is wrapped in a [`record::MoleculeRecord`] that caches
//! its hydrogenation forms. Calculators resolve the form they need, run their
//! algorithm and write the result back as properties under a per-descriptor
//! write rule. The pipeline drives a fixed list of calculators over a molecule
//! stream in chunks, isolating failures per (molecule, calculator) pair while
//! keeping output in input order.
//!
//! ## Architecture
//!
//! - **Representation Cache** ([`record`]) - Lazy, memoised derived forms with property propagation
//! - **Calculators** ([`calculator`]) - Write rules and the bound descriptor unit
//! - **Catalog** ([`catalog`]) - Immutable table of descriptors, forms and property names
//! - **Registry** ([`registry`]) - Selection resolution and calculator instantiation
//! - **Pipeline** ([`pipeline`]) - Chunked, ordered, optionally parallel execution
//! - **Execution Counts** ([`stats`]) - Concurrent per-descriptor success counters
//! - **Configuration** ([`config`]) - Run parameters and fatal configuration errors
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Run-level error type
//!
//! ## Key Capabilities
//!
//! - **Single derivation** of each hydrogenation form per molecule
//! - **Failure isolation** with a per-run error tally
//! - **Order preservation** regardless of parallel execution

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod registry;
pub mod stats;
