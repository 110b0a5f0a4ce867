//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::core`] and [`crate::engine`]
//! layers together into complete descriptor runs.
//!
//! ## Overview
//!
//! A workflow validates the descriptor selection, builds the calculators,
//! streams molecules through the pipeline and hands each annotated molecule to
//! a sink. Configuration problems are reported before any input is read;
//! everything that goes wrong with an individual molecule is counted and
//! logged without stopping the run.
//!
//! ## Architecture
//!
//! - **Describe Workflow** ([`describe`]) - Selection, streaming annotation, output and run summary
//!
//! ## Key Capabilities
//!
//! - **Streaming** from any record source to any [`crate::core::io::traits::MoleculeSink`]
//! - **In-memory batches** through [`describe::select_and_run`]
//! - **Run summaries** with error tally, cost and per-descriptor execution counts

pub mod describe;
