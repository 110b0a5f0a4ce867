//! # moldesc Core Library
//!
//! Annotates molecules with numeric descriptors: partition coefficients,
//! hydrogen bond counts, polar surface area, topological indices and ring
//! counts. Input and output are MDL SD files.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless molecule model (`Molecule`),
//!   chemistry perception (implicit hydrogens, rings, aromaticity), the
//!   descriptor algorithms and SD file I/O.
//!
//! - **[`engine`]: The Logic Core.** The per-molecule representation cache
//!   (`MoleculeRecord`), calculators with their write rules, the immutable
//!   descriptor `Catalog`, the `Registry` that validates selections, and the
//!   chunked `Pipeline` that keeps output in input order while isolating
//!   failures.
//!
//! - **[`workflows`]: The Public API.** Complete runs from a record source to a
//!   molecule sink, with progress reporting and an end-of-run summary.

pub mod core;
pub mod engine;
pub mod workflows;
