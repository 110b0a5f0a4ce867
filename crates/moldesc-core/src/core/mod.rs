//! # Core Module
//!
//! Stateless building blocks of the descriptor pipeline: the molecule model,
//! the chemistry perception that prepares structures, the descriptor
//! algorithms themselves and structure file I/O.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, elements and annotated properties
//! - **Chemistry Perception** ([`chem`]) - Implicit hydrogens, rings, aromaticity, hydrogenation transforms
//! - **Descriptor Algorithms** ([`descriptors`]) - Numeric descriptors and the backends binding them to keys
//! - **File I/O** ([`io`]) - Streaming SD file reader and writer
//!
//! Nothing in this layer knows about representations, calculators or the
//! pipeline; those live in [`crate::engine`].

pub mod chem;
pub mod descriptors;
pub mod io;
pub mod models;

#[cfg(test)]
pub(crate) mod testing;
