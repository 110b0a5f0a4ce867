//! Provides input/output functionality for structure files.
//!
//! Structures are read from and written to MDL SD files (V2000 connection
//! tables with data items). Writers implement the [`traits::MoleculeSink`]
//! interface so that workflows can stream annotated molecules to any
//! destination.

pub mod sdf;
pub mod traits;
