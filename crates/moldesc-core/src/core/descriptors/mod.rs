//! # Descriptor Algorithms Module
//!
//! Numeric molecular descriptors and the backends that bind them to catalog keys.
//!
//! Each algorithm implements [`Descriptor`]: a pure function from a [`Molecule`]
//! to a [`DescriptorValue`]. Algorithms do not know which property names their
//! results end up under, nor which hydrogenation form they are handed; both are
//! decided by the engine's catalog.
//!
//! - [`hbond`] - Hydrogen bond donor and acceptor counts
//! - [`logp`] - Atom-contribution logP and molar refractivity
//! - [`polar`] - Topological polar surface area
//! - [`topological`] - Wiener numbers, sp3 carbon fraction, rotatable bonds
//! - [`rings`] - Ring and ring-system counts
//! - [`backend`] - Key to algorithm bindings

pub mod backend;
pub mod hbond;
pub mod key;
pub mod logp;
pub mod polar;
pub mod rings;
pub mod topological;

use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use thiserror::Error;

/// Raw result of a descriptor algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorValue {
    Integer(i64),
    Real(f64),
    IntegerVector(Vec<i64>),
    RealVector(Vec<f64>),
}

impl DescriptorValue {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::IntegerVector(_) => "integer vector",
            Self::RealVector(_) => "real vector",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DescriptorError {
    #[error(
        "{descriptor} requires explicit hydrogens but atom {position} carries {count} implicit"
    )]
    ImplicitHydrogens {
        descriptor: &'static str,
        position: usize,
        count: u8,
    },

    #[error("{descriptor} has no parameters for atom {position} ({element})")]
    UnsupportedAtom {
        descriptor: &'static str,
        position: usize,
        element: Element,
    },

    #[error("{descriptor} failed: {reason}")]
    Failed {
        descriptor: &'static str,
        reason: String,
    },
}

/// A descriptor algorithm.
pub trait Descriptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError>;
}
