//! # Core Models Module
//!
//! Data structures describing a single small molecule as it travels through the
//! descriptor pipeline.
//!
//! ## Key Components
//!
//! - [`molecule`] - The molecular graph with its ordered property map
//! - [`atom`] - Atom with element, coordinates, charge and implicit hydrogens
//! - [`topology`] - Bonds and bond orders
//! - [`element`] - Supported chemical elements and their valences
//! - [`property`] - Values annotated on a molecule
//! - [`ids`] - Stable atom identifiers
//!
//! ## Usage
//!
//! ```ignore
//! use moldesc::core::models::{atom::Atom, element::Element, molecule::Molecule, topology::BondOrder};
//!
//! let mut mol = Molecule::with_title("methanol");
//! let c = mol.add_atom(Atom::new(Element::C, Point3::origin()));
//! let o = mol.add_atom(Atom::new(Element::O, Point3::origin()));
//! mol.add_bond(c, o, BondOrder::Single)?;
//! mol.set_property("Source", "example");
//! ```

pub mod atom;
pub mod element;
pub mod ids;
pub mod molecule;
pub mod property;
pub mod topology;
