//! # Chemistry Perception Module
//!
//! Graph-level chemistry used to prepare structures for descriptor calculation:
//! implicit hydrogen assignment ([`valence`]), ring perception ([`rings`]),
//! aromaticity ([`aromaticity`]) and the hydrogenation transforms that back the
//! alternate representations of a record ([`hydrogens`]).

pub mod aromaticity;
pub mod hydrogens;
pub mod rings;
pub mod valence;

use crate::core::models::molecule::Molecule;

/// Prepares a freshly read structure: assigns implicit hydrogens from the
/// valence model, then perceives aromaticity over its smallest rings.
pub fn initialize(mol: &mut Molecule) {
    valence::assign_implicit_hydrogens(mol);
    let rings = rings::find_small_rings(mol);
    aromaticity::perceive(mol, &rings);
}
