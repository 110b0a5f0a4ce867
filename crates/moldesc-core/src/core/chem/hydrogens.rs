use super::valence::{bond_valence_sum, max_valence};
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::models::topology::BondOrder;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error(
        "Atom {position} ({element}) carries {implicit} implicit hydrogens but only {available} valence remain"
    )]
    ExcessHydrogens {
        position: usize,
        element: Element,
        implicit: u8,
        available: u32,
    },

    #[error("Implicit hydrogen count overflow on atom {position} ({element})")]
    HydrogenOverflow { position: usize, element: Element },

    #[error("Structure graph is inconsistent: {0}")]
    Graph(#[from] MoleculeError),
}

/// Returns a copy of `mol` in which every implicit hydrogen is an explicit
/// atom bonded to its parent.
///
/// New hydrogens are placed on top of their parent atom; coordinates are not
/// optimised. Properties are carried over with the clone.
pub fn with_explicit_hydrogens(mol: &Molecule) -> Result<Molecule, DerivationError> {
    let mut out = mol.clone();
    let parents: Vec<(usize, AtomId)> = out
        .atoms_iter()
        .enumerate()
        .filter(|(_, (_, atom))| atom.implicit_hydrogens > 0)
        .map(|(position, (id, _))| (position + 1, id))
        .collect();

    for (position, id) in parents {
        let Some(atom) = out.atom(id) else { continue };
        let (element, implicit, origin) = (atom.element, atom.implicit_hydrogens, atom.position);

        if let Some(limit) = max_valence(atom) {
            let available = limit.saturating_sub(bond_valence_sum(&out, id));
            if implicit as u32 > available {
                return Err(DerivationError::ExcessHydrogens {
                    position,
                    element,
                    implicit,
                    available,
                });
            }
        }

        for _ in 0..implicit {
            let hydrogen = out.add_atom(Atom::new(Element::H, origin));
            out.add_bond(id, hydrogen, BondOrder::Single)?;
        }
        if let Some(atom) = out.atom_mut(id) {
            atom.implicit_hydrogens = 0;
        }
    }
    Ok(out)
}

/// Returns a copy of `mol` with explicit hydrogens folded into implicit
/// counts on their heavy-atom neighbour.
///
/// Only neutral hydrogens with a single single-bond to a heavy atom are
/// collapsed; molecular hydrogen, bridging and charged hydrogens stay explicit.
pub fn with_implicit_hydrogens(mol: &Molecule) -> Result<Molecule, DerivationError> {
    let mut out = mol.clone();
    let mut collapsible: Vec<(AtomId, AtomId)> = Vec::new();

    for (id, atom) in out.atoms_iter() {
        if !atom.is_hydrogen() || atom.formal_charge != 0 {
            continue;
        }
        let [(parent, bond_index)] = out.neighbors(id) else {
            continue;
        };
        let single = out
            .bond(*bond_index)
            .is_some_and(|b| b.order == BondOrder::Single);
        let heavy = out.atom(*parent).is_some_and(|a| !a.is_hydrogen());
        if single && heavy {
            collapsible.push((id, *parent));
        }
    }

    let positions: Vec<AtomId> = out.atom_ids();
    for (_, parent) in &collapsible {
        let Some(atom) = out.atom_mut(*parent) else {
            continue;
        };
        match atom.implicit_hydrogens.checked_add(1) {
            Some(count) => atom.implicit_hydrogens = count,
            None => {
                let element = atom.element;
                let position = positions
                    .iter()
                    .position(|id| id == parent)
                    .map_or(0, |p| p + 1);
                return Err(DerivationError::HydrogenOverflow { position, element });
            }
        }
    }

    let hydrogens: Vec<AtomId> = collapsible.into_iter().map(|(h, _)| h).collect();
    out.remove_atoms(&hydrogens);
    Ok(out)
}
