use super::rings::{Ring, RingSet};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

const MIN_AROMATIC_RING: usize = 5;
const MAX_AROMATIC_RING: usize = 7;

/// Pi electrons contributed by one ring atom, or `None` when the atom makes
/// the ring non-aromatic (sp3 centre, triple bond, unsupported element).
fn pi_electrons(mol: &Molecule, rings: &RingSet, ring: &Ring, position: usize) -> Option<u32> {
    let id = ring.atoms[position];
    let atom = mol.atom(id)?;

    let mut double_in_ring = false;
    let mut double_in_other_ring = false;
    let mut double_exocyclic = false;
    for (_, bond_index) in mol.neighbors(id) {
        let bond = mol.bond(*bond_index)?;
        match bond.order {
            BondOrder::Triple => return None,
            BondOrder::Double if ring.contains_bond(*bond_index) => double_in_ring = true,
            BondOrder::Double if rings.bond_in_ring(*bond_index) => double_in_other_ring = true,
            BondOrder::Double => double_exocyclic = true,
            _ => {}
        }
    }

    if double_in_ring || double_in_other_ring {
        return Some(1);
    }
    if double_exocyclic {
        return Some(0);
    }

    let connections = mol.degree(id) + atom.implicit_hydrogens as usize;
    match (atom.element, atom.formal_charge, connections) {
        (Element::N | Element::P, 0, 3) => Some(2),
        (Element::O | Element::S | Element::Se, 0, 2) => Some(2),
        (Element::C, -1, 3) => Some(2),
        (Element::C, 1, 3) | (Element::B, 0, 3) => Some(0),
        _ => None,
    }
}

fn is_huckel_aromatic(mol: &Molecule, rings: &RingSet, ring: &Ring) -> bool {
    let mut total = 0u32;
    for position in 0..ring.size() {
        match pi_electrons(mol, rings, ring, position) {
            Some(electrons) => total += electrons,
            None => return false,
        }
    }
    total >= 2 && (total - 2) % 4 == 0
}

fn mark_ring(mol: &mut Molecule, ring: &Ring) {
    for id in &ring.atoms {
        if let Some(atom) = mol.atom_mut(*id) {
            atom.aromatic = true;
        }
    }
    for index in &ring.bonds {
        if let Some(bond) = mol.bond_mut(*index) {
            bond.aromatic = true;
        }
    }
}

/// Sets aromaticity flags on atoms and bonds.
///
/// Bonds read as aromatic keep their flag and mark their atoms. Rings of
/// five to seven atoms drawn in Kekulé form are then tested with the Hückel
/// 4n+2 rule, evaluating each ring on its own.
pub fn perceive(mol: &mut Molecule, rings: &RingSet) {
    let flagged: Vec<_> = mol
        .bonds()
        .iter()
        .filter(|b| b.aromatic)
        .map(|b| (b.atom1_id, b.atom2_id))
        .collect();
    for (a, b) in flagged {
        for id in [a, b] {
            if let Some(atom) = mol.atom_mut(id) {
                atom.aromatic = true;
            }
        }
    }

    let aromatic: Vec<Ring> = rings
        .iter()
        .filter(|ring| (MIN_AROMATIC_RING..=MAX_AROMATIC_RING).contains(&ring.size()))
        .filter(|ring| {
            let already = ring
                .bonds
                .iter()
                .all(|i| mol.bond(*i).is_some_and(|b| b.aromatic));
            !already && is_huckel_aromatic(mol, rings, ring)
        })
        .cloned()
        .collect();
    for ring in &aromatic {
        mark_ring(mol, ring);
    }
}
