use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

/// Valence consumed by the explicit bonds of an atom.
///
/// Aromatic bonds follow the MDL convention: `n` aromatic bonds count as
/// `n + 1` so that a ring carbon with two aromatic bonds uses three.
pub fn bond_valence_sum(mol: &Molecule, id: AtomId) -> u32 {
    let mut total = 0u32;
    let mut aromatic = 0u32;
    for (_, bond_index) in mol.neighbors(id) {
        let Some(bond) = mol.bond(*bond_index) else {
            continue;
        };
        if bond.order == BondOrder::Aromatic {
            aromatic += 1;
        } else {
            total += bond.order.multiplicity() as u32;
        }
    }
    if aromatic > 0 {
        total += aromatic + 1;
    }
    total
}

fn charge_adjusted(element: Element, valence: u8, charge: i8) -> i32 {
    let (valence, charge) = (valence as i32, charge as i32);
    match element {
        // Group 13: BH4- gains a bond, a borenium loses one.
        Element::B => valence - charge,
        // Group 14: both carbocations and carbanions drop to three.
        Element::C | Element::Si => valence - charge.abs(),
        _ => valence + charge,
    }
}

/// Valences allowed for an atom after adjusting for its formal charge.
pub fn allowed_valences(atom: &Atom) -> Vec<u32> {
    atom.element
        .default_valences()
        .iter()
        .map(|v| charge_adjusted(atom.element, *v, atom.formal_charge))
        .filter(|v| *v >= 0)
        .map(|v| v as u32)
        .collect()
}

/// Largest valence the atom may reach, or `None` for elements without a
/// valence model (metals).
pub fn max_valence(atom: &Atom) -> Option<u32> {
    allowed_valences(atom).into_iter().max()
}

/// Number of implicit hydrogens needed to reach the smallest allowed valence
/// not below the valence already used by explicit bonds.
pub fn implicit_hydrogens_for(mol: &Molecule, id: AtomId) -> u8 {
    let Some(atom) = mol.atom(id) else {
        return 0;
    };
    let used = bond_valence_sum(mol, id);
    allowed_valences(atom)
        .into_iter()
        .find(|v| *v >= used)
        .map_or(0, |target| (target - used).min(u8::MAX as u32) as u8)
}

/// Recomputes the implicit hydrogen count of every atom.
pub fn assign_implicit_hydrogens(mol: &mut Molecule) {
    let counts: Vec<(AtomId, u8)> = mol
        .atom_ids()
        .into_iter()
        .map(|id| (id, implicit_hydrogens_for(mol, id)))
        .collect();
    for (id, count) in counts {
        if let Some(atom) = mol.atom_mut(id) {
            atom.implicit_hydrogens = count;
        }
    }
}
