use super::atom::Atom;
use super::ids::AtomId;
use super::property::PropertyValue;
use super::topology::{Bond, BondOrder};
use indexmap::IndexMap;
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Atom {0:?} does not exist in this molecule")]
    AtomNotFound(AtomId),
    #[error("An atom cannot be bonded to itself")]
    SelfBond,
    #[error("Atoms {0:?} and {1:?} are already bonded")]
    DuplicateBond(AtomId, AtomId),
}

/// A molecular graph with its annotated properties.
///
/// Atoms live in a slot map so that ids stay valid across removals; iteration
/// follows slot order, which equals insertion order for molecules that never
/// had atoms removed and re-added. Properties keep their insertion order so
/// that writers reproduce the order in which they were annotated.
///
/// `Clone` produces a fully independent deep copy.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    title: String,
    atoms: SlotMap<AtomId, Atom>,
    bonds: Vec<Bond>,
    /// Cached adjacency: for each atom, `(neighbor, bond index)` pairs.
    adjacency: SecondaryMap<AtomId, Vec<(AtomId, usize)>>,
    properties: IndexMap<String, PropertyValue>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let id = self.atoms.insert(atom);
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Adds a bond between two existing atoms and returns its index.
    pub fn add_bond(
        &mut self,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        if atom1_id == atom2_id {
            return Err(MoleculeError::SelfBond);
        }
        for id in [atom1_id, atom2_id] {
            if !self.atoms.contains_key(id) {
                return Err(MoleculeError::AtomNotFound(id));
            }
        }
        if self.bond_between(atom1_id, atom2_id).is_some() {
            return Err(MoleculeError::DuplicateBond(atom1_id, atom2_id));
        }

        let index = self.bonds.len();
        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        if let Some(list) = self.adjacency.get_mut(atom1_id) {
            list.push((atom2_id, index));
        }
        if let Some(list) = self.adjacency.get_mut(atom2_id) {
            list.push((atom1_id, index));
        }
        Ok(index)
    }

    /// Removes an atom together with every bond that references it.
    ///
    /// Bond indices are renumbered, so indices obtained before the call are invalid afterwards.
    pub fn remove_atom(&mut self, id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(id)?;
        self.bonds.retain(|bond| !bond.contains(id));
        self.rebuild_adjacency();
        Some(atom)
    }

    /// Removes several atoms at once, rebuilding the bond table a single time.
    pub fn remove_atoms(&mut self, ids: &[AtomId]) -> usize {
        let removed = ids
            .iter()
            .filter(|id| self.atoms.remove(**id).is_some())
            .count();
        if removed > 0 {
            let atoms = &self.atoms;
            self.bonds
                .retain(|bond| atoms.contains_key(bond.atom1_id) && atoms.contains_key(bond.atom2_id));
            self.rebuild_adjacency();
        }
        removed
    }

    fn rebuild_adjacency(&mut self) {
        self.adjacency.clear();
        for id in self.atoms.keys() {
            self.adjacency.insert(id, Vec::new());
        }
        for (index, bond) in self.bonds.iter().enumerate() {
            if let Some(list) = self.adjacency.get_mut(bond.atom1_id) {
                list.push((bond.atom2_id, index));
            }
            if let Some(list) = self.adjacency.get_mut(bond.atom2_id) {
                list.push((bond.atom1_id, index));
            }
        }
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_ids(&self) -> Vec<AtomId> {
        self.atoms.keys().collect()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    pub fn bond_mut(&mut self, index: usize) -> Option<&mut Bond> {
        self.bonds.get_mut(index)
    }

    /// Index of the bond joining `a` and `b`, if any.
    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<usize> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|(neighbor, _)| *neighbor == b)
            .map(|(_, index)| *index)
    }

    /// Neighbors of an atom as `(neighbor id, bond index)` pairs.
    pub fn neighbors(&self, id: AtomId) -> &[(AtomId, usize)] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of explicit neighbors, hydrogens included.
    pub fn degree(&self, id: AtomId) -> usize {
        self.neighbors(id).len()
    }

    /// Number of explicit non-hydrogen neighbors.
    pub fn heavy_degree(&self, id: AtomId) -> usize {
        self.neighbors(id)
            .iter()
            .filter(|(n, _)| self.atoms.get(*n).is_some_and(|a| !a.is_hydrogen()))
            .count()
    }

    /// Total hydrogens on an atom: implicit count plus explicit hydrogen neighbors.
    pub fn hydrogen_count(&self, id: AtomId) -> usize {
        let implicit = self
            .atoms
            .get(id)
            .map_or(0, |a| a.implicit_hydrogens as usize);
        let explicit = self
            .neighbors(id)
            .iter()
            .filter(|(n, _)| self.atoms.get(*n).is_some_and(Atom::is_hydrogen))
            .count();
        implicit + explicit
    }

    /// Whether any bond of the atom has the given order.
    pub fn has_bond_of_order(&self, id: AtomId, order: BondOrder) -> bool {
        self.neighbors(id)
            .iter()
            .any(|(_, index)| self.bonds[*index].order == order)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Sets a property, replacing an existing value in place (keeping its position).
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn remove_property(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(name)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}
