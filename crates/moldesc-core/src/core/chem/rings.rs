use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    /// Atoms in traversal order around the ring.
    pub atoms: Vec<AtomId>,
    /// Indices into [`Molecule::bonds`].
    pub bonds: Vec<usize>,
}

impl Ring {
    #[inline]
    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.atoms.contains(&id)
    }

    pub fn contains_bond(&self, index: usize) -> bool {
        self.bonds.contains(&index)
    }
}

/// The smallest set of smallest rings of a molecule, with membership lookups.
#[derive(Debug, Clone, Default)]
pub struct RingSet {
    rings: Vec<Ring>,
    ring_atoms: HashSet<AtomId>,
    ring_bonds: HashSet<usize>,
}

impl RingSet {
    fn new(rings: Vec<Ring>) -> Self {
        let ring_atoms = rings.iter().flat_map(|r| r.atoms.iter().copied()).collect();
        let ring_bonds = rings.iter().flat_map(|r| r.bonds.iter().copied()).collect();
        Self {
            rings,
            ring_atoms,
            ring_bonds,
        }
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ring> {
        self.rings.iter()
    }

    pub fn atom_in_ring(&self, id: AtomId) -> bool {
        self.ring_atoms.contains(&id)
    }

    pub fn bond_in_ring(&self, index: usize) -> bool {
        self.ring_bonds.contains(&index)
    }

    /// Groups ring indices into ring systems: rings sharing at least one atom
    /// (fused, bridged or spiro) end up in the same system.
    pub fn systems(&self) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.rings.len()).collect();
        fn find(parent: &mut [usize], i: usize) -> usize {
            let mut root = i;
            while parent[root] != root {
                root = parent[root];
            }
            let mut node = i;
            while parent[node] != root {
                let next = parent[node];
                parent[node] = root;
                node = next;
            }
            root
        }

        let mut owner: HashMap<AtomId, usize> = HashMap::new();
        for (index, ring) in self.rings.iter().enumerate() {
            for atom in &ring.atoms {
                match owner.get(atom) {
                    Some(&other) => {
                        let (a, b) = (find(&mut parent, index), find(&mut parent, other));
                        if a != b {
                            parent[a.max(b)] = a.min(b);
                        }
                    }
                    None => {
                        owner.insert(*atom, index);
                    }
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        for index in 0..self.rings.len() {
            let root = find(&mut parent, index);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(index);
        }
        groups
    }
}

/// Number of independent cycles: `bonds - atoms + connected components`.
pub fn cyclomatic_number(mol: &Molecule) -> usize {
    let ids = mol.atom_ids();
    let mut seen: HashSet<AtomId> = HashSet::with_capacity(ids.len());
    let mut components = 0;
    for id in ids {
        if !seen.insert(id) {
            continue;
        }
        components += 1;
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for (neighbor, _) in mol.neighbors(current) {
                if seen.insert(*neighbor) {
                    queue.push_back(*neighbor);
                }
            }
        }
    }
    (mol.bond_count() + components).saturating_sub(mol.atom_count())
}

/// Shortest cycle containing the given bond, found by a breadth-first search
/// between its endpoints that is not allowed to use the bond itself.
fn shortest_cycle_through(mol: &Molecule, bond_index: usize) -> Option<Ring> {
    let bond = mol.bond(bond_index)?;
    let (start, goal) = (bond.atom1_id, bond.atom2_id);

    let mut previous: HashMap<AtomId, (AtomId, usize)> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    let mut visited: HashSet<AtomId> = HashSet::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        for (neighbor, via) in mol.neighbors(current) {
            if *via == bond_index || !visited.insert(*neighbor) {
                continue;
            }
            previous.insert(*neighbor, (current, *via));
            queue.push_back(*neighbor);
        }
    }

    if !visited.contains(&goal) {
        return None;
    }

    let mut atoms = vec![goal];
    let mut bonds = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        let (prev, via) = *previous.get(&cursor)?;
        bonds.push(via);
        atoms.push(prev);
        cursor = prev;
    }
    bonds.push(bond_index);
    Some(Ring { atoms, bonds })
}

/// Incremental GF(2) basis over bond-incidence vectors.
struct CycleBasis {
    words: usize,
    by_pivot: HashMap<usize, Vec<u64>>,
}

impl CycleBasis {
    fn new(bond_count: usize) -> Self {
        Self {
            words: bond_count.div_ceil(64).max(1),
            by_pivot: HashMap::new(),
        }
    }

    fn highest_bit(bits: &[u64]) -> Option<usize> {
        bits.iter()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + 63 - w.leading_zeros() as usize)
    }

    /// Adds the ring if it is independent of the rings already accepted.
    fn insert(&mut self, ring: &Ring) -> bool {
        let mut bits = vec![0u64; self.words];
        for index in &ring.bonds {
            bits[index / 64] ^= 1u64 << (index % 64);
        }
        while let Some(pivot) = Self::highest_bit(&bits) {
            match self.by_pivot.get(&pivot) {
                Some(row) => {
                    for (word, other) in bits.iter_mut().zip(row) {
                        *word ^= other;
                    }
                }
                None => {
                    self.by_pivot.insert(pivot, bits);
                    return true;
                }
            }
        }
        false
    }
}

/// Perceives the smallest set of smallest rings.
///
/// Candidate rings are the shortest cycles through each bond; they are
/// accepted smallest first as long as they are linearly independent, until
/// the cyclomatic number is reached.
pub fn find_small_rings(mol: &Molecule) -> RingSet {
    let target = cyclomatic_number(mol);
    if target == 0 {
        return RingSet::default();
    }

    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut candidates: Vec<Ring> = (0..mol.bond_count())
        .filter_map(|index| shortest_cycle_through(mol, index))
        .filter(|ring| {
            let mut key = ring.bonds.clone();
            key.sort_unstable();
            seen.insert(key)
        })
        .collect();
    candidates.sort_by_key(Ring::size);

    let mut basis = CycleBasis::new(mol.bond_count());
    let mut rings = Vec::with_capacity(target);
    for ring in candidates {
        if basis.insert(&ring) {
            rings.push(ring);
            if rings.len() == target {
                break;
            }
        }
    }
    RingSet::new(rings)
}
