use super::{Descriptor, DescriptorError, DescriptorValue};
use crate::core::chem::rings::find_small_rings;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use std::collections::{HashMap, VecDeque};

/// Wiener path number and Wiener polarity number over the hydrogen-suppressed
/// graph.
///
/// The path number is the sum of topological distances over all pairs of
/// connected heavy atoms; the polarity number counts pairs three bonds apart.
#[derive(Debug, Default, Clone, Copy)]
pub struct WienerNumbers;

impl WienerNumbers {
    fn heavy_distances_from(mol: &Molecule, source: AtomId) -> HashMap<AtomId, usize> {
        let mut distances = HashMap::from([(source, 0)]);
        let mut queue = VecDeque::from([source]);
        while let Some(current) = queue.pop_front() {
            let next = distances[&current] + 1;
            for (neighbor, _) in mol.neighbors(current) {
                let heavy = mol.atom(*neighbor).is_some_and(|a| !a.is_hydrogen());
                if heavy && !distances.contains_key(neighbor) {
                    distances.insert(*neighbor, next);
                    queue.push_back(*neighbor);
                }
            }
        }
        distances
    }
}

impl Descriptor for WienerNumbers {
    fn name(&self) -> &'static str {
        "WienerNumbers"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let heavy: Vec<AtomId> = mol
            .atoms_iter()
            .filter(|(_, a)| !a.is_hydrogen())
            .map(|(id, _)| id)
            .collect();

        let mut path_sum = 0usize;
        let mut polarity = 0usize;
        for source in &heavy {
            for distance in Self::heavy_distances_from(mol, *source).values() {
                path_sum += distance;
                if *distance == 3 {
                    polarity += 1;
                }
            }
        }
        // Every pair was visited from both ends.
        Ok(DescriptorValue::RealVector(vec![
            path_sum as f64 / 2.0,
            polarity as f64 / 2.0,
        ]))
    }
}

/// Fraction of carbons that are sp3 hybridised (only single bonds, not
/// aromatic). Molecules without carbon score zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct FractionSp3;

impl Descriptor for FractionSp3 {
    fn name(&self) -> &'static str {
        "FractionalCSP3"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let mut carbons = 0usize;
        let mut sp3 = 0usize;
        for (id, atom) in mol.atoms_iter().filter(|(_, a)| a.element.is_carbon()) {
            carbons += 1;
            let saturated = !atom.aromatic
                && mol.neighbors(id).iter().all(|(_, b)| {
                    mol.bond(*b)
                        .is_some_and(|b| b.order == BondOrder::Single && !b.aromatic)
                });
            if saturated {
                sp3 += 1;
            }
        }
        let fraction = if carbons == 0 {
            0.0
        } else {
            sp3 as f64 / carbons as f64
        };
        Ok(DescriptorValue::Real(fraction))
    }
}

/// Counts single, acyclic bonds between two non-terminal heavy atoms.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotatableBonds;

impl Descriptor for RotatableBonds {
    fn name(&self) -> &'static str {
        "RotatableBondCount"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let rings = find_small_rings(mol);
        let count = mol
            .bonds()
            .iter()
            .enumerate()
            .filter(|(_, bond)| bond.order == BondOrder::Single && !bond.aromatic)
            .filter(|(index, _)| !rings.bond_in_ring(*index))
            .filter(|(_, bond)| {
                [bond.atom1_id, bond.atom2_id].into_iter().all(|id| {
                    mol.atom(id).is_some_and(|a| !a.is_hydrogen()) && mol.heavy_degree(id) > 1
                })
            })
            .count();
        Ok(DescriptorValue::Integer(count as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::hydrogens::with_explicit_hydrogens;
    use crate::core::testing;

    #[test]
    fn wiener_numbers_of_butane() {
        assert_eq!(
            WienerNumbers.compute(&testing::butane()).unwrap(),
            DescriptorValue::RealVector(vec![10.0, 1.0])
        );
    }

    #[test]
    fn wiener_numbers_ignore_explicit_hydrogens() {
        let explicit = with_explicit_hydrogens(&testing::ethanol()).unwrap();
        assert_eq!(
            WienerNumbers.compute(&explicit).unwrap(),
            DescriptorValue::RealVector(vec![4.0, 0.0])
        );
    }

    #[test]
    fn wiener_numbers_of_hexane() {
        assert_eq!(
            WienerNumbers.compute(&testing::hexane()).unwrap(),
            DescriptorValue::RealVector(vec![35.0, 3.0])
        );
    }

    #[test]
    fn fraction_sp3_across_saturation_levels() {
        assert_eq!(
            FractionSp3.compute(&testing::cyclohexane()).unwrap(),
            DescriptorValue::Real(1.0)
        );
        assert_eq!(
            FractionSp3.compute(&testing::benzene()).unwrap(),
            DescriptorValue::Real(0.0)
        );
        assert_eq!(
            FractionSp3.compute(&testing::acetic_acid()).unwrap(),
            DescriptorValue::Real(0.5)
        );
    }

    #[test]
    fn fraction_sp3_without_carbon_is_zero() {
        assert_eq!(
            FractionSp3.compute(&Molecule::new()).unwrap(),
            DescriptorValue::Real(0.0)
        );
    }

    #[test]
    fn rotatable_bonds_skip_terminal_and_ring_bonds() {
        assert_eq!(
            RotatableBonds.compute(&testing::butane()).unwrap(),
            DescriptorValue::Integer(1)
        );
        assert_eq!(
            RotatableBonds.compute(&testing::hexane()).unwrap(),
            DescriptorValue::Integer(3)
        );
        assert_eq!(
            RotatableBonds.compute(&testing::ethanol()).unwrap(),
            DescriptorValue::Integer(0)
        );
        assert_eq!(
            RotatableBonds.compute(&testing::cyclohexane()).unwrap(),
            DescriptorValue::Integer(0)
        );
    }

    #[test]
    fn rotatable_bonds_are_stable_under_explicit_hydrogens() {
        let explicit = with_explicit_hydrogens(&testing::butane()).unwrap();
        assert_eq!(
            RotatableBonds.compute(&explicit).unwrap(),
            DescriptorValue::Integer(1)
        );
    }
}
