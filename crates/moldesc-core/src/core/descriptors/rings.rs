use super::{Descriptor, DescriptorError, DescriptorValue};
use crate::core::chem::rings::{Ring, find_small_rings};
use crate::core::models::molecule::Molecule;

pub const MIN_SMALL_RING: usize = 3;
pub const MAX_SMALL_RING: usize = 9;

/// Ring statistics over the smallest set of smallest rings.
///
/// The result vector is laid out as
/// `[small rings, aromatic rings, ring systems, aromatic ring systems,
/// rings of size 3, 4, ..., 9]`. Small rings are those of size 3 to 9. A ring
/// is aromatic when all of its bonds are; a ring system is aromatic when it
/// contains at least one aromatic ring.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallRingCount;

impl Descriptor for SmallRingCount {
    fn name(&self) -> &'static str {
        "SmallRingCount"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let rings = find_small_rings(mol);
        let is_aromatic = |ring: &Ring| {
            ring.bonds
                .iter()
                .all(|i| mol.bond(*i).is_some_and(|b| b.aromatic))
        };
        let aromatic_flags: Vec<bool> = rings.iter().map(is_aromatic).collect();

        let mut by_size = [0i64; MAX_SMALL_RING - MIN_SMALL_RING + 1];
        let mut small = 0i64;
        let mut aromatic = 0i64;
        for (ring, flag) in rings.iter().zip(&aromatic_flags) {
            if (MIN_SMALL_RING..=MAX_SMALL_RING).contains(&ring.size()) {
                small += 1;
                by_size[ring.size() - MIN_SMALL_RING] += 1;
            }
            if *flag {
                aromatic += 1;
            }
        }

        let systems = rings.systems();
        let aromatic_systems = systems
            .iter()
            .filter(|members| members.iter().any(|i| aromatic_flags[*i]))
            .count() as i64;

        let mut values = vec![small, aromatic, systems.len() as i64, aromatic_systems];
        values.extend_from_slice(&by_size);
        Ok(DescriptorValue::IntegerVector(values))
    }
}
