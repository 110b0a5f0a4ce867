use super::{Descriptor, DescriptorError, DescriptorValue};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;

/// Counts N and O atoms carrying at least one hydrogen (implicit or explicit)
/// with a non-negative formal charge.
#[derive(Debug, Default, Clone, Copy)]
pub struct HBondDonorCount;

impl Descriptor for HBondDonorCount {
    fn name(&self) -> &'static str {
        "HBondDonorCount"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let count = mol
            .atoms_iter()
            .filter(|(_, atom)| matches!(atom.element, Element::N | Element::O))
            .filter(|(_, atom)| atom.formal_charge >= 0)
            .filter(|(id, _)| mol.hydrogen_count(*id) > 0)
            .count();
        Ok(DescriptorValue::Integer(count as i64))
    }
}

/// Counts oxygens and nitrogens able to accept a hydrogen bond.
///
/// Positively charged atoms never accept. Aromatic nitrogens whose lone pair
/// is part of the pi system (pyrrole-like: bearing a hydrogen or three ring
/// connections) are excluded.
#[derive(Debug, Default, Clone, Copy)]
pub struct HBondAcceptorCount;

impl Descriptor for HBondAcceptorCount {
    fn name(&self) -> &'static str {
        "HBondAcceptorCount"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let count = mol
            .atoms_iter()
            .filter(|(_, atom)| atom.formal_charge <= 0)
            .filter(|(id, atom)| match atom.element {
                Element::O => true,
                Element::N => {
                    let pyrrole_like = atom.aromatic
                        && (mol.hydrogen_count(*id) > 0 || mol.heavy_degree(*id) == 3);
                    !pyrrole_like
                }
                _ => false,
            })
            .count();
        Ok(DescriptorValue::Integer(count as i64))
    }
}
