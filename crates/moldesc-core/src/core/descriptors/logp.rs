use super::{Descriptor, DescriptorError, DescriptorValue};
use crate::core::chem::rings::{RingSet, find_small_rings};
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

const NAME: &str = "ALogP";

/// `(logP, molar refractivity)` contribution of one atom.
type Contribution = (f64, f64);

const HYDROGEN_ON_CARBON: Contribution = (0.1230, 1.057);
const HYDROGEN_ON_HETEROATOM: Contribution = (-0.2677, 1.057);

/// Atom-contribution octanol/water partition coefficient in the style of
/// Ghose-Crippen and Wildman-Crippen, with molar refractivity.
///
/// Produces `[logP, logP², MR]`. Hydrogens must be explicit atoms so that
/// each one is typed by its own neighbour; a structure with implicit
/// hydrogens is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrippenLogP;

struct AtomEnvironment {
    heavy_degree: usize,
    in_ring: bool,
    has_double_bond: bool,
    has_hetero_neighbor: bool,
}

fn environment(mol: &Molecule, rings: &RingSet, id: AtomId) -> AtomEnvironment {
    let neighbors = mol.neighbors(id);
    AtomEnvironment {
        heavy_degree: mol.heavy_degree(id),
        in_ring: rings.atom_in_ring(id),
        has_double_bond: neighbors
            .iter()
            .any(|(_, b)| mol.bond(*b).is_some_and(|b| b.order == BondOrder::Double)),
        has_hetero_neighbor: neighbors.iter().any(|(n, _)| {
            mol.atom(*n)
                .is_some_and(|a| !matches!(a.element, Element::C | Element::H))
        }),
    }
}

fn heavy_atom_contribution(
    element: Element,
    charge: i8,
    aromatic: bool,
    env: &AtomEnvironment,
) -> Option<Contribution> {
    let contribution = match element {
        Element::C if aromatic && env.has_hetero_neighbor => (-0.14, 3.509),
        Element::C if aromatic => (0.296, 3.509),
        Element::C if env.has_double_bond && env.has_hetero_neighbor => (-0.03, 3.509),
        Element::C if env.has_double_bond => (0.08, 3.509),
        Element::C if env.in_ring || env.heavy_degree <= 2 => (0.1441, 3.509),
        Element::C if env.heavy_degree == 3 => (0.0, 3.509),
        Element::C => (-0.04, 3.509),
        Element::N if aromatic => (-0.3187, 2.188),
        Element::N if charge > 0 => (-1.0190, 2.188),
        Element::N if env.has_double_bond => (-0.5262, 2.188),
        Element::N => (-0.4458, 2.262),
        Element::O if charge < 0 => (-1.189, 1.476),
        Element::O if env.has_double_bond => (-0.3339, 1.476),
        Element::O if env.heavy_degree >= 2 => (-0.2893, 1.476),
        Element::O => (-0.3567, 1.476),
        Element::F => (0.4118, 1.108),
        Element::P => (0.2836, 6.920),
        Element::S if env.has_double_bond => (-0.1084, 7.365),
        Element::S if charge != 0 => (-0.5188, 7.365),
        Element::S => (0.6237, 7.365),
        Element::Cl => (0.6895, 5.853),
        Element::Br => (0.8813, 8.927),
        Element::I => (1.050, 13.940),
        _ => return None,
    };
    Some(contribution)
}

impl CrippenLogP {
    /// Sums atom contributions into `(logP, MR)`.
    pub fn contributions(&self, mol: &Molecule) -> Result<Contribution, DescriptorError> {
        let rings = find_small_rings(mol);
        let mut logp = 0.0;
        let mut mr = 0.0;

        for (index, (id, atom)) in mol.atoms_iter().enumerate() {
            let position = index + 1;
            if atom.implicit_hydrogens > 0 {
                return Err(DescriptorError::ImplicitHydrogens {
                    descriptor: NAME,
                    position,
                    count: atom.implicit_hydrogens,
                });
            }

            let (lp, m) = if atom.is_hydrogen() {
                let on_carbon = mol
                    .neighbors(id)
                    .first()
                    .and_then(|(n, _)| mol.atom(*n))
                    .is_some_and(|a| a.element.is_carbon());
                if on_carbon {
                    HYDROGEN_ON_CARBON
                } else {
                    HYDROGEN_ON_HETEROATOM
                }
            } else {
                let env = environment(mol, &rings, id);
                heavy_atom_contribution(atom.element, atom.formal_charge, atom.aromatic, &env)
                    .ok_or(DescriptorError::UnsupportedAtom {
                        descriptor: NAME,
                        position,
                        element: atom.element,
                    })?
            };
            logp += lp;
            mr += m;
        }
        Ok((logp, mr))
    }
}

impl Descriptor for CrippenLogP {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let (logp, mr) = self.contributions(mol)?;
        Ok(DescriptorValue::RealVector(vec![logp, logp * logp, mr]))
    }
}
