use super::{Descriptor, DescriptorError, DescriptorValue};
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;

/// Local bonding pattern used to look up a fragment contribution.
#[derive(Debug, Clone, Copy)]
struct Environment {
    heavy: usize,
    hydrogens: usize,
    doubles: usize,
    triples: usize,
    aromatic: bool,
    charge: i8,
}

fn environment(mol: &Molecule, id: AtomId) -> Option<Environment> {
    let atom = mol.atom(id)?;
    let mut doubles = 0;
    let mut triples = 0;
    for (neighbor, bond_index) in mol.neighbors(id) {
        if mol.atom(*neighbor).is_some_and(|a| a.is_hydrogen()) {
            continue;
        }
        match mol.bond(*bond_index).map(|b| b.order) {
            Some(BondOrder::Double) => doubles += 1,
            Some(BondOrder::Triple) => triples += 1,
            _ => {}
        }
    }
    Some(Environment {
        heavy: mol.heavy_degree(id),
        hydrogens: mol.hydrogen_count(id),
        doubles,
        triples,
        aromatic: atom.aromatic,
        charge: atom.formal_charge,
    })
}

fn nitrogen(env: Environment) -> f64 {
    let Environment {
        heavy,
        hydrogens: h,
        doubles,
        triples,
        aromatic,
        charge,
    } = env;

    if charge > 0 {
        return match (aromatic, h, doubles, triples) {
            (true, 0, _, _) => 3.88,
            (true, _, _, _) => 14.14,
            (false, 0, 0, 0) => 0.0,
            (false, 0, _, 0) => 3.01,
            (false, 0, _, _) => 4.36,
            (false, 1, 0, _) => 4.44,
            (false, 1, _, _) => 13.97,
            (false, 2, 0, _) => 16.61,
            (false, 2, _, _) => 25.59,
            _ => 27.64,
        };
    }
    if aromatic {
        return match (heavy, h) {
            (_, 1..) => 15.79,
            (2, 0) => 12.89,
            _ => 4.41,
        };
    }
    match (heavy, h, doubles, triples) {
        (3, 0, 0, 0) => 3.24,
        (2, 0, 1, 0) => 12.36,
        (1, 0, 0, 1) => 23.79,
        (3, 0, 1, 0) => 11.68,
        (2, 1, 0, 0) => 12.03,
        (1, 1, 1, 0) => 23.85,
        (1, 2, 0, 0) => 26.02,
        (_, 0, _, _) => 3.24,
        (_, 1, _, _) => 12.03,
        _ => 26.02,
    }
}

fn oxygen(env: Environment) -> f64 {
    if env.charge < 0 {
        return 23.06;
    }
    if env.aromatic {
        return 13.14;
    }
    match (env.heavy, env.hydrogens, env.doubles) {
        (_, 0, 1..) => 17.07,
        (2, 0, 0) => 9.23,
        (_, 1.., _) => 20.23,
        _ => 9.23,
    }
}

/// Topological polar surface area from nitrogen and oxygen fragment
/// contributions (Ertl, Rohde and Selzer, 2000), in square Angstroms.
///
/// Hydrogens are counted whether implicit or explicit, so any hydrogenation
/// form gives the same result.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolarSurfaceArea;

impl Descriptor for PolarSurfaceArea {
    fn name(&self) -> &'static str {
        "TPSA"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        let mut area = 0.0;
        for (id, atom) in mol.atoms_iter() {
            let Some(env) = environment(mol, id) else {
                continue;
            };
            area += match atom.element {
                Element::N => nitrogen(env),
                Element::O => oxygen(env),
                _ => 0.0,
            };
        }
        Ok(DescriptorValue::Real(area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::hydrogens::with_explicit_hydrogens;
    use crate::core::models::topology::BondOrder::{Single, Triple};
    use crate::core::testing;

    fn tpsa(mol: &Molecule) -> f64 {
        match PolarSurfaceArea.compute(mol).unwrap() {
            DescriptorValue::Real(v) => v,
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn hydrocarbons_have_no_polar_surface() {
        assert_eq!(tpsa(&testing::hexane()), 0.0);
        assert_eq!(tpsa(&testing::benzene()), 0.0);
    }

    #[test]
    fn acetic_acid_sums_carbonyl_and_hydroxyl() {
        assert!((tpsa(&testing::acetic_acid()) - 37.30).abs() < 1e-9);
    }

    #[test]
    fn pyridine_nitrogen_contributes_aromatic_value() {
        assert!((tpsa(&testing::pyridine()) - 12.89).abs() < 1e-9);
    }

    #[test]
    fn nitrile_and_amine_nitrogens() {
        let acetonitrile = testing::build(
            "acetonitrile",
            &[(Element::C, 0), (Element::C, 0), (Element::N, 0)],
            &[(0, 1, Single), (1, 2, Triple)],
        );
        assert!((tpsa(&acetonitrile) - 23.79).abs() < 1e-9);

        let methylamine = testing::build(
            "methylamine",
            &[(Element::C, 0), (Element::N, 0)],
            &[(0, 1, Single)],
        );
        assert!((tpsa(&methylamine) - 26.02).abs() < 1e-9);
    }

    #[test]
    fn explicit_hydrogens_do_not_change_the_area() {
        let mol = testing::ethanol();
        let explicit = with_explicit_hydrogens(&mol).unwrap();
        assert!((tpsa(&mol) - tpsa(&explicit)).abs() < 1e-9);
        assert!((tpsa(&mol) - 20.23).abs() < 1e-9);
    }
}
