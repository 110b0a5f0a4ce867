//! Small hand-built structures shared by unit tests.

use crate::core::chem;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;

use BondOrder::{Double, Single};

/// Builds and initializes a molecule from `(element, charge)` atoms and
/// zero-based `(a, b, order)` bonds.
pub(crate) fn build(
    title: &str,
    atoms: &[(Element, i8)],
    bonds: &[(usize, usize, BondOrder)],
) -> Molecule {
    let mut mol = Molecule::with_title(title);
    let ids: Vec<_> = atoms
        .iter()
        .enumerate()
        .map(|(i, (element, charge))| {
            let position = Point3::new(i as f64 * 1.5, 0.0, 0.0);
            mol.add_atom(Atom::new(*element, position).with_charge(*charge))
        })
        .collect();
    for (a, b, order) in bonds {
        mol.add_bond(ids[*a], ids[*b], *order)
            .expect("fixture bonds are valid");
    }
    chem::initialize(&mut mol);
    mol
}

fn chain(title: &str, elements: &[Element]) -> Molecule {
    let atoms: Vec<_> = elements.iter().map(|e| (*e, 0)).collect();
    let bonds: Vec<_> = (1..elements.len()).map(|i| (i - 1, i, Single)).collect();
    build(title, &atoms, &bonds)
}

pub(crate) fn ethanol() -> Molecule {
    chain("ethanol", &[Element::C, Element::C, Element::O])
}

pub(crate) fn butane() -> Molecule {
    chain("butane", &[Element::C; 4])
}

pub(crate) fn hexane() -> Molecule {
    chain("hexane", &[Element::C; 6])
}

pub(crate) fn acetic_acid() -> Molecule {
    build(
        "acetic acid",
        &[(Element::C, 0), (Element::C, 0), (Element::O, 0), (Element::O, 0)],
        &[(0, 1, Single), (1, 2, Double), (1, 3, Single)],
    )
}

pub(crate) fn benzene() -> Molecule {
    build(
        "benzene",
        &[(Element::C, 0); 6],
        &[
            (0, 1, Single),
            (1, 2, Double),
            (2, 3, Single),
            (3, 4, Double),
            (4, 5, Single),
            (5, 0, Double),
        ],
    )
}

pub(crate) fn pyridine() -> Molecule {
    build(
        "pyridine",
        &[
            (Element::N, 0),
            (Element::C, 0),
            (Element::C, 0),
            (Element::C, 0),
            (Element::C, 0),
            (Element::C, 0),
        ],
        &[
            (0, 1, Double),
            (1, 2, Single),
            (2, 3, Double),
            (3, 4, Single),
            (4, 5, Double),
            (5, 0, Single),
        ],
    )
}

pub(crate) fn cyclohexane() -> Molecule {
    let bonds: Vec<_> = (0..6).map(|i| (i, (i + 1) % 6, Single)).collect();
    build("cyclohexane", &[(Element::C, 0); 6], &bonds)
}

pub(crate) fn naphthalene() -> Molecule {
    build(
        "naphthalene",
        &[(Element::C, 0); 10],
        &[
            (0, 1, Double),
            (1, 2, Single),
            (2, 3, Double),
            (3, 4, Single),
            (4, 5, Double),
            (5, 0, Single),
            (4, 6, Single),
            (6, 7, Double),
            (7, 8, Single),
            (8, 9, Double),
            (9, 5, Single),
        ],
    )
}
