use super::element::Element;
use nalgebra::Point3;

/// An atom of a molecular graph.
///
/// Hydrogens may be present either as explicit `Atom`s bonded to their heavy
/// atom or folded into `implicit_hydrogens` on the heavy atom; the hydrogenation
/// transforms in [`crate::core::chem::hydrogens`] move between the two forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The chemical element.
    pub element: Element,
    /// Cartesian coordinates in Angstroms. Purely carried through to output.
    pub position: Point3<f64>,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Number of hydrogens attached to this atom but not stored as atoms.
    pub implicit_hydrogens: u8,
    /// Set by aromaticity perception or by aromatic input bonds.
    pub aromatic: bool,
}

impl Atom {
    /// Creates a neutral, non-aromatic atom without implicit hydrogens.
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self {
            element,
            position,
            formal_charge: 0,
            implicit_hydrogens: 0,
            aromatic: false,
        }
    }

    pub fn with_charge(mut self, formal_charge: i8) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    pub fn with_implicit_hydrogens(mut self, count: u8) -> Self {
        self.implicit_hydrogens = count;
        self
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element.is_hydrogen()
    }
}
