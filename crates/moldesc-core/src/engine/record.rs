use crate::core::chem::hydrogens::{
    DerivationError, with_explicit_hydrogens, with_implicit_hydrogens,
};
use crate::core::models::molecule::Molecule;
use crate::core::models::property::PropertyValue;
use indexmap::IndexSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hydrogenation form of a molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    /// The structure as read, never replaced.
    #[default]
    Original,
    /// Every hydrogen is an explicit atom.
    ExplicitHydrogens,
    /// Terminal hydrogens are folded into implicit counts.
    ImplicitHydrogens,
}

const DERIVED_SLOTS: usize = 2;

impl Representation {
    pub const ALL: [Representation; 3] = [
        Self::Original,
        Self::ExplicitHydrogens,
        Self::ImplicitHydrogens,
    ];

    /// Cache slot of a derived form; the original is stored outside the table.
    const fn slot(self) -> Option<usize> {
        match self {
            Self::Original => None,
            Self::ExplicitHydrogens => Some(0),
            Self::ImplicitHydrogens => Some(1),
        }
    }

    const fn from_slot(slot: usize) -> Self {
        match slot {
            0 => Self::ExplicitHydrogens,
            _ => Self::ImplicitHydrogens,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::ExplicitHydrogens => "explicit-hydrogens",
            Self::ImplicitHydrogens => "implicit-hydrogens",
        }
    }

    fn derive(self, original: &Molecule) -> Result<Molecule, DerivationError> {
        match self {
            Self::Original => Ok(original.clone()),
            Self::ExplicitHydrogens => with_explicit_hydrogens(original),
            Self::ImplicitHydrogens => with_implicit_hydrogens(original),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown representation '{0}' (expected original, explicit-hydrogens or implicit-hydrogens)")]
pub struct ParseRepresentationError(String);

impl FromStr for Representation {
    type Err = ParseRepresentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" | "none" => Ok(Self::Original),
            "explicit-hydrogens" | "explicit" | "addhs" => Ok(Self::ExplicitHydrogens),
            "implicit-hydrogens" | "implicit" | "removehs" => Ok(Self::ImplicitHydrogens),
            _ => Err(ParseRepresentationError(s.trim().to_string())),
        }
    }
}

/// One input molecule together with its lazily derived representations.
///
/// Derived forms are computed on first request and cached for the lifetime
/// of the record; later requests return the same instance. Property writes go
/// to the original and to every form cached at the time of the write. A form
/// derived afterwards does not receive properties annotated before it existed.
#[derive(Debug, Clone)]
pub struct MoleculeRecord {
    original: Molecule,
    derived: [Option<Molecule>; DERIVED_SLOTS],
    annotated: IndexSet<String>,
    derivations: usize,
}

impl MoleculeRecord {
    pub fn new(original: Molecule) -> Self {
        Self {
            original,
            derived: Default::default(),
            annotated: IndexSet::new(),
            derivations: 0,
        }
    }

    pub fn original(&self) -> &Molecule {
        &self.original
    }

    /// Returns the requested form, deriving and caching it on first use.
    pub fn representation(&mut self, tag: Representation) -> Result<&Molecule, DerivationError> {
        let Some(slot) = tag.slot() else {
            return Ok(&self.original);
        };
        let cell = &mut self.derived[slot];
        let molecule = match cell.take() {
            Some(cached) => cached,
            None => {
                let mut derived = tag.derive(&self.original)?;
                for name in &self.annotated {
                    derived.remove_property(name);
                }
                self.derivations += 1;
                derived
            }
        };
        Ok(cell.insert(molecule))
    }

    /// Cache membership only; never derives. The original is not part of the
    /// cache, so `has_representation(Original)` is always `false`.
    pub fn has_representation(&self, tag: Representation) -> bool {
        tag.slot().is_some_and(|slot| self.derived[slot].is_some())
    }

    /// A cached form without deriving it. The original is always available.
    pub fn cached(&self, tag: Representation) -> Option<&Molecule> {
        match tag.slot() {
            None => Some(&self.original),
            Some(slot) => self.derived[slot].as_ref(),
        }
    }

    /// Derived forms currently held in the cache.
    pub fn materialized(&self) -> impl Iterator<Item = Representation> + '_ {
        self.derived
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(|(slot, _)| Representation::from_slot(slot))
    }

    /// How many derivations this record has performed.
    pub fn derivation_count(&self) -> usize {
        self.derivations
    }

    /// Writes a property to the original and to every cached form.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        for derived in self.derived.iter_mut().flatten() {
            derived.set_property(name, value.clone());
        }
        self.original.set_property(name, value);
        self.annotated.insert(name.to_string());
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.original.property(name)
    }

    /// Names written through [`set_property`](Self::set_property), in first-write order.
    pub fn annotated_properties(&self) -> impl Iterator<Item = &str> {
        self.annotated.iter().map(String::as_str)
    }

    /// Consumes the record and returns the requested form carrying every
    /// annotation made on the record, including those written before the form
    /// was derived.
    pub fn into_annotated(mut self, tag: Representation) -> Result<Molecule, DerivationError> {
        let Some(slot) = tag.slot() else {
            return Ok(self.original);
        };
        let mut molecule = match self.derived[slot].take() {
            Some(cached) => cached,
            None => tag.derive(&self.original)?,
        };
        for name in &self.annotated {
            if let Some(value) = self.original.property(name) {
                molecule.set_property(name.as_str(), value.clone());
            }
        }
        Ok(molecule)
    }

    pub fn into_original(self) -> Molecule {
        self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing;

    #[test]
    fn original_is_returned_without_derivation() {
        let mut record = MoleculeRecord::new(testing::ethanol());
        let original: *const Molecule = record.original();
        let returned: *const Molecule = record.representation(Representation::Original).unwrap();
        assert!(std::ptr::eq(original, returned));
        assert_eq!(record.derivation_count(), 0);
        assert!(!record.has_representation(Representation::Original));
    }

    #[test]
    fn derived_forms_are_cached_and_returned_identically() {
        let mut record = MoleculeRecord::new(testing::ethanol());
        assert!(!record.has_representation(Representation::ExplicitHydrogens));

        let first: *const Molecule = record
            .representation(Representation::ExplicitHydrogens)
            .unwrap();
        let second: *const Molecule = record
            .representation(Representation::ExplicitHydrogens)
            .unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(record.derivation_count(), 1);
        assert!(record.has_representation(Representation::ExplicitHydrogens));
        assert!(!record.has_representation(Representation::ImplicitHydrogens));
        assert_eq!(
            record.cached(Representation::ExplicitHydrogens).unwrap().atom_count(),
            9
        );
    }

    #[test]
    fn property_writes_reach_every_materialized_form() {
        let mut record = MoleculeRecord::new(testing::ethanol());
        record.representation(Representation::ExplicitHydrogens).unwrap();
        record.representation(Representation::ImplicitHydrogens).unwrap();
        record.set_property("TPSA", PropertyValue::Real(20.23));

        for tag in Representation::ALL {
            assert_eq!(
                record.cached(tag).unwrap().property("TPSA"),
                Some(&PropertyValue::Real(20.23)),
                "missing on {tag}"
            );
        }
    }

    #[test]
    fn forms_derived_later_do_not_receive_earlier_writes() {
        let mut record = MoleculeRecord::new(testing::ethanol());
        record.set_property("HBD", PropertyValue::Integer(1));
        let explicit = record
            .representation(Representation::ExplicitHydrogens)
            .unwrap();
        assert!(explicit.property("HBD").is_none());

        record.set_property("ALogP", PropertyValue::Real(0.5));
        let explicit = record.cached(Representation::ExplicitHydrogens).unwrap();
        assert_eq!(explicit.property("ALogP"), Some(&PropertyValue::Real(0.5)));
        assert_eq!(record.property("HBD"), Some(&PropertyValue::Integer(1)));
    }

    #[test]
    fn input_properties_are_kept_on_derived_forms() {
        let mut mol = testing::ethanol();
        mol.set_property("ID", "MOL-1");
        let mut record = MoleculeRecord::new(mol);
        let explicit = record
            .representation(Representation::ExplicitHydrogens)
            .unwrap();
        assert_eq!(explicit.property("ID"), Some(&PropertyValue::Text("MOL-1".into())));
    }

    #[test]
    fn into_annotated_completes_the_output_form() {
        let mut record = MoleculeRecord::new(testing::ethanol());
        record.set_property("HBD", PropertyValue::Integer(1));
        record.representation(Representation::ExplicitHydrogens).unwrap();
        record.set_property("ALogP", PropertyValue::Real(0.5));

        let output = record.into_annotated(Representation::ExplicitHydrogens).unwrap();
        assert_eq!(output.atom_count(), 9);
        let names: Vec<_> = output.properties().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, vec!["ALogP", "HBD"]);
    }

    #[test]
    fn materialized_lists_cached_forms() {
        let mut record = MoleculeRecord::new(testing::ethanol());
        assert_eq!(record.materialized().count(), 0);
        record.representation(Representation::ImplicitHydrogens).unwrap();
        assert_eq!(
            record.materialized().collect::<Vec<_>>(),
            vec![Representation::ImplicitHydrogens]
        );
    }

    #[test]
    fn representation_names_parse_back() {
        for tag in Representation::ALL {
            assert_eq!(tag.name().parse::<Representation>().unwrap(), tag);
        }
        assert_eq!(
            "explicit".parse::<Representation>().unwrap(),
            Representation::ExplicitHydrogens
        );
        assert!("both".parse::<Representation>().is_err());
    }
}
