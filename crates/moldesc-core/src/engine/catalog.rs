use super::calculator::WriteRule;
use super::record::Representation;
use crate::core::descriptors::key::DescriptorKey;

pub const ALOGP: &str = "ALogP";
pub const ALOGP2: &str = "ALogP2";
pub const AMR: &str = "AMR";
pub const XLOGP: &str = "XLogP";
pub const JPLOGP: &str = "JPLogP";
pub const HBD: &str = "HBD";
pub const HBA: &str = "HBA";
pub const WIENER_PATH: &str = "WienerPath";
pub const WIENER_POLARITY: &str = "WienerPolarity";
pub const TPSA: &str = "TPSA";
pub const FCSP3: &str = "FCSP3";
pub const ROTB: &str = "ROTB";
pub const RING_COUNT: &str = "RingCount";
pub const RING_COUNT_AROMATIC: &str = "RingCountAromatic";
pub const RING_SYSTEMS: &str = "RingSystems";
pub const RING_SYSTEMS_AROMATIC: &str = "RingSystemsAromatic";

/// Construction metadata of one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorSpec {
    pub key: DescriptorKey,
    pub representation: Representation,
    pub property_names: &'static [&'static str],
    pub rule: WriteRule,
    pub description: &'static str,
}

impl DescriptorSpec {
    /// Number of properties the descriptor writes.
    pub fn arity(&self) -> usize {
        self.property_names.len()
    }

    pub fn default_names(&self) -> Vec<String> {
        self.property_names.iter().map(|s| s.to_string()).collect()
    }
}

/// Immutable table of every known descriptor.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<DescriptorSpec>,
}

impl Catalog {
    pub fn standard() -> Self {
        use DescriptorKey as K;
        use Representation::{ExplicitHydrogens, Original};
        use WriteRule::*;

        let entry = |key: DescriptorKey,
                     representation: Representation,
                     property_names: &'static [&'static str],
                     rule: WriteRule,
                     description: &'static str| DescriptorSpec {
            key,
            representation,
            property_names,
            rule,
            description,
        };

        Self {
            entries: vec![
                entry(
                    K::ALogP,
                    ExplicitHydrogens,
                    &[ALOGP, ALOGP2, AMR],
                    VectorReal,
                    "Ghose-Crippen atom-contribution logP, its square and molar refractivity",
                ),
                entry(
                    K::XLogP,
                    ExplicitHydrogens,
                    &[XLOGP],
                    ScalarReal,
                    "XLogP atom-typed partition coefficient",
                ),
                entry(
                    K::JPLogP,
                    ExplicitHydrogens,
                    &[JPLOGP],
                    ScalarReal,
                    "JPlogP atom-typed partition coefficient",
                ),
                entry(
                    K::HBondDonorCount,
                    Original,
                    &[HBD],
                    ScalarInteger,
                    "Hydrogen bond donors (N and O carrying hydrogens)",
                ),
                entry(
                    K::HBondAcceptorCount,
                    Original,
                    &[HBA],
                    ScalarInteger,
                    "Hydrogen bond acceptors (N and O with free lone pairs)",
                ),
                entry(
                    K::WienerNumbers,
                    Original,
                    &[WIENER_PATH, WIENER_POLARITY],
                    VectorReal,
                    "Wiener path number and Wiener polarity number",
                ),
                entry(
                    K::Tpsa,
                    Original,
                    &[TPSA],
                    ScalarReal,
                    "Topological polar surface area from N and O fragments",
                ),
                entry(
                    K::FractionalCSP3,
                    Original,
                    &[FCSP3],
                    ScalarReal,
                    "Fraction of sp3-hybridised carbons",
                ),
                entry(
                    K::RotatableBondCount,
                    Original,
                    &[ROTB],
                    ScalarInteger,
                    "Rotatable bonds between non-terminal heavy atoms",
                ),
                entry(
                    K::SmallRingCount,
                    Original,
                    &[
                        RING_COUNT,
                        RING_COUNT_AROMATIC,
                        RING_SYSTEMS,
                        RING_SYSTEMS_AROMATIC,
                    ],
                    VectorInteger,
                    "Small rings, aromatic rings, ring systems and aromatic ring systems",
                ),
            ],
        }
    }

    pub fn spec(&self, key: DescriptorKey) -> Option<&DescriptorSpec> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn contains(&self, key: DescriptorKey) -> bool {
        self.spec(key).is_some()
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &DescriptorSpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
