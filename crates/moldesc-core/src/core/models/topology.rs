use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Maps an MDL CTfile bond type code to a bond order.
    pub fn from_ctfile(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            _ => None,
        }
    }

    pub fn to_ctfile(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Aromatic => 4,
        }
    }

    /// Integral valence consumed by the bond. Aromatic bonds are handled by
    /// the valence model and count as one here.
    pub fn multiplicity(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "4" | "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Triple => "Triple",
            Self::Aromatic => "Aromatic",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub order: BondOrder,
    /// Aromaticity flag; independent of `order` so Kekulé input keeps its
    /// alternating orders after perception.
    pub aromatic: bool,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Self {
        Self {
            atom1_id,
            atom2_id,
            order,
            aromatic: order == BondOrder::Aromatic,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// The partner of `atom_id` in this bond, if `atom_id` is an endpoint.
    pub fn other(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn ctfile_codes_map_both_ways() {
        for code in 1..=4u8 {
            let order = BondOrder::from_ctfile(code).unwrap();
            assert_eq!(order.to_ctfile(), code);
        }
        assert_eq!(BondOrder::from_ctfile(0), None);
        assert_eq!(BondOrder::from_ctfile(8), None);
    }

    #[test]
    fn bond_order_from_str_accepts_codes_and_names() {
        assert_eq!("2".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("T".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert!("quadruple".parse::<BondOrder>().is_err());
    }

    #[test]
    fn aromatic_order_sets_the_aromatic_flag() {
        let a = dummy_atom_id(1);
        let b = dummy_atom_id(2);
        assert!(Bond::new(a, b, BondOrder::Aromatic).aromatic);
        assert!(!Bond::new(a, b, BondOrder::Double).aromatic);
    }

    #[test]
    fn other_returns_the_partner_atom() {
        let a = dummy_atom_id(10);
        let b = dummy_atom_id(20);
        let c = dummy_atom_id(30);
        let bond = Bond::new(a, b, BondOrder::Single);
        assert_eq!(bond.other(a), Some(b));
        assert_eq!(bond.other(b), Some(a));
        assert_eq!(bond.other(c), None);
        assert!(bond.contains(a));
        assert!(!bond.contains(c));
    }
}
