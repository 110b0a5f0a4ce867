use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements understood by the structure model.
///
/// The set covers organic chemistry plus the counter-ions and metals that
/// commonly appear in screening libraries. Elements outside the set are
/// rejected when a structure is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    H,
    Li,
    B,
    C,
    N,
    O,
    F,
    Na,
    Mg,
    Si,
    P,
    S,
    Cl,
    K,
    Ca,
    Fe,
    Zn,
    Se,
    Br,
    I,
}

static SYMBOL_TABLE: Map<&'static str, Element> = phf_map! {
    "H" => Element::H,
    "D" => Element::H,
    "T" => Element::H,
    "Li" => Element::Li,
    "B" => Element::B,
    "C" => Element::C,
    "N" => Element::N,
    "O" => Element::O,
    "F" => Element::F,
    "Na" => Element::Na,
    "Mg" => Element::Mg,
    "Si" => Element::Si,
    "P" => Element::P,
    "S" => Element::S,
    "Cl" => Element::Cl,
    "K" => Element::K,
    "Ca" => Element::Ca,
    "Fe" => Element::Fe,
    "Zn" => Element::Zn,
    "Se" => Element::Se,
    "Br" => Element::Br,
    "I" => Element::I,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol '{0}'")]
pub struct UnknownElementError(pub String);

impl Element {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::H => "H",
            Self::Li => "Li",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Na => "Na",
            Self::Mg => "Mg",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
            Self::Ca => "Ca",
            Self::Fe => "Fe",
            Self::Zn => "Zn",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
        }
    }

    pub fn atomic_number(&self) -> u8 {
        match self {
            Self::H => 1,
            Self::Li => 3,
            Self::B => 5,
            Self::C => 6,
            Self::N => 7,
            Self::O => 8,
            Self::F => 9,
            Self::Na => 11,
            Self::Mg => 12,
            Self::Si => 14,
            Self::P => 15,
            Self::S => 16,
            Self::Cl => 17,
            Self::K => 19,
            Self::Ca => 20,
            Self::Fe => 26,
            Self::Zn => 30,
            Self::Se => 34,
            Self::Br => 35,
            Self::I => 53,
        }
    }

    /// Neutral-atom valences, smallest first, used to infer implicit hydrogens.
    ///
    /// Metals return an empty slice: they never receive implicit hydrogens.
    pub fn default_valences(&self) -> &'static [u8] {
        match self {
            Self::H | Self::F | Self::Cl | Self::Br | Self::I => &[1],
            Self::B => &[3],
            Self::C | Self::Si => &[4],
            Self::N => &[3],
            Self::O => &[2],
            Self::P => &[3, 5],
            Self::S | Self::Se => &[2, 4, 6],
            Self::Li | Self::Na | Self::Mg | Self::K | Self::Ca | Self::Fe | Self::Zn => &[],
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Self::H)
    }

    #[inline]
    pub fn is_carbon(&self) -> bool {
        matches!(self, Self::C)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = UnknownElementError;

    /// Parses an element symbol. Lookups are exact first, then retried with
    /// the conventional capitalisation so that `CL` and `cl` resolve to chlorine.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(element) = SYMBOL_TABLE.get(trimmed) {
            return Ok(*element);
        }
        let mut normalized = String::with_capacity(trimmed.len());
        for (i, c) in trimmed.chars().enumerate() {
            if i == 0 {
                normalized.push(c.to_ascii_uppercase());
            } else {
                normalized.push(c.to_ascii_lowercase());
            }
        }
        SYMBOL_TABLE
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| UnknownElementError(trimmed.to_string()))
    }
}
