use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a descriptor family in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptorKey {
    ALogP,
    XLogP,
    JPLogP,
    HBondDonorCount,
    HBondAcceptorCount,
    WienerNumbers,
    Tpsa,
    FractionalCSP3,
    RotatableBondCount,
    SmallRingCount,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown descriptor '{0}'")]
pub struct UnknownDescriptorError(pub String);

impl DescriptorKey {
    /// Every key, in catalog order.
    pub const ALL: [DescriptorKey; 10] = [
        Self::ALogP,
        Self::XLogP,
        Self::JPLogP,
        Self::HBondDonorCount,
        Self::HBondAcceptorCount,
        Self::WienerNumbers,
        Self::Tpsa,
        Self::FractionalCSP3,
        Self::RotatableBondCount,
        Self::SmallRingCount,
    ];

    /// Catalog identifier, also used as the stats key suffix.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::ALogP => "ALogP",
            Self::XLogP => "XLogP",
            Self::JPLogP => "JPLogP",
            Self::HBondDonorCount => "HBondDonorCount",
            Self::HBondAcceptorCount => "HBondAcceptorCount",
            Self::WienerNumbers => "WienerNumbers",
            Self::Tpsa => "TPSA",
            Self::FractionalCSP3 => "FractionalCSP3",
            Self::RotatableBondCount => "RotatableBondCount",
            Self::SmallRingCount => "SmallRingCount",
        }
    }

    /// Short command-line alias.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::ALogP => "alogp",
            Self::XLogP => "xlogp",
            Self::JPLogP => "jplogp",
            Self::HBondDonorCount => "hbd",
            Self::HBondAcceptorCount => "hba",
            Self::WienerNumbers => "wiener",
            Self::Tpsa => "tpsa",
            Self::FractionalCSP3 => "fcsp3",
            Self::RotatableBondCount => "rotb",
            Self::SmallRingCount => "rings",
        }
    }
}

impl fmt::Display for DescriptorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for DescriptorKey {
    type Err = UnknownDescriptorError;

    /// Accepts the catalog identifier (any case) or the command-line alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| {
                key.identifier().eq_ignore_ascii_case(trimmed)
                    || key.alias().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownDescriptorError(trimmed.to_string()))
    }
}
