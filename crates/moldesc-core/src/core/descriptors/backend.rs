use super::Descriptor;
use super::hbond::{HBondAcceptorCount, HBondDonorCount};
use super::key::DescriptorKey;
use super::logp::CrippenLogP;
use super::polar::PolarSurfaceArea;
use super::rings::SmallRingCount;
use super::topological::{FractionSp3, RotatableBonds, WienerNumbers};
use std::collections::HashMap;
use std::sync::Arc;

/// Source of descriptor algorithms, looked up by catalog key.
pub trait DescriptorBackend: Send + Sync {
    fn algorithm(&self, key: DescriptorKey) -> Option<Arc<dyn Descriptor>>;

    fn is_bound(&self, key: DescriptorKey) -> bool {
        self.algorithm(key).is_some()
    }
}

/// Graph-based implementations shipped with the library.
///
/// `XLogP` and `JPLogP` are not bound here.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceBackend;

impl DescriptorBackend for ReferenceBackend {
    fn algorithm(&self, key: DescriptorKey) -> Option<Arc<dyn Descriptor>> {
        let algorithm: Arc<dyn Descriptor> = match key {
            DescriptorKey::ALogP => Arc::new(CrippenLogP),
            DescriptorKey::HBondDonorCount => Arc::new(HBondDonorCount),
            DescriptorKey::HBondAcceptorCount => Arc::new(HBondAcceptorCount),
            DescriptorKey::WienerNumbers => Arc::new(WienerNumbers),
            DescriptorKey::Tpsa => Arc::new(PolarSurfaceArea),
            DescriptorKey::FractionalCSP3 => Arc::new(FractionSp3),
            DescriptorKey::RotatableBondCount => Arc::new(RotatableBonds),
            DescriptorKey::SmallRingCount => Arc::new(SmallRingCount),
            DescriptorKey::XLogP | DescriptorKey::JPLogP => return None,
        };
        Some(algorithm)
    }
}

/// Explicit bindings layered over a base backend.
pub struct OverrideBackend<B = ReferenceBackend> {
    base: B,
    overrides: HashMap<DescriptorKey, Arc<dyn Descriptor>>,
}

impl<B: DescriptorBackend> OverrideBackend<B> {
    pub fn new(base: B) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    pub fn with(mut self, key: DescriptorKey, algorithm: Arc<dyn Descriptor>) -> Self {
        self.overrides.insert(key, algorithm);
        self
    }
}

impl<B: DescriptorBackend> DescriptorBackend for OverrideBackend<B> {
    fn algorithm(&self, key: DescriptorKey) -> Option<Arc<dyn Descriptor>> {
        self.overrides
            .get(&key)
            .cloned()
            .or_else(|| self.base.algorithm(key))
    }
}
