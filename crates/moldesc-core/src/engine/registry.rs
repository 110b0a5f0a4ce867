use super::calculator::Calculator;
use super::catalog::{Catalog, DescriptorSpec};
use super::config::{ConfigError, PropertyNameOverrides, Selection};
use super::stats::ExecutionStats;
use crate::core::descriptors::backend::DescriptorBackend;
use crate::core::descriptors::key::DescriptorKey;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::warn;

/// Turns descriptor selections into bound calculators.
///
/// Every calculator produced by one registry shares the same
/// [`ExecutionStats`], so counts accumulate across all runs made with it.
pub struct Registry<'a> {
    catalog: &'a Catalog,
    backend: &'a dyn DescriptorBackend,
    stats: Arc<ExecutionStats>,
}

impl<'a> Registry<'a> {
    pub fn new(catalog: &'a Catalog, backend: &'a dyn DescriptorBackend) -> Self {
        Self::with_stats(catalog, backend, Arc::new(ExecutionStats::new()))
    }

    pub fn with_stats(
        catalog: &'a Catalog,
        backend: &'a dyn DescriptorBackend,
        stats: Arc<ExecutionStats>,
    ) -> Self {
        Self {
            catalog,
            backend,
            stats,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn stats(&self) -> &Arc<ExecutionStats> {
        &self.stats
    }

    /// Resolves a selection to catalog keys, in selection order without duplicates.
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<DescriptorKey>, ConfigError> {
        let keys = match selection {
            Selection::All => {
                let mut keys = Vec::with_capacity(self.catalog.len());
                for spec in self.catalog.iter() {
                    if self.backend.is_bound(spec.key) {
                        keys.push(spec.key);
                    } else {
                        warn!(descriptor = %spec.key, "No algorithm available, skipping");
                    }
                }
                keys
            }
            Selection::Keys(requested) => {
                let mut keys = IndexSet::with_capacity(requested.len());
                for name in requested {
                    let key = name
                        .parse::<DescriptorKey>()
                        .ok()
                        .filter(|key| self.catalog.contains(*key))
                        .ok_or_else(|| ConfigError::UnknownDescriptor(name.trim().to_string()))?;
                    if !self.backend.is_bound(key) {
                        return Err(ConfigError::Unavailable(key));
                    }
                    if !keys.insert(key) {
                        warn!(descriptor = %key, "Descriptor requested more than once");
                    }
                }
                keys.into_iter().collect()
            }
        };

        if keys.is_empty() {
            return Err(ConfigError::NoDescriptors);
        }
        Ok(keys)
    }

    fn plan(
        &self,
        selection: &Selection,
        overrides: &PropertyNameOverrides,
    ) -> Result<Vec<(&'a DescriptorSpec, Vec<String>)>, ConfigError> {
        let keys = self.resolve(selection)?;

        let mut unused: Vec<_> = overrides.keys().filter(|k| !keys.contains(*k)).collect();
        unused.sort();
        for key in unused {
            warn!(descriptor = %key, "Property names given for a descriptor that was not selected");
        }

        keys.into_iter()
            .map(|key| {
                let spec = self
                    .catalog
                    .spec(key)
                    .ok_or_else(|| ConfigError::UnknownDescriptor(key.to_string()))?;
                let names = match overrides.get(&key) {
                    Some(custom) => validate_names(spec, custom)?,
                    None => spec.default_names(),
                };
                Ok((spec, names))
            })
            .collect()
    }

    /// Builds one calculator per selected descriptor, in selection order.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; nothing is instantiated unless the whole selection
    /// is valid.
    pub fn instantiate(
        &self,
        selection: &Selection,
        overrides: &PropertyNameOverrides,
    ) -> Result<Vec<Calculator>, ConfigError> {
        self.plan(selection, overrides)?
            .into_iter()
            .map(|(spec, names)| {
                let algorithm = self
                    .backend
                    .algorithm(spec.key)
                    .ok_or(ConfigError::Unavailable(spec.key))?;
                Ok(Calculator::new(spec, names, algorithm, Arc::clone(&self.stats)))
            })
            .collect()
    }

    /// Property names every successfully processed molecule will carry.
    pub fn output_property_names(
        &self,
        selection: &Selection,
        overrides: &PropertyNameOverrides,
    ) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .plan(selection, overrides)?
            .into_iter()
            .flat_map(|(_, names)| names)
            .collect())
    }
}

fn validate_names(spec: &DescriptorSpec, names: &[String]) -> Result<Vec<String>, ConfigError> {
    if names.len() != spec.arity() {
        return Err(ConfigError::PropertyArity {
            key: spec.key,
            expected: spec.arity(),
            found: names.len(),
        });
    }
    names
        .iter()
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(ConfigError::EmptyPropertyName(spec.key))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptors::backend::ReferenceBackend;

    fn keys(list: &[&str]) -> Selection {
        Selection::keys(list.iter().copied())
    }

    #[test]
    fn empty_selection_is_rejected() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let err = registry
            .instantiate(&keys(&[]), &PropertyNameOverrides::new())
            .unwrap_err();
        assert_eq!(err, ConfigError::NoDescriptors);
        assert_eq!(err.to_string(), "No descriptors specified");
    }

    #[test]
    fn unknown_descriptor_is_rejected() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let err = registry
            .instantiate(&keys(&["TPSA", "FooBar"]), &PropertyNameOverrides::new())
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownDescriptor("FooBar".into()));
    }

    #[test]
    fn explicitly_requested_unbound_descriptor_is_rejected() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let err = registry.resolve(&keys(&["XLogP"])).unwrap_err();
        assert_eq!(err, ConfigError::Unavailable(DescriptorKey::XLogP));
    }

    #[test]
    fn all_skips_unbound_descriptors() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let resolved = registry.resolve(&Selection::All).unwrap();
        assert_eq!(resolved.len(), 8);
        assert!(!resolved.contains(&DescriptorKey::XLogP));
        assert!(!resolved.contains(&DescriptorKey::JPLogP));
    }

    #[test]
    fn aliases_resolve_and_duplicates_collapse() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let resolved = registry
            .resolve(&keys(&["tpsa", "hbd", "TPSA"]))
            .unwrap();
        assert_eq!(resolved, vec![DescriptorKey::Tpsa, DescriptorKey::HBondDonorCount]);
    }

    #[test]
    fn custom_names_replace_defaults() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let mut overrides = PropertyNameOverrides::new();
        overrides.insert(
            DescriptorKey::WienerNumbers,
            vec!["W".into(), "WP".into()],
        );
        let names = registry
            .output_property_names(&keys(&["HBondDonorCount", "WienerNumbers"]), &overrides)
            .unwrap();
        assert_eq!(names, vec!["HBD", "W", "WP"]);
    }

    #[test]
    fn custom_name_arity_must_match() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let mut overrides = PropertyNameOverrides::new();
        overrides.insert(DescriptorKey::ALogP, vec!["LogP".into()]);
        let err = registry
            .instantiate(&keys(&["ALogP"]), &overrides)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::PropertyArity {
                key: DescriptorKey::ALogP,
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn blank_custom_names_are_rejected() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let mut overrides = PropertyNameOverrides::new();
        overrides.insert(DescriptorKey::Tpsa, vec!["  ".into()]);
        let err = registry
            .instantiate(&keys(&["TPSA"]), &overrides)
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyPropertyName(DescriptorKey::Tpsa));
    }

    #[test]
    fn calculators_follow_selection_order_and_share_stats() {
        let catalog = Catalog::standard();
        let registry = Registry::new(&catalog, &ReferenceBackend);
        let calculators = registry
            .instantiate(&keys(&["rings", "alogp"]), &PropertyNameOverrides::new())
            .unwrap();
        let order: Vec<_> = calculators.iter().map(|c| c.key()).collect();
        assert_eq!(order, vec![DescriptorKey::SmallRingCount, DescriptorKey::ALogP]);
        assert_eq!(calculators[1].stats_key(), "moldesc.ALogP");
    }
}
