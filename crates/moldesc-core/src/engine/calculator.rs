use super::catalog::DescriptorSpec;
use super::record::{MoleculeRecord, Representation};
use super::stats::{ExecutionStats, stats_key};
use crate::core::chem::hydrogens::DerivationError;
use crate::core::descriptors::key::DescriptorKey;
use crate::core::descriptors::{Descriptor, DescriptorError, DescriptorValue};
use crate::core::models::property::PropertyValue;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Type of a single output property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Real,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Real => f.write_str("real"),
        }
    }
}

/// How a descriptor result is turned into property writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRule {
    /// One integer property, always written.
    ScalarInteger,
    /// One real property, written only when finite.
    ScalarReal,
    /// Integer elements mapped positionally onto the property names.
    VectorInteger,
    /// Real elements mapped positionally; non-finite elements are skipped.
    VectorReal,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteRuleError {
    #[error("Expected a {expected} result but the algorithm returned a {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Result has {found} elements but {expected} property names are declared")]
    TooShort { expected: usize, found: usize },
    #[error("No property name to write the result to")]
    NoPropertyName,
}

impl WriteRule {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::ScalarInteger | Self::VectorInteger => ValueKind::Integer,
            Self::ScalarReal | Self::VectorReal => ValueKind::Real,
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::VectorInteger | Self::VectorReal)
    }

    fn expected_shape(&self) -> &'static str {
        match self {
            Self::ScalarInteger => "integer",
            Self::ScalarReal => "real",
            Self::VectorInteger => "integer vector",
            Self::VectorReal => "real vector",
        }
    }

    /// Maps `value` onto `names`, returning the writes to perform.
    ///
    /// Vector results may be longer than the name list; trailing elements are
    /// ignored. Nothing is returned on error, so callers never write a partial
    /// result.
    pub fn apply<'n>(
        self,
        names: &'n [String],
        value: &DescriptorValue,
    ) -> Result<Vec<(&'n str, PropertyValue)>, WriteRuleError> {
        let first = || {
            names
                .first()
                .map(String::as_str)
                .ok_or(WriteRuleError::NoPropertyName)
        };
        let check_len = |found: usize| {
            if found < names.len() {
                Err(WriteRuleError::TooShort {
                    expected: names.len(),
                    found,
                })
            } else {
                Ok(())
            }
        };

        match (self, value) {
            (Self::ScalarInteger, DescriptorValue::Integer(v)) => {
                Ok(vec![(first()?, PropertyValue::Integer(*v))])
            }
            (Self::ScalarReal, DescriptorValue::Real(v)) => {
                let name = first()?;
                Ok(if v.is_finite() {
                    vec![(name, PropertyValue::Real(*v))]
                } else {
                    Vec::new()
                })
            }
            (Self::VectorInteger, DescriptorValue::IntegerVector(values)) => {
                check_len(values.len())?;
                Ok(names
                    .iter()
                    .zip(values)
                    .map(|(name, v)| (name.as_str(), PropertyValue::Integer(*v)))
                    .collect())
            }
            (Self::VectorReal, DescriptorValue::RealVector(values)) => {
                check_len(values.len())?;
                Ok(names
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| v.is_finite())
                    .map(|(name, v)| (name.as_str(), PropertyValue::Real(*v)))
                    .collect())
            }
            (rule, value) => Err(WriteRuleError::ShapeMismatch {
                expected: rule.expected_shape(),
                found: value.shape(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("Could not derive the {representation} representation: {source}")]
    Derivation {
        representation: Representation,
        #[source]
        source: DerivationError,
    },

    #[error(transparent)]
    Computation(#[from] DescriptorError),

    #[error("Unexpected descriptor result: {0}")]
    UnexpectedValue(#[from] WriteRuleError),
}

/// One descriptor bound to its algorithm, output names and stats counter.
pub struct Calculator {
    key: DescriptorKey,
    representation: Representation,
    rule: WriteRule,
    property_names: Vec<String>,
    algorithm: Arc<dyn Descriptor>,
    stats: Arc<ExecutionStats>,
    stats_key: String,
}

impl fmt::Debug for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calculator")
            .field("key", &self.key)
            .field("representation", &self.representation)
            .field("rule", &self.rule)
            .field("property_names", &self.property_names)
            .field("algorithm", &self.algorithm.name())
            .finish()
    }
}

impl Calculator {
    pub fn new(
        spec: &DescriptorSpec,
        property_names: Vec<String>,
        algorithm: Arc<dyn Descriptor>,
        stats: Arc<ExecutionStats>,
    ) -> Self {
        Self {
            key: spec.key,
            representation: spec.representation,
            rule: spec.rule,
            property_names,
            algorithm,
            stats,
            stats_key: stats_key(spec.key.identifier()),
        }
    }

    pub fn key(&self) -> DescriptorKey {
        self.key
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn rule(&self) -> WriteRule {
        self.rule
    }

    pub fn property_names(&self) -> &[String] {
        &self.property_names
    }

    pub fn stats_key(&self) -> &str {
        &self.stats_key
    }

    /// Computes the descriptor on the record and writes its properties.
    ///
    /// Returns the number of properties written, which is lower than the
    /// number of names when non-finite reals were dropped. On error the record
    /// is left untouched and the execution count is not incremented.
    pub fn calculate(&self, record: &mut MoleculeRecord) -> Result<usize, CalculationError> {
        let molecule = record.representation(self.representation).map_err(|source| {
            CalculationError::Derivation {
                representation: self.representation,
                source,
            }
        })?;
        let value = self.algorithm.compute(molecule)?;
        let writes = self.rule.apply(&self.property_names, &value)?;

        let written = writes.len();
        for (name, value) in writes {
            record.set_property(name, value);
        }
        self.stats.increment(&self.stats_key);
        Ok(written)
    }
}
