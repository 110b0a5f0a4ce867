use super::pipeline::PipelineConfig;
use super::record::Representation;
use crate::core::descriptors::key::DescriptorKey;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("No descriptors specified")]
    NoDescriptors,

    #[error("Unknown descriptor '{0}'")]
    UnknownDescriptor(String),

    #[error("Descriptor {0} has no algorithm available")]
    Unavailable(DescriptorKey),

    #[error("Descriptor {key} writes {expected} properties but {found} names were given")]
    PropertyArity {
        key: DescriptorKey,
        expected: usize,
        found: usize,
    },

    #[error("Empty property name given for descriptor {0}")]
    EmptyPropertyName(DescriptorKey),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,
}

/// Which descriptors a run computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every catalog entry with an available algorithm.
    All,
    /// Descriptor identifiers or aliases, in the order given.
    Keys(Vec<String>),
}

impl Selection {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keys(keys.into_iter().map(Into::into).collect())
    }
}

/// Custom output property names, replacing a descriptor's defaults.
pub type PropertyNameOverrides = HashMap<DescriptorKey, Vec<String>>;

#[derive(Debug, Clone, PartialEq)]
pub struct DescribeConfig {
    pub selection: Selection,
    pub property_names: PropertyNameOverrides,
    pub output_representation: Representation,
    pub pipeline: PipelineConfig,
}

#[derive(Default)]
pub struct DescribeConfigBuilder {
    selection: Option<Selection>,
    property_names: PropertyNameOverrides,
    output_representation: Option<Representation>,
    chunk_size: Option<usize>,
    parallel: Option<bool>,
}

impl DescribeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }
    pub fn property_names(mut self, key: DescriptorKey, names: Vec<String>) -> Self {
        self.property_names.insert(key, names);
        self
    }
    pub fn output_representation(mut self, representation: Representation) -> Self {
        self.output_representation = Some(representation);
        self
    }
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = Some(enabled);
        self
    }

    pub fn build(self) -> Result<DescribeConfig, ConfigError> {
        let defaults = PipelineConfig::default();
        let chunk_size = self.chunk_size.unwrap_or(defaults.chunk_size);
        if chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }

        Ok(DescribeConfig {
            selection: self
                .selection
                .ok_or(ConfigError::MissingParameter("selection"))?,
            property_names: self.property_names,
            output_representation: self.output_representation.unwrap_or_default(),
            pipeline: PipelineConfig {
                chunk_size,
                parallel: self.parallel.unwrap_or(defaults.parallel),
            },
        })
    }
}
