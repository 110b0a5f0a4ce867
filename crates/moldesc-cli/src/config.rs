use crate::cli::DescribeArgs;
use crate::error::{CliError, Result};
use moldesc::core::descriptors::key::DescriptorKey;
use moldesc::engine::config::{DescribeConfig, DescribeConfigBuilder, Selection};
use moldesc::engine::record::Representation;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the `describe` command needs after file and flags are merged.
#[derive(Debug)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub stats_path: Option<PathBuf>,
    pub core_config: DescribeConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum PartialSelection {
    /// `"all"` or a single identifier.
    Keyword(String),
    Keys(Vec<String>),
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPipelineConfig {
    #[serde(rename = "chunk-size")]
    chunk_size: Option<usize>,
    parallel: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    #[serde(rename = "add-hydrogens")]
    add_hydrogens: Option<bool>,
    stats: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialDescribeConfig {
    descriptors: Option<PartialSelection>,
    #[serde(rename = "property-names", default)]
    property_names: BTreeMap<String, Vec<String>>,
    pipeline: Option<PartialPipelineConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialDescribeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &DescribeArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let pipeline = self.pipeline.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let selection = if args.descriptors.all {
            Selection::All
        } else if args.descriptors.any() {
            Selection::keys(args.descriptors.selected().iter().map(|k| k.identifier()))
        } else {
            match self.descriptors.take() {
                Some(PartialSelection::Keyword(word)) if word.eq_ignore_ascii_case("all") => {
                    Selection::All
                }
                Some(PartialSelection::Keyword(word)) => Selection::Keys(vec![word]),
                Some(PartialSelection::Keys(keys)) => Selection::Keys(keys),
                None => Selection::Keys(Vec::new()),
            }
        };

        let mut builder = DescribeConfigBuilder::new()
            .selection(selection)
            .output_representation(output_representation(
                args.addhs.or(output.add_hydrogens),
            ))
            .parallel(!args.sequential && pipeline.parallel.unwrap_or(true));
        if let Some(size) = args.chunk_size.or(pipeline.chunk_size) {
            builder = builder.chunk_size(size);
        }

        for (key, names) in std::mem::take(&mut self.property_names) {
            builder = builder.property_names(parse_key(&key)?, names);
        }
        for spec in &args.names {
            let (key, names) = parse_name_override(spec)?;
            builder = builder.property_names(key, names);
        }

        Ok(AppConfig {
            input_path: args.input.clone(),
            output_path: args.output.clone(),
            stats_path: args.stats.clone().or(output.stats),
            core_config: builder.build()?,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let invalid = |kind: &str| {
                CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
            };

            match key {
                "descriptors" => {
                    self.descriptors = Some(PartialSelection::Keys(
                        value_str
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect(),
                    ));
                }
                "pipeline.chunk-size" => {
                    self.pipeline
                        .get_or_insert_with(Default::default)
                        .chunk_size = Some(value_str.parse().map_err(|_| invalid("integer"))?);
                }
                "pipeline.parallel" => {
                    self.pipeline.get_or_insert_with(Default::default).parallel =
                        Some(value_str.parse().map_err(|_| invalid("boolean"))?);
                }
                "output.add-hydrogens" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .add_hydrogens = Some(value_str.parse().map_err(|_| invalid("boolean"))?);
                }
                "output.stats" => {
                    self.output.get_or_insert_with(Default::default).stats =
                        Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Unset keeps the input form; `true` writes explicit hydrogens and `false`
/// writes the hydrogen-collapsed form.
fn output_representation(add_hydrogens: Option<bool>) -> Representation {
    match add_hydrogens {
        None => Representation::Original,
        Some(true) => Representation::ExplicitHydrogens,
        Some(false) => Representation::ImplicitHydrogens,
    }
}

fn parse_key(text: &str) -> Result<DescriptorKey> {
    text.parse::<DescriptorKey>()
        .map_err(|e| CliError::Argument(e.to_string()))
}

/// Parses `KEY=N1,N2,...` into a descriptor key and its property names.
fn parse_name_override(spec: &str) -> Result<(DescriptorKey, Vec<String>)> {
    let (key, names) = spec.split_once('=').ok_or_else(|| {
        CliError::Argument(format!(
            "Invalid --name format: '{}'. Expected KEY=NAME[,NAME...].",
            spec
        ))
    })?;
    let names = names.split(',').map(|n| n.trim().to_string()).collect();
    Ok((parse_key(key.trim())?, names))
}
