use clap::{Args, Parser, Subcommand};
use moldesc::core::descriptors::key::DescriptorKey;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "moldesc contributors",
    version,
    about = "moldesc - annotate SD files with molecular descriptors (logP, H-bond counts, TPSA, topological indices, ring counts).",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute descriptors for every molecule of an SD file.
    Describe(DescribeArgs),
    /// List the available descriptors and the properties they write.
    List,
}

/// Arguments for the `describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    // --- Core Arguments ---
    /// Path to the input SD file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the annotated output SD file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Descriptor Selection ---
    #[command(flatten)]
    pub descriptors: DescriptorFlags,

    /// Hydrogen form of the output: `true` writes explicit hydrogens, `false`
    /// collapses them to implicit counts. Without the flag the input form is kept.
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub addhs: Option<bool>,

    /// Rename a descriptor's output properties. Can be used multiple times.
    /// Example: --name wiener=W,WP
    #[arg(long = "name", value_name = "KEY=N1,N2,...")]
    pub names: Vec<String>,

    // --- Execution ---
    /// Number of molecules processed together before output is written.
    #[arg(long, value_name = "INT")]
    pub chunk_size: Option<usize>,

    /// Process molecules one at a time on the calling thread.
    #[arg(long)]
    pub sequential: bool,

    /// Write per-descriptor execution counts as CSV.
    #[arg(long, value_name = "PATH")]
    pub stats: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S pipeline.chunk-size=64
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Descriptor selection flags. Without any of them the config file decides.
///
/// XLogP and JPLogP have no bundled algorithm and therefore no flag; they are
/// selectable only where an embedding application binds them through an
/// `OverrideBackend`.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DescriptorFlags {
    /// Compute every available descriptor.
    #[arg(short, long)]
    pub all: bool,
    /// Ghose-Crippen logP, logP squared and molar refractivity.
    #[arg(long)]
    pub alogp: bool,
    /// Hydrogen bond donor count.
    #[arg(long)]
    pub hbd: bool,
    /// Hydrogen bond acceptor count.
    #[arg(long)]
    pub hba: bool,
    /// Wiener path and polarity numbers.
    #[arg(long)]
    pub wiener: bool,
    /// Topological polar surface area.
    #[arg(long)]
    pub tpsa: bool,
    /// Fraction of sp3 carbons.
    #[arg(long)]
    pub fcsp3: bool,
    /// Rotatable bond count.
    #[arg(long)]
    pub rotb: bool,
    /// Small ring and ring system counts.
    #[arg(long)]
    pub rings: bool,
}

impl DescriptorFlags {
    /// Keys switched on individually, in catalog order.
    pub fn selected(&self) -> Vec<DescriptorKey> {
        DescriptorKey::ALL
            .into_iter()
            .filter(|key| match key {
                DescriptorKey::ALogP => self.alogp,
                DescriptorKey::XLogP | DescriptorKey::JPLogP => false,
                DescriptorKey::HBondDonorCount => self.hbd,
                DescriptorKey::HBondAcceptorCount => self.hba,
                DescriptorKey::WienerNumbers => self.wiener,
                DescriptorKey::Tpsa => self.tpsa,
                DescriptorKey::FractionalCSP3 => self.fcsp3,
                DescriptorKey::RotatableBondCount => self.rotb,
                DescriptorKey::SmallRingCount => self.rings,
            })
            .collect()
    }

    pub fn any(&self) -> bool {
        self.all || !self.selected().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> DescribeArgs {
        let mut argv = vec!["moldesc", "describe", "-i", "in.sdf", "-o", "out.sdf"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Describe(args) => args,
            other => panic!("Expected 'describe', got {other:?}"),
        }
    }

    #[test]
    fn descriptor_flags_follow_catalog_order() {
        let args = parse(&["--tpsa", "--alogp", "--rings"]);
        assert_eq!(
            args.descriptors.selected(),
            vec![
                DescriptorKey::ALogP,
                DescriptorKey::Tpsa,
                DescriptorKey::SmallRingCount
            ]
        );
        assert!(args.descriptors.any());
    }

    #[test]
    fn no_flags_means_no_selection() {
        let args = parse(&[]);
        assert!(!args.descriptors.any());
        assert_eq!(args.addhs, None);
    }

    #[test]
    fn addhs_takes_an_explicit_value() {
        assert_eq!(parse(&["--addhs", "true"]).addhs, Some(true));
        assert_eq!(parse(&["--addhs", "false"]).addhs, Some(false));
    }

    #[test]
    fn repeated_names_and_set_values_are_collected() {
        let args = parse(&[
            "--name",
            "wiener=W,WP",
            "--name",
            "tpsa=PSA",
            "-S",
            "pipeline.chunk-size=8",
        ]);
        assert_eq!(args.names, vec!["wiener=W,WP", "tpsa=PSA"]);
        assert_eq!(args.set_values, vec!["pipeline.chunk-size=8"]);
    }

    #[test]
    fn unbound_logp_variants_have_no_flags() {
        for flag in ["--xlogp", "--jplogp"] {
            let argv = ["moldesc", "describe", "-i", "in.sdf", "-o", "out.sdf", flag];
            assert!(Cli::try_parse_from(argv).is_err(), "{flag} should be rejected");
        }
    }

    #[test]
    fn every_flag_maps_to_a_bundled_descriptor() {
        use moldesc::core::descriptors::backend::{DescriptorBackend, ReferenceBackend};

        let args = parse(&[
            "--alogp", "--hbd", "--hba", "--wiener", "--tpsa", "--fcsp3", "--rotb", "--rings",
        ]);
        let selected = args.descriptors.selected();
        assert_eq!(selected.len(), 8);
        assert!(selected.iter().all(|key| ReferenceBackend.is_bound(*key)));
    }

    #[test]
    fn list_takes_no_arguments() {
        let cli = Cli::parse_from(["moldesc", "list"]);
        assert!(matches!(cli.command, Commands::List));
    }
}
