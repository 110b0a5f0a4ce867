use crate::cli::DescribeArgs;
use crate::config::{AppConfig, PartialDescribeConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use moldesc::{
    core::descriptors::backend::ReferenceBackend,
    core::io::sdf::{SdfReader, SdfWriter},
    engine::{catalog::Catalog, progress::ProgressReporter, registry::Registry, stats},
    workflows::{self, describe::DescribeSummary},
};
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

pub fn run(args: DescribeArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialDescribeConfig::from_file(path)?,
        None => PartialDescribeConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let catalog = Catalog::standard();
    let backend = ReferenceBackend;

    // Reject the selection before the output file is created.
    let properties = Registry::new(&catalog, &backend).output_property_names(
        &config.core_config.selection,
        &config.core_config.property_names,
    )?;
    info!(properties = %properties.join(","), "Output properties resolved.");

    let reader = SdfReader::open(&config.input_path).map_err(|e| CliError::FileParsing {
        path: config.input_path.clone(),
        source: e.into(),
    })?;
    let writer = SdfWriter::create(&config.output_path).map_err(|e| CliError::FileParsing {
        path: config.output_path.clone(),
        source: e.into(),
    })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Computing {} properties...", properties.len());
    info!("Invoking the describe workflow...");
    let summary = workflows::describe::run(
        &config.core_config,
        &catalog,
        &backend,
        reader,
        writer,
        &reporter,
    )?;

    report(&summary, &config);
    if let Some(path) = &config.stats_path {
        write_stats(&summary, path)?;
        println!("Execution counts written to: {}", path.display());
    }
    Ok(())
}

fn report(summary: &DescribeSummary, config: &AppConfig) {
    println!(
        "Processed {} molecules, {} errors.",
        summary.processed, summary.errors
    );
    if summary.skipped_records > 0 {
        println!(
            "Skipped {} unreadable input records.",
            summary.skipped_records
        );
    }
    println!(
        "Descriptor evaluations: {} ({} descriptors)",
        summary.cost,
        summary.descriptors.len()
    );
    println!("Annotated structures written to: {}", config.output_path.display());
}

fn write_stats(summary: &DescribeSummary, path: &std::path::Path) -> Result<()> {
    let file = File::create(path)?;
    stats::write_counts_csv(&summary.execution_counts, BufWriter::new(file)).map_err(|e| {
        CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        }
    })
}
