use crate::core::descriptors::backend::DescriptorBackend;
use crate::core::descriptors::key::DescriptorKey;
use crate::core::io::sdf::SdfError;
use crate::core::io::traits::MoleculeSink;
use crate::core::models::molecule::Molecule;
use crate::engine::catalog::Catalog;
use crate::engine::config::{ConfigError, DescribeConfig, PropertyNameOverrides, Selection};
use crate::engine::error::EngineError;
use crate::engine::pipeline::{Pipeline, PipelineConfig};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::Registry;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeSummary {
    /// Molecules that went through the pipeline.
    pub processed: usize,
    /// Failed (molecule, calculator) pairs plus molecules that could not be written.
    pub errors: usize,
    /// Input records that could not be parsed.
    pub skipped_records: usize,
    pub descriptors: Vec<DescriptorKey>,
    /// Descriptor invocations requested: processed molecules times descriptors.
    pub cost: u64,
    /// Successful invocations per stats key.
    pub execution_counts: BTreeMap<String, u64>,
}

/// Annotates in-memory molecules with the selected descriptors.
///
/// Returns the annotated molecules in input order together with the number of
/// failed (molecule, descriptor) pairs.
pub fn select_and_run<I>(
    catalog: &Catalog,
    backend: &dyn DescriptorBackend,
    selection: &Selection,
    records: I,
) -> Result<(Vec<Molecule>, usize), ConfigError>
where
    I: IntoIterator<Item = Molecule>,
{
    let registry = Registry::new(catalog, backend);
    let calculators = registry.instantiate(selection, &PropertyNameOverrides::new())?;
    let pipeline = Pipeline::new(calculators, PipelineConfig::default());

    let mut annotations = pipeline.run(records);
    let molecules = annotations
        .by_ref()
        .map(|annotated| annotated.record.into_original())
        .collect();
    Ok((molecules, annotations.error_count()))
}

/// Numbers input records by position and drops unparseable ones, stopping at
/// the first unrecoverable read error.
struct RecordStream<'r, S> {
    inner: S,
    position: usize,
    skipped: usize,
    fatal: Option<SdfError>,
    reporter: &'r ProgressReporter<'r>,
}

impl<'r, S> RecordStream<'r, S> {
    fn new(inner: S, reporter: &'r ProgressReporter<'r>) -> Self {
        Self {
            inner,
            position: 0,
            skipped: 0,
            fatal: None,
            reporter,
        }
    }
}

impl<S> Iterator for RecordStream<'_, S>
where
    S: Iterator<Item = Result<Molecule, SdfError>>,
{
    type Item = (usize, Molecule);

    fn next(&mut self) -> Option<(usize, Molecule)> {
        if self.fatal.is_some() {
            return None;
        }
        loop {
            let item = self.inner.next()?;
            self.position += 1;
            match item {
                Ok(molecule) => return Some((self.position, molecule)),
                Err(e) if e.is_recoverable() => {
                    warn!(record = self.position, error = %e, "Skipping unreadable record");
                    self.reporter.report(Progress::Message(format!(
                        "Skipped unreadable record {}: {}",
                        self.position, e
                    )));
                    self.skipped += 1;
                }
                Err(e) => {
                    self.fatal = Some(e);
                    return None;
                }
            }
        }
    }
}

/// Streams molecules from `source` through the selected descriptors into `sink`.
///
/// The selection is validated before the first record is pulled from
/// `source`. Per-molecule failures, including molecules the sink rejects, are
/// counted and the run continues.
///
/// # Errors
///
/// - [`EngineError::Config`] if the selection or property names are invalid.
/// - [`EngineError::Input`] if the source fails in a way that stops reading.
///   Molecules read before the failure have already been written.
/// - [`EngineError::Output`] if the sink cannot be finalized.
#[instrument(skip_all, name = "describe_workflow")]
pub fn run<S, K>(
    config: &DescribeConfig,
    catalog: &Catalog,
    backend: &dyn DescriptorBackend,
    source: S,
    mut sink: K,
    reporter: &ProgressReporter,
) -> Result<DescribeSummary, EngineError>
where
    S: IntoIterator<Item = Result<Molecule, SdfError>>,
    K: MoleculeSink,
{
    reporter.report(Progress::PhaseStart {
        name: "Resolving descriptors",
    });
    let registry = Registry::new(catalog, backend);
    let calculators = registry.instantiate(&config.selection, &config.property_names)?;
    let descriptors: Vec<DescriptorKey> = calculators.iter().map(|c| c.key()).collect();
    info!(
        descriptors = descriptors.len(),
        output = %config.output_representation,
        "Descriptors resolved."
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Describing" });
    let pipeline = Pipeline::new(calculators, config.pipeline.clone());
    let mut stream = RecordStream::new(source.into_iter(), reporter);
    let mut write_errors = 0;
    let mut annotations = pipeline.run_numbered(stream.by_ref());

    for annotated in annotations.by_ref() {
        let ordinal = annotated.ordinal;
        let mut failures = annotated.failures.len();

        match annotated.record.into_annotated(config.output_representation) {
            Ok(molecule) => {
                if let Err(e) = sink.write(&molecule) {
                    warn!(molecule = ordinal, error = %e, "Failed to write molecule");
                    write_errors += 1;
                    failures += 1;
                }
            }
            Err(e) => {
                warn!(
                    molecule = ordinal,
                    representation = %config.output_representation,
                    error = %e,
                    "Failed to prepare molecule for output"
                );
                write_errors += 1;
                failures += 1;
            }
        }
        reporter.report(Progress::MoleculeProcessed { ordinal, failures });
    }

    let pipeline_summary = annotations.summary();
    drop(annotations);
    reporter.report(Progress::PhaseFinish);

    sink.finish()
        .map_err(|e| EngineError::Output(Box::new(e)))?;
    if let Some(e) = stream.fatal.take() {
        return Err(EngineError::Input(e));
    }

    let summary = DescribeSummary {
        processed: pipeline_summary.processed,
        errors: pipeline_summary.errors + write_errors,
        skipped_records: stream.skipped,
        cost: (pipeline_summary.processed * descriptors.len()) as u64,
        descriptors,
        execution_counts: registry.stats().snapshot(),
    };

    if summary.skipped_records > 0 {
        warn!(
            skipped = summary.skipped_records,
            "Some input records could not be read."
        );
    }
    info!(
        "Processed {} molecules, {} errors.",
        summary.processed, summary.errors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptors::backend::ReferenceBackend;
    use crate::core::io::sdf::SdfParseErrorKind;
    use crate::core::models::property::PropertyValue;
    use crate::core::testing;
    use crate::engine::config::DescribeConfigBuilder;
    use crate::engine::record::Representation;
    use std::io;

    #[test]
    fn select_and_run_annotates_in_order() {
        let catalog = Catalog::standard();
        let (molecules, errors) = select_and_run(
            &catalog,
            &ReferenceBackend,
            &Selection::keys(["HBondDonorCount", "RotatableBondCount"]),
            vec![testing::ethanol(), testing::hexane()],
        )
        .unwrap();

        assert_eq!(errors, 0);
        assert_eq!(molecules[0].title(), "ethanol");
        assert_eq!(molecules[0].property("HBD"), Some(&PropertyValue::Integer(1)));
        assert_eq!(molecules[1].property("ROTB"), Some(&PropertyValue::Integer(3)));
    }

    #[test]
    fn configuration_errors_stop_before_reading() {
        let catalog = Catalog::standard();
        let config = DescribeConfigBuilder::new()
            .selection(Selection::keys(["FooBar"]))
            .build()
            .unwrap();
        let mut pulled = 0;
        let source = std::iter::from_fn(|| {
            pulled += 1;
            Some(Ok(testing::ethanol()))
        });
        let mut sink: Vec<Molecule> = Vec::new();

        let err = run(
            &config,
            &catalog,
            &ReferenceBackend,
            source,
            &mut sink,
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(err.is_configuration());
        assert!(sink.is_empty());
        assert_eq!(pulled, 0);
    }

    #[test]
    fn unreadable_records_are_skipped() {
        let catalog = Catalog::standard();
        let config = DescribeConfigBuilder::new()
            .selection(Selection::keys(["hbd"]))
            .build()
            .unwrap();
        let source = vec![
            Ok(testing::ethanol()),
            Err(SdfError::Parse {
                record: 2,
                line: 4,
                kind: SdfParseErrorKind::MissingCountsLine,
            }),
            Ok(testing::butane()),
        ];
        let mut sink: Vec<Molecule> = Vec::new();

        let summary = run(
            &config,
            &catalog,
            &ReferenceBackend,
            source,
            &mut sink,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped_records, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(sink.len(), 2);
        assert_eq!(summary.execution_counts["moldesc.HBondDonorCount"], 2);
    }

    #[test]
    fn ordinals_follow_input_positions_past_skipped_records() {
        use std::sync::Mutex;

        let catalog = Catalog::standard();
        let config = DescribeConfigBuilder::new()
            .selection(Selection::keys(["hbd"]))
            .build()
            .unwrap();
        let source = vec![
            Ok(testing::ethanol()),
            Err(SdfError::Parse {
                record: 2,
                line: 9,
                kind: SdfParseErrorKind::MissingCountsLine,
            }),
            Ok(testing::butane()),
        ];
        let ordinals = Mutex::new(Vec::new());
        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| match event {
            Progress::MoleculeProcessed { ordinal, .. } => ordinals.lock().unwrap().push(ordinal),
            Progress::Message(msg) => messages.lock().unwrap().push(msg),
            _ => {}
        }));
        let mut sink: Vec<Molecule> = Vec::new();

        run(&config, &catalog, &ReferenceBackend, source, &mut sink, &reporter).unwrap();
        drop(reporter);

        assert_eq!(ordinals.into_inner().unwrap(), vec![1, 3]);
        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Skipped unreadable record 2"));
    }

    #[test]
    fn io_failure_aborts_after_writing_earlier_molecules() {
        let catalog = Catalog::standard();
        let config = DescribeConfigBuilder::new()
            .selection(Selection::keys(["hbd"]))
            .chunk_size(1)
            .build()
            .unwrap();
        let source = vec![
            Ok(testing::ethanol()),
            Err(SdfError::Io(io::Error::other("disk gone"))),
            Ok(testing::butane()),
        ];
        let mut sink: Vec<Molecule> = Vec::new();

        let err = run(
            &config,
            &catalog,
            &ReferenceBackend,
            source,
            &mut sink,
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Input(SdfError::Io(_))));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn output_uses_the_configured_representation() {
        let catalog = Catalog::standard();
        let config = DescribeConfigBuilder::new()
            .selection(Selection::keys(["hbd", "tpsa"]))
            .output_representation(Representation::ExplicitHydrogens)
            .build()
            .unwrap();
        let mut sink: Vec<Molecule> = Vec::new();

        let summary = run(
            &config,
            &catalog,
            &ReferenceBackend,
            vec![Ok(testing::ethanol())],
            &mut sink,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.cost, 2);
        assert_eq!(sink[0].atom_count(), 9);
        assert!(sink[0].has_property("HBD"));
        assert!(sink[0].has_property("TPSA"));
    }
}
