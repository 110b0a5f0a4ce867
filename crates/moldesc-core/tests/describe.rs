use moldesc::core::descriptors::backend::{OverrideBackend, ReferenceBackend};
use moldesc::core::descriptors::key::DescriptorKey;
use moldesc::core::descriptors::polar::PolarSurfaceArea;
use moldesc::core::descriptors::{Descriptor, DescriptorError, DescriptorValue};
use moldesc::core::io::sdf::{SdfReader, SdfWriter};
use moldesc::core::io::traits::MoleculeSink;
use moldesc::core::models::molecule::Molecule;
use moldesc::core::models::property::PropertyValue;
use moldesc::engine::catalog::Catalog;
use moldesc::engine::config::{ConfigError, DescribeConfigBuilder, Selection};
use moldesc::engine::error::EngineError;
use moldesc::engine::progress::ProgressReporter;
use moldesc::workflows::describe::{run, select_and_run};
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

const THREE_MOLECULES: &str = "\
ethanol
  moldesc

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000    1.2000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  1  0  0  0  0
M  END
$$$$
acetate
  moldesc

  4  3  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000    1.2000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000   -1.2000    0.0000 O   0  5  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  2  0  0  0  0
  2  4  1  0  0  0  0
M  END
$$$$
methylamine
  moldesc

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.4700    0.0000    0.0000 N   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
M  END
$$$$
";

fn reader(text: &str) -> SdfReader<Cursor<String>> {
    SdfReader::new(Cursor::new(text.to_string()))
}

fn molecules(text: &str) -> Vec<Molecule> {
    reader(text).collect::<Result<_, _>>().unwrap()
}

/// Polar surface area that refuses charged structures.
struct NeutralOnlyTpsa;

impl Descriptor for NeutralOnlyTpsa {
    fn name(&self) -> &'static str {
        "TPSA"
    }

    fn compute(&self, mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        if mol.atoms_iter().any(|(_, atom)| atom.formal_charge != 0) {
            return Err(DescriptorError::Failed {
                descriptor: "TPSA",
                reason: "charged structure".into(),
            });
        }
        PolarSurfaceArea.compute(mol)
    }
}

struct Constant(DescriptorValue);

impl Descriptor for Constant {
    fn name(&self) -> &'static str {
        "Constant"
    }

    fn compute(&self, _mol: &Molecule) -> Result<DescriptorValue, DescriptorError> {
        Ok(self.0.clone())
    }
}

#[test]
fn failing_descriptor_is_isolated_to_its_molecule() {
    let catalog = Catalog::standard();
    let backend = OverrideBackend::new(ReferenceBackend)
        .with(DescriptorKey::Tpsa, Arc::new(NeutralOnlyTpsa));
    let config = DescribeConfigBuilder::new()
        .selection(Selection::keys(["HBondDonorCount", "TPSA"]))
        .build()
        .unwrap();
    let mut writer = SdfWriter::new(Vec::new());

    let summary = run(
        &config,
        &catalog,
        &backend,
        reader(THREE_MOLECULES),
        &mut writer,
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.execution_counts["moldesc.HBondDonorCount"], 3);
    assert_eq!(summary.execution_counts["moldesc.TPSA"], 2);

    let text = String::from_utf8(writer.into_inner()).unwrap();
    let written = molecules(&text);
    let titles: Vec<_> = written.iter().map(|m| m.title()).collect();
    assert_eq!(titles, vec!["ethanol", "acetate", "methylamine"]);

    assert!(written[0].has_property("HBD") && written[0].has_property("TPSA"));
    assert!(written[1].has_property("HBD"));
    assert!(!written[1].has_property("TPSA"));
    assert!(written[2].has_property("HBD") && written[2].has_property("TPSA"));
}

#[test]
fn unknown_descriptor_fails_before_reading() {
    let catalog = Catalog::standard();
    let config = DescribeConfigBuilder::new()
        .selection(Selection::keys(["FooBar"]))
        .build()
        .unwrap();
    let mut input = reader(THREE_MOLECULES);
    let mut output: Vec<Molecule> = Vec::new();

    let err = run(
        &config,
        &catalog,
        &ReferenceBackend,
        &mut input,
        &mut output,
        &ProgressReporter::new(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Config(ConfigError::UnknownDescriptor(ref name)) if name == "FooBar"
    ));
    assert_eq!(input.records_read(), 0);
    assert!(output.is_empty());
}

#[test]
fn empty_selection_is_a_configuration_error() {
    let catalog = Catalog::standard();
    let err = select_and_run(
        &catalog,
        &ReferenceBackend,
        &Selection::Keys(Vec::new()),
        molecules(THREE_MOLECULES),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::NoDescriptors);
}

#[test]
fn non_finite_vector_elements_are_not_written() {
    let catalog = Catalog::standard();
    let backend = OverrideBackend::new(ReferenceBackend).with(
        DescriptorKey::ALogP,
        Arc::new(Constant(DescriptorValue::RealVector(vec![1.5, f64::NAN, 3.0]))),
    );

    let (annotated, errors) = select_and_run(
        &catalog,
        &backend,
        &Selection::keys(["ALogP"]),
        molecules(THREE_MOLECULES),
    )
    .unwrap();

    assert_eq!(errors, 0);
    for mol in &annotated {
        assert_eq!(mol.property("ALogP"), Some(&PropertyValue::Real(1.5)));
        assert!(mol.property("ALogP2").is_none());
        assert_eq!(mol.property("AMR"), Some(&PropertyValue::Real(3.0)));
    }
}

#[test]
fn order_and_tally_hold_under_parallel_chunks() {
    let catalog = Catalog::standard();
    let backend = OverrideBackend::new(ReferenceBackend)
        .with(DescriptorKey::Tpsa, Arc::new(NeutralOnlyTpsa));
    let config = DescribeConfigBuilder::new()
        .selection(Selection::keys(["tpsa", "hbd", "rotb"]))
        .chunk_size(4)
        .parallel(true)
        .build()
        .unwrap();

    let base = molecules(THREE_MOLECULES);
    let input: Vec<_> = (0..30)
        .map(|i| {
            let mut mol = base[i % 3].clone();
            mol.set_title(format!("{}-{}", mol.title(), i));
            Ok(mol)
        })
        .collect();
    let mut output: Vec<Molecule> = Vec::new();

    let summary = run(
        &config,
        &catalog,
        &backend,
        input,
        &mut output,
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(summary.processed, 30);
    assert_eq!(summary.errors, 10);
    assert_eq!(summary.cost, 90);
    for (i, mol) in output.iter().enumerate() {
        assert!(mol.title().ends_with(&format!("-{i}")));
        assert_eq!(mol.has_property("TPSA"), i % 3 != 1);
    }
}

#[derive(Debug, Error)]
#[error("refusing {0}")]
struct Refused(String);

/// Rejects molecules whose title starts with "acetate".
struct PickySink(Vec<String>);

impl MoleculeSink for PickySink {
    type Error = Refused;

    fn write(&mut self, mol: &Molecule) -> Result<(), Self::Error> {
        if mol.title().starts_with("acetate") {
            return Err(Refused(mol.title().to_string()));
        }
        self.0.push(mol.title().to_string());
        Ok(())
    }
}

#[test]
fn rejected_writes_are_counted_and_the_run_continues() {
    let catalog = Catalog::standard();
    let config = DescribeConfigBuilder::new()
        .selection(Selection::keys(["hbd"]))
        .build()
        .unwrap();
    let mut sink = PickySink(Vec::new());

    let summary = run(
        &config,
        &catalog,
        &ReferenceBackend,
        reader(THREE_MOLECULES),
        &mut sink,
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.errors, 1);
    assert_eq!(sink.0, vec!["ethanol", "methylamine"]);
}
