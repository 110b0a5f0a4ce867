use super::calculator::{CalculationError, Calculator};
use super::record::MoleculeRecord;
use crate::core::descriptors::key::DescriptorKey;
use crate::core::models::molecule::Molecule;
use std::collections::VecDeque;
use std::iter::Zip;
use std::ops::RangeFrom;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const DEFAULT_CHUNK_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Molecules processed together before any of them is emitted.
    pub chunk_size: usize,
    /// Process the molecules of a chunk concurrently. Has no effect without
    /// the `parallel` feature.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

/// A calculator that failed on one molecule.
#[derive(Debug)]
pub struct Failure {
    pub descriptor: DescriptorKey,
    pub error: CalculationError,
}

/// A molecule after every calculator has been applied to it.
#[derive(Debug)]
pub struct AnnotatedMolecule {
    /// 1-based position in the input. Numbered sources may skip values.
    pub ordinal: usize,
    pub record: MoleculeRecord,
    pub failures: Vec<Failure>,
}

impl AnnotatedMolecule {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSummary {
    pub processed: usize,
    pub errors: usize,
}

/// Applies a fixed list of calculators to a stream of molecules.
#[derive(Debug)]
pub struct Pipeline {
    calculators: Vec<Calculator>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(calculators: Vec<Calculator>, config: PipelineConfig) -> Self {
        Self {
            calculators,
            config,
        }
    }

    pub fn calculators(&self) -> &[Calculator] {
        &self.calculators
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every calculator on one molecule, in list order.
    ///
    /// A failing calculator is recorded and the next one still runs.
    pub fn apply(&self, ordinal: usize, molecule: Molecule) -> AnnotatedMolecule {
        let mut record = MoleculeRecord::new(molecule);
        let mut failures = Vec::new();

        for calculator in &self.calculators {
            if let Err(error) = calculator.calculate(&mut record) {
                warn!(
                    molecule = ordinal,
                    descriptor = %calculator.key(),
                    error = %error,
                    "Failed to process molecule"
                );
                failures.push(Failure {
                    descriptor: calculator.key(),
                    error,
                });
            }
        }

        AnnotatedMolecule {
            ordinal,
            record,
            failures,
        }
    }

    /// Lazily annotates `molecules`, yielding them in input order.
    ///
    /// Input is pulled one chunk at a time; nothing is read before the first
    /// call to `next`. Molecules are numbered from 1.
    pub fn run<I>(&self, molecules: I) -> PipelineRun<'_, Zip<RangeFrom<usize>, I::IntoIter>>
    where
        I: IntoIterator<Item = Molecule>,
    {
        self.run_numbered((1..).zip(molecules))
    }

    /// Like [`run`](Self::run) for sources that number their own records,
    /// e.g. when unreadable input records are dropped before the pipeline.
    pub fn run_numbered<I>(&self, molecules: I) -> PipelineRun<'_, I::IntoIter>
    where
        I: IntoIterator<Item = (usize, Molecule)>,
    {
        PipelineRun {
            pipeline: self,
            source: molecules.into_iter(),
            ready: VecDeque::new(),
            summary: PipelineSummary::default(),
            exhausted: false,
        }
    }

    #[instrument(skip_all, name = "pipeline_chunk", fields(size = chunk.len()))]
    fn process_chunk(&self, chunk: Vec<(usize, Molecule)>) -> Vec<AnnotatedMolecule> {
        #[cfg(feature = "parallel")]
        if self.config.parallel && chunk.len() > 1 {
            return chunk
                .into_par_iter()
                .map(|(ordinal, molecule)| self.apply(ordinal, molecule))
                .collect();
        }

        chunk
            .into_iter()
            .map(|(ordinal, molecule)| self.apply(ordinal, molecule))
            .collect()
    }
}

/// Iterator returned by [`Pipeline::run`].
pub struct PipelineRun<'p, I> {
    pipeline: &'p Pipeline,
    source: I,
    ready: VecDeque<AnnotatedMolecule>,
    summary: PipelineSummary,
    exhausted: bool,
}

impl<I: Iterator<Item = (usize, Molecule)>> PipelineRun<'_, I> {
    fn fill(&mut self) {
        let chunk_size = self.pipeline.config.chunk_size.max(1);
        let chunk: Vec<_> = self.source.by_ref().take(chunk_size).collect();
        if chunk.len() < chunk_size {
            self.exhausted = true;
        }
        if !chunk.is_empty() {
            debug!(first = chunk[0].0, size = chunk.len(), "Processing chunk");
            self.ready = self.pipeline.process_chunk(chunk).into();
        }
    }
}

impl<I> PipelineRun<'_, I> {
    /// Molecules emitted so far.
    pub fn processed(&self) -> usize {
        self.summary.processed
    }

    /// Failed (molecule, calculator) pairs among the molecules emitted so far.
    /// Final once the iterator is exhausted.
    pub fn error_count(&self) -> usize {
        self.summary.errors
    }

    pub fn summary(&self) -> PipelineSummary {
        self.summary
    }
}

impl<I: Iterator<Item = (usize, Molecule)>> Iterator for PipelineRun<'_, I> {
    type Item = AnnotatedMolecule;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() && !self.exhausted {
            self.fill();
        }
        let annotated = self.ready.pop_front()?;
        self.summary.processed += 1;
        self.summary.errors += annotated.failures.len();
        Some(annotated)
    }
}
