use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every execution-count key.
pub const STATS_NAMESPACE: &str = "moldesc";

/// Builds the `"<namespace>.<descriptor>"` key under which a calculator counts.
pub fn stats_key(identifier: &str) -> String {
    format!("{STATS_NAMESPACE}.{identifier}")
}

/// Successful-invocation counters shared by every calculator of a run.
///
/// Counters only ever grow. A key that has never been incremented is absent
/// from [`snapshot`](Self::snapshot) and reads as zero through
/// [`count`](Self::count).
#[derive(Debug, Default)]
pub struct ExecutionStats {
    counters: DashMap<String, AtomicU64>,
}

#[derive(Serialize)]
struct Row<'a> {
    key: &'a str,
    count: u64,
}

impl ExecutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, key: &str) {
        if let Some(counter) = self.counters.get(key) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counters
            .entry(key.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counters
            .get(key)
            .map_or(0, |counter| counter.load(Ordering::Relaxed))
    }

    pub fn total(&self) -> u64 {
        self.counters
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Sorted copy of every counter.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    /// Writes the snapshot as `key,count` CSV rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        write_counts_csv(&self.snapshot(), writer)
    }
}

/// Writes execution counts as `key,count` CSV rows with a header.
pub fn write_counts_csv<W: Write>(
    counts: &BTreeMap<String, u64>,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for (key, count) in counts {
        csv.serialize(Row { key, count: *count })?;
    }
    csv.flush()?;
    Ok(())
}
