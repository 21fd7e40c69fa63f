//! Per-run output wiring: destination resolution + sink writer + summary

use std::time::Duration;

use crate::destination::{self, Destination};
use crate::progress::{ProgressContext, fmt_num};
use crate::retry::RetryPolicy;
use crate::sink::{BatchWriter, SinkStats};
use crate::store::{DocumentStore, StoreError};

/// Settings shared by every output of one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Empty the requested collections instead of renaming around them
    pub reset: bool,
    pub retry: RetryPolicy,
}

/// One destination collection an adapter writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub collection: String,
    pub batch_size: usize,
    /// Log each flush at info level
    pub announce: bool,
}

impl OutputSpec {
    pub fn new(collection: impl Into<String>, batch_size: usize) -> Self {
        Self {
            collection: collection.into(),
            batch_size,
            announce: false,
        }
    }

    pub fn announced(mut self) -> Self {
        self.announce = true;
        self
    }
}

/// Resolve the destination for `target` and open a writer on it.
pub fn open<'s, S: DocumentStore + ?Sized>(
    store: &'s S,
    target: &OutputSpec,
    run: &RunOptions,
    progress: &ProgressContext,
) -> Result<(Destination, BatchWriter<'s, S>), StoreError> {
    let dest = destination::resolve(store, &target.collection, run.reset, &run.retry)?;
    log::info!("Writing {} to collection {}", target.collection, dest.collection);
    let writer = BatchWriter::new(store, dest.collection.clone(), target.batch_size)
        .with_retry(run.retry)
        .with_progress(progress.collection_line(&dest.collection))
        .announce_flushes(target.announce);
    Ok((dest, writer))
}

/// Outcome for one destination collection
#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub destination: Destination,
    pub stats: SinkStats,
}

/// Outcome of one adapter run
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub outputs: Vec<CollectionSummary>,
    pub elapsed: Duration,
}

impl LoadSummary {
    /// Documents written for the requested (logical) collection name
    pub fn documents(&self, requested: &str) -> Option<usize> {
        self.outputs
            .iter()
            .find(|o| o.destination.requested == requested)
            .map(|o| o.stats.documents)
    }

    pub fn total_documents(&self) -> usize {
        self.outputs.iter().map(|o| o.stats.documents).sum()
    }

    pub fn log(&self, label: &str) {
        log::info!("=== {label} Summary ===");
        for output in &self.outputs {
            log::info!(
                "Inserted {} documents to {} ({} flushes)",
                fmt_num(output.stats.documents),
                output.destination.collection,
                output.stats.flushes
            );
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        let total = self.total_documents();
        if total > 0 && self.elapsed.as_secs_f64() > 0.0 {
            let rate = total as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {rate:.0} documents/sec");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn open_resolves_and_writes_to_destination() {
        let store = MemoryStore::new();
        let target = OutputSpec::new("trace", 10);
        let (dest, writer) = open(&store, &target, &RunOptions::default(), &ProgressContext::hidden())
            .unwrap();
        assert_eq!(dest.collection, "trace");
        assert_eq!(writer.collection(), "trace");
    }

    #[test]
    fn summary_lookup_by_requested_name() {
        let summary = LoadSummary {
            outputs: vec![CollectionSummary {
                destination: Destination {
                    requested: "events".into(),
                    collection: "trace-abc".into(),
                    cleared: 0,
                },
                stats: SinkStats {
                    collection: "trace-abc".into(),
                    documents: 7,
                    flushes: 1,
                    elapsed: Duration::ZERO,
                },
            }],
            elapsed: Duration::ZERO,
        };
        assert_eq!(summary.documents("events"), Some(7));
        assert_eq!(summary.documents("processes"), None);
        assert_eq!(summary.total_documents(), 7);
    }
}
