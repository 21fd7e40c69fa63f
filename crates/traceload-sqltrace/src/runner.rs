//! Main runner for SQL trace imports

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use traceload_core::xml::{self, RecordStream};
use traceload_core::{
    CollectionSummary, DocumentStore, FieldCoercer, IdSequence, LoadSummary, OutputSpec,
    ProgressContext, TimestampFormat, TraceFormat, output,
};

use crate::config::Config;
use crate::parser::{self, EVENTS};

/// Import the profiler trace at `path`
pub fn load_file<S: DocumentStore + ?Sized>(
    path: &Path,
    store: &S,
    config: &Config,
    progress: &ProgressContext,
) -> Result<LoadSummary> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    log::info!("Loading file {}", path.display());
    load(BufReader::new(file), store, config, progress)
}

/// Import a profiler trace from any buffered reader
pub fn load<R: BufRead, S: DocumentStore + ?Sized>(
    input: R,
    store: &S,
    config: &Config,
    progress: &ProgressContext,
) -> Result<LoadSummary> {
    let start = Instant::now();
    let coercer = FieldCoercer::for_format(TraceFormat::Sql, TimestampFormat::Iso8601, &config.fields);
    let target = OutputSpec::new(&config.collection, config.batch_size);
    let (destination, mut writer) = output::open(store, &target, &config.run, progress)?;

    let mut stream = RecordStream::new(xml::from_reader(input), &[EVENTS]);
    let mut ids = IdSequence::new();
    while let Some(record) = stream.next_record()? {
        let index = ids.issued();
        let fields = parser::event_fields(&record.element, &coercer)
            .with_context(|| format!("event {index} (near byte {})", stream.position()))?;
        writer.append(ids.document(fields));
        if writer.is_full() {
            writer.flush()?;
        }
    }
    if !stream.seen(EVENTS) {
        bail!("no <{EVENTS}> element found; not a profiler trace");
    }

    let stats = writer.finish()?;
    let summary = LoadSummary {
        outputs: vec![CollectionSummary { destination, stats }],
        elapsed: start.elapsed(),
    };
    summary.log("SQL Trace");
    Ok(summary)
}
