//! Main runner for web log imports

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use traceload_core::{
    CollectionSummary, DocumentStore, FieldCoercer, IdSequence, LoadSummary, OutputSpec,
    ProgressContext, TimestampFormat, TraceFormat, output,
};

use crate::config::Config;
use crate::parser;

/// Import the log file at `path`
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

/// Import log lines from any buffered reader
pub fn load<R: BufRead, S: DocumentStore + ?Sized>(
    input: R,
    store: &S,
    config: &Config,
    progress: &ProgressContext,
) -> Result<LoadSummary> {
    let start = Instant::now();
    let coercer = FieldCoercer::for_format(
        TraceFormat::WebLog,
        TimestampFormat::Combined(config.layout.timestamp_format.clone()),
        &config.fields,
    );
    let target = OutputSpec::new(&config.collection, config.batch_size).announced();
    let (destination, mut writer) = output::open(store, &target, &config.run, progress)?;

    let mut ids = IdSequence::new();
    let mut skipped = 0usize;
    for (n, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", n + 1))?;
        let Some(fields) = parser::line_fields(&line, &config.layout, &coercer)
            .with_context(|| format!("line {}", n + 1))?
        else {
            skipped += 1;
            continue;
        };
        writer.append(ids.document(fields));
        if writer.is_full() {
            writer.flush()?;
        }
    }
    log::debug!("Skipped {skipped} comment and blank lines");

    let stats = writer.finish()?;
    let summary = LoadSummary {
        outputs: vec![CollectionSummary { destination, stats }],
        elapsed: start.elapsed(),
    };
    summary.log("Web Log");
    Ok(summary)
}
