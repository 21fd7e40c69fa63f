//! Main runner for Procmon imports

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use traceload_core::xml::{self, RecordStream};
use traceload_core::{
    BatchWriter, CollectionSummary, DocumentStore, FieldCoercer, Fields, IdSequence, LoadSummary,
    ProgressContext, TimestampFormat, TraceFormat, output,
};

use crate::config::Config;
use crate::parser::{self, EVENT_LIST, PROCESS_LIST};

const CONTAINERS: &[&str] = &[PROCESS_LIST, EVENT_LIST];

/// Import the Procmon export at `path`
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

/// One record list and the collection it feeds
struct Output<'s, S: DocumentStore + ?Sized> {
    label: &'static str,
    writer: BatchWriter<'s, S>,
    ids: IdSequence,
}

impl<S: DocumentStore + ?Sized> Output<'_, S> {
    fn push(&mut self, fields: Fields) -> Result<()> {
        self.writer.append(self.ids.document(fields));
        if self.writer.is_full() {
            self.writer.flush()?;
            log::debug!("{}: processed {} records", self.label, self.ids.issued());
        }
        Ok(())
    }
}

/// Import a Procmon export from any buffered reader.
///
/// Both lists are streamed in one pass; the event buffer never holds more
/// than one batch.
pub fn load<R: BufRead, S: DocumentStore + ?Sized>(
    input: R,
    store: &S,
    config: &Config,
    progress: &ProgressContext,
) -> Result<LoadSummary> {
    let start = Instant::now();
    let coercer = FieldCoercer::for_format(
        TraceFormat::Procmon,
        TimestampFormat::TimeOfDay,
        &config.fields,
    );

    let (process_dest, writer) = output::open(store, &config.processes, &config.run, progress)?;
    let mut processes = Output {
        label: PROCESS_LIST,
        writer,
        ids: IdSequence::new(),
    };
    let (event_dest, writer) = output::open(store, &config.events, &config.run, progress)?;
    let mut events = Output {
        label: EVENT_LIST,
        writer,
        ids: IdSequence::new(),
    };

    let mut stream = RecordStream::new(xml::from_reader(input), CONTAINERS);
    while let Some(record) = stream.next_record()? {
        let target = if record.container == PROCESS_LIST {
            &mut processes
        } else {
            &mut events
        };
        let (label, index) = (target.label, target.ids.issued());
        let fields = parser::record_fields(&record.element, &coercer).with_context(|| {
            format!("{label} record {index} (near byte {})", stream.position())
        })?;
        target.push(fields)?;
    }
    for container in CONTAINERS {
        if !stream.seen(container) {
            bail!("no <{container}> element found; not a Procmon export");
        }
    }

    let process_stats = processes.writer.finish()?;
    let event_stats = events.writer.finish()?;
    let summary = LoadSummary {
        outputs: vec![
            CollectionSummary {
                destination: process_dest,
                stats: process_stats,
            },
            CollectionSummary {
                destination: event_dest,
                stats: event_stats,
            },
        ],
        elapsed: start.elapsed(),
    };
    summary.log("Procmon");
    Ok(summary)
}
