//! Adapter dispatch and final report

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use traceload_core::{DocumentStore, LoadSummary, ProgressContext, RunOptions, fmt_num};

use crate::Cli;
use crate::config::Config;

/// Source format selected with `--type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputType {
    /// SQL Server Profiler XML trace
    Sql,
    /// Process Monitor XML export
    Procmon,
    /// Event Viewer XML export
    Eventvwr,
    /// IIS W3C access log
    Iis,
    /// HTTP.sys error log
    Httperr,
}

/// Build the adapter configuration for `cli.input_type` and run it.
pub fn run<S: DocumentStore + ?Sized>(
    cli: &Cli,
    config: &Config,
    store: &S,
    progress: &ProgressContext,
) -> Result<LoadSummary> {
    let mut retry = config.retry.policy();
    if let Some(max_retries) = cli.max_retries {
        retry.max_retries = max_retries;
    }
    let run = RunOptions {
        reset: cli.drop,
        retry,
    };
    let path = cli.importfile.as_path();
    let collection = cli.destcollection.clone();

    match cli.input_type {
        InputType::Sql => {
            let adapter = traceload_sqltrace::Config {
                collection,
                batch_size: config.batch.sql,
                run,
                fields: config.fields.sql.overrides(),
            };
            traceload_sqltrace::load_file(path, store, &adapter, progress)
        }
        InputType::Procmon => {
            log::info!(
                "Procmon exports are written to the processes and events collections; ignoring {}",
                cli.destcollection
            );
            let adapter = traceload_procmon::Config {
                run,
                fields: config.fields.procmon.overrides(),
                ..Default::default()
            }
            .with_batch_sizes(config.batch.processes, config.batch.events);
            traceload_procmon::load_file(path, store, &adapter, progress)
        }
        InputType::Eventvwr => {
            let adapter = traceload_eventlog::Config {
                collection,
                batch_size: config.batch.eventlog,
                run,
                fields: config.fields.eventlog.overrides(),
            };
            traceload_eventlog::load_file(path, store, &adapter, progress)
        }
        InputType::Iis | InputType::Httperr => {
            let layout = if cli.input_type == InputType::Iis {
                config.weblog.iis()
            } else {
                config.weblog.httperr()
            };
            let adapter = traceload_weblog::Config {
                collection,
                batch_size: config.batch.weblog,
                layout,
                run,
                fields: config.fields.weblog.overrides(),
            };
            traceload_weblog::load_file(path, store, &adapter, progress)
        }
    }
}

/// Per-collection result table
pub fn render_report(summary: &LoadSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Collection").fg(Color::Cyan),
            Cell::new("Written to").fg(Color::Cyan),
            Cell::new("Documents").fg(Color::Cyan),
        ]);

    for output in &summary.outputs {
        let dest = &output.destination;
        let written_to = if dest.is_renamed() {
            format!("{} (renamed)", dest.collection)
        } else if dest.cleared > 0 {
            format!("{} (dropped {})", dest.collection, fmt_num(dest.cleared as usize))
        } else {
            dest.collection.clone()
        };
        table.add_row(vec![
            dest.requested.clone(),
            written_to,
            fmt_num(output.stats.documents),
        ]);
    }
    table
}

pub fn print_report(summary: &LoadSummary, progress: &ProgressContext) {
    progress.println(format!("\n{}", render_report(summary)));
}
