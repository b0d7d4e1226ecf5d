// CLI module
// Command-line interface, argument parsing and the import/export run

mod args;

pub use args::{CliArgs, StrategyType};

use crate::core::{MemoryRecordStore, RecordQuery, RecordService};
use crate::io::files::{export_records, export_to_file, write_text};
use crate::strategy::create_strategy;
use crate::types::{ImportReport, RecordError};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Import the input file into a fresh store and export the result
///
/// Records are exported sorted by id, to `--output` or else to `stdout`.
/// The report is written to `--report` when given, and returned either way.
///
/// # Errors
///
/// Only fatal errors: unreadable input, undetectable format, a JSON input
/// that is not an array, or an export/report that cannot be written.
pub fn run(args: &CliArgs, stdout: &mut dyn Write) -> Result<ImportReport, RecordError> {
    let format = args.input_format()?;

    let config = match args.strategy {
        StrategyType::Async => Some(args.to_batch_config()),
        StrategyType::Sync => None,
    };
    let strategy = create_strategy(args.strategy, config);

    let service = RecordService::new(Arc::new(MemoryRecordStore::new()));
    let report = strategy.import(&args.input_file, format, &service)?;

    let records = service.find(&RecordQuery::default());
    match &args.output {
        Some(path) => export_to_file(&records, args.output_format, path)?,
        None => export_records(&records, args.output_format, stdout)?,
    }

    if let Some(path) = &args.report {
        let text = serde_json::to_string_pretty(&report)?;
        write_text(path, &text)?;
    }

    Ok(report)
}
