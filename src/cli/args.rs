use crate::io::files::FileFormat;
use crate::strategy::BatchConfig;
use crate::types::RecordError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Import student records from CSV or JSON and export the result
#[derive(Parser, Debug)]
#[command(name = "student-records")]
#[command(about = "Import student records from CSV or JSON and export the result", long_about = None)]
pub struct CliArgs {
    /// Input file containing student records
    #[arg(value_name = "INPUT", help = "Path to the input CSV or JSON file")]
    pub input_file: PathBuf,

    /// Input format, detected from the file extension when omitted
    #[arg(
        long = "format",
        value_name = "FORMAT",
        help = "Input format: 'csv' or 'json' (default: from the file extension)"
    )]
    pub format: Option<FileFormat>,

    /// Import strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        env = "STUDENT_RECORDS_STRATEGY",
        default_value = "async",
        help = "Import strategy: 'sync' for streaming or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of rows per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        env = "STUDENT_RECORDS_BATCH_SIZE",
        help = "Number of rows per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads for batch imports (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        env = "STUDENT_RECORDS_MAX_CONCURRENT",
        help = "Maximum number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Format of the exported records
    #[arg(
        long = "output-format",
        value_name = "FORMAT",
        default_value = "csv",
        help = "Export format: 'csv' or 'json'"
    )]
    pub output_format: FileFormat,

    /// Export destination, stdout when omitted
    #[arg(long = "output", value_name = "PATH", help = "Write exported records to PATH")]
    pub output: Option<PathBuf>,

    /// Where to write the import report as JSON
    #[arg(long = "report", value_name = "PATH", help = "Write the import report (JSON) to PATH")]
    pub report: Option<PathBuf>,
}

/// Available import strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Input format: `--format` if given, otherwise from the file extension
    pub fn input_format(&self) -> Result<FileFormat, RecordError> {
        match self.format {
            Some(format) => Ok(format),
            None => FileFormat::from_path(&self.input_file),
        }
    }

    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take the defaults; zero values are replaced with the
    /// defaults by `BatchConfig::new`, which logs a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
