//! Student Records CLI
//!
//! Command-line interface for bulk importing student records from CSV or
//! JSON files and exporting the resulting record set.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- students.csv > records.csv
//! cargo run -- --strategy sync students.json --output-format json > records.json
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 students.csv
//! cargo run -- students.csv --output records.csv --report report.json
//! ```
//!
//! Rows that fail validation or a status transition are listed in the
//! report and logged as warnings; they do not stop the import.
//!
//! # Logging
//!
//! Logs go to stderr. The level is controlled with `RUST_LOG`
//! (default `student_records=info`).
//!
//! # Exit Codes
//!
//! - 0: Success, including imports with rejected rows
//! - 1: Error (missing arguments, file not found, unreadable input, etc.)

use std::process;
use student_records::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_records=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::parse_args();

    let mut stdout = std::io::stdout();
    match cli::run(&args, &mut stdout) {
        Ok(report) if !report.is_clean() => {
            tracing::warn!(rejected = report.rejected.len(), "some rows were rejected");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(error = %e, "import failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
