//! End-to-end integration tests
//!
//! These tests validate the complete import/export pipeline using predefined
//! test fixtures. Each fixture test:
//! 1. Runs the CLI pipeline on the fixture's input.csv or input.json
//! 2. Compares the exported records with expected.csv (timestamps dropped)
//! 3. Compares the import report with expected_report.json (row, kind, field)
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path imports
//! - Per-row validation failures (faculty, phone, email, date, gender, id)
//! - Status transitions, legal and illegal
//! - Duplicate emails across records
//! - Malformed CSV rows and JSON elements
//!
//! Each test is run twice: once with the sync strategy and once with the
//! async strategy.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use student_records::cli::{self, CliArgs, StrategyType};
    use student_records::io::{export_to_file, FileFormat};
    use student_records::strategy::{create_strategy, BatchConfig};
    use student_records::{
        ErrorKind, MemoryRecordStore, RecordPayload, RecordQuery, RecordService, StudentStatus,
    };
    use tempfile::TempDir;

    /// Number of CSV columns compared: every Record field except the timestamps
    const COMPARED_COLUMNS: usize = 11;

    fn strategy_name(strategy: StrategyType) -> &'static str {
        match strategy {
            StrategyType::Sync => "sync",
            StrategyType::Async => "async",
        }
    }

    fn fixture_input(fixture_dir: &Path) -> PathBuf {
        let csv = fixture_dir.join("input.csv");
        if csv.exists() {
            csv
        } else {
            fixture_dir.join("input.json")
        }
    }

    /// Parse CSV text into rows of fields, keeping only the compared columns
    fn csv_table(text: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|record| {
                record
                    .expect("Failed to parse CSV output")
                    .iter()
                    .take(COMPARED_COLUMNS)
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    /// Reduce a serialized report to the parts that do not depend on message wording
    fn report_shape(report: &Value) -> Value {
        let rejected: Vec<Value> = report["rejected"]
            .as_array()
            .expect("rejected must be an array")
            .iter()
            .map(|entry| json!({ "row": entry["row"], "kind": entry["kind"], "field": entry["field"] }))
            .collect();

        json!({ "imported": report["imported"], "rejected": rejected })
    }

    /// Run a test fixture and compare the export and the report
    ///
    /// # Panics
    ///
    /// Panics if fixture files cannot be read, the run fails, or the output
    /// or report differ from the expected files.
    fn run_test_fixture(fixture_name: &str, strategy: StrategyType) {
        let fixture_dir = Path::new("tests/fixtures").join(fixture_name);
        let input_path = fixture_input(&fixture_dir);
        let expected_path = fixture_dir.join("expected.csv");
        let expected_report_path = fixture_dir.join("expected_report.json");

        assert!(input_path.exists(), "Input file not found: {}", input_path.display());
        assert!(
            expected_path.exists(),
            "Expected file not found: {}",
            expected_path.display()
        );

        let work_dir = TempDir::new().expect("Failed to create temp dir");
        let report_path = work_dir.path().join("report.json");

        let args = CliArgs::try_parse_from([
            "student-records",
            "--strategy",
            strategy_name(strategy),
            "--batch-size",
            "3",
            "--report",
            report_path.to_str().expect("temp path is UTF-8"),
            input_path.to_str().expect("fixture path is UTF-8"),
        ])
        .expect("Failed to parse arguments");

        let mut output = Vec::new();
        cli::run(&args, &mut output)
            .unwrap_or_else(|e| panic!("Failed to import {}: {}", fixture_name, e));

        let actual_output = String::from_utf8(output).expect("output is UTF-8");
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", expected_path.display(), e));

        assert_eq!(
            csv_table(&actual_output),
            csv_table(&expected_output),
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name,
            strategy,
            actual_output,
            expected_output
        );

        let actual_report: Value = serde_json::from_str(
            &fs::read_to_string(&report_path).expect("Failed to read report"),
        )
        .expect("report is JSON");
        let expected_report: Value = serde_json::from_str(
            &fs::read_to_string(&expected_report_path).expect("Failed to read expected report"),
        )
        .expect("expected report is JSON");

        assert_eq!(
            report_shape(&actual_report),
            expected_report,
            "\n\nReport mismatch for fixture: {} (strategy: {:?})",
            fixture_name,
            strategy
        );
    }

    /// End-to-end test for all fixtures with both import strategies
    #[rstest]
    #[case("happy_path")]
    #[case("invalid_faculty")]
    #[case("status_transitions")]
    #[case("duplicate_email")]
    #[case("malformed_rows")]
    #[case("json_import")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    fn student(id: &str, email: &str, status: &str) -> RecordPayload {
        RecordPayload::from_pairs([
            ("id", id),
            ("full_name", "Trịnh Gia Bảo"),
            ("date_of_birth", "2002-02-28"),
            ("gender", "Male"),
            ("faculty", "Khoa Tiếng Nhật"),
            ("course", "K2020"),
            ("program", "Chính quy"),
            ("address", "45 Trần Hưng Đạo, Quận 1"),
            ("email", email),
            ("phone", "0911222333"),
            ("status", status),
        ])
    }

    fn service() -> RecordService {
        RecordService::new(Arc::new(MemoryRecordStore::new()))
    }

    /// Exporting records and importing the file into an empty store
    /// reproduces them, apart from server timestamps
    #[rstest]
    fn test_export_import_round_trip(
        #[values(FileFormat::Csv, FileFormat::Json)] format: FileFormat,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let source = service();
        source.create(&student("SV100", "bao@example.com", "Bảo lưu")).unwrap();
        source.create(&student("SV101", "bao2@example.com", "Đã tốt nghiệp")).unwrap();
        let originals = source.find(&RecordQuery::default());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("export.{}", format));
        export_to_file(&originals, format, &path).unwrap();

        let target = service();
        let report = create_strategy(strategy, Some(BatchConfig::new(1, 2)))
            .import(&path, format, &target)
            .unwrap();

        assert!(report.is_clean(), "unexpected rejections: {:?}", report.rejected);
        let imported = target.find(&RecordQuery::default());
        assert_eq!(imported.len(), originals.len());
        for (original, copy) in originals.iter().zip(&imported) {
            assert!(original.same_content(copy), "{:?} != {:?}", original, copy);
        }
    }

    #[test]
    fn test_cli_writes_json_export_to_file() {
        let dir = TempDir::new().unwrap();
        let output_path = dir.path().join("records.json");

        let args = CliArgs::try_parse_from([
            "student-records",
            "--strategy",
            "sync",
            "--output-format",
            "json",
            "--output",
            output_path.to_str().unwrap(),
            "tests/fixtures/invalid_faculty/input.csv",
        ])
        .unwrap();

        let mut stdout = Vec::new();
        let report = cli::run(&args, &mut stdout).unwrap();

        assert!(stdout.is_empty());
        assert_eq!(report.rejected.len(), 1);

        let exported: Value =
            serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        let ids: Vec<&str> = exported
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["SV001", "SV003"]);
        assert_eq!(exported[0]["status"], "Đang học");
    }

    #[rstest]
    fn test_missing_input_is_fatal(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let args = CliArgs::try_parse_from([
            "student-records",
            "--strategy",
            strategy_name(strategy),
            "tests/fixtures/does_not_exist.csv",
        ])
        .unwrap();

        let err = cli::run(&args, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[rstest]
    fn test_json_document_that_is_not_an_array_is_fatal(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("single.json");
        fs::write(&path, r#"{"id": "SV1"}"#).unwrap();

        let err = create_strategy(strategy, None)
            .import(&path, FileFormat::Json, &service())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_unknown_extension_needs_explicit_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.txt");
        fs::copy("tests/fixtures/happy_path/input.csv", &path).unwrap();

        let detect = CliArgs::try_parse_from(["student-records", path.to_str().unwrap()]).unwrap();
        assert_eq!(cli::run(&detect, &mut Vec::new()).unwrap_err().kind(), ErrorKind::Format);

        let explicit = CliArgs::try_parse_from([
            "student-records",
            "--format",
            "csv",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let report = cli::run(&explicit, &mut Vec::new()).unwrap();
        assert_eq!(report.imported.len(), 3);
    }

    #[test]
    fn test_final_statuses_after_transitions() {
        let service = service();
        let text = fs::read_to_string("tests/fixtures/status_transitions/input.csv").unwrap();

        student_records::import_text(&service, &text, FileFormat::Csv).unwrap();

        let statuses: Vec<(String, StudentStatus)> = service
            .find(&RecordQuery::default())
            .into_iter()
            .map(|record| (record.id, record.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("SV001".to_string(), StudentStatus::Graduated),
                ("SV002".to_string(), StudentStatus::DroppedOut),
                ("SV003".to_string(), StudentStatus::Suspended),
            ]
        );
    }
}
