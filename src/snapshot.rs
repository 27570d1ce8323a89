// File: src/snapshot.rs
//
// Golden-file test runner.
// Every `NAME.lox` script in a directory is run in a fresh interpreter and
// its output is compared with `NAME.out`. A script that fails appends the
// error banner (e.g. `Runtime Error: Division by zero`) to its output, so
// expected failures can be snapshotted too.

use crate::interpreter::Interpreter;
use crate::source::strip_comments;
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SnapshotFailure {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Default)]
pub struct SnapshotReport {
    pub total: usize,
    pub passed: usize,
    pub failures: Vec<SnapshotFailure>,
}

impl SnapshotReport {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs a single script and returns everything it printed, followed by
/// the error banner if the script failed.
pub fn run_script(content: &str) -> String {
    let mut interp = Interpreter::with_natives();
    let buffer = Arc::new(Mutex::new(Vec::new()));
    interp.set_output(buffer.clone());

    let result = crate::run_source(&strip_comments(content), &mut interp);

    let mut actual = {
        let lock = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&lock).into_owned()
    };
    if let Err(err) = result {
        actual.push_str(&err.to_string());
    }
    actual.trim().to_string()
}

/// Runs every `.lox` file in `test_dir` (sorted by name). With
/// `update_snapshots`, or when a `.out` file is missing, the actual output
/// is written as the new expectation.
pub fn run_all(test_dir: &Path, update_snapshots: bool) -> io::Result<SnapshotReport> {
    let mut scripts: Vec<PathBuf> = fs::read_dir(test_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "lox"))
        .collect();
    scripts.sort();

    let mut report = SnapshotReport::default();
    for path in scripts {
        report.total += 1;
        let content = fs::read_to_string(&path)?;
        let expected_path = path.with_extension("out");

        let start = Instant::now();
        let actual = run_script(&content);
        let elapsed = start.elapsed();

        let expected = if expected_path.exists() && !update_snapshots {
            fs::read_to_string(&expected_path)?.trim().to_string()
        } else {
            fs::write(&expected_path, &actual)?;
            actual.clone()
        };

        if actual == expected {
            log::info!("{} passed in {:.2?}", path.display(), elapsed);
            report.passed += 1;
        } else {
            report.failures.push(SnapshotFailure { path, expected, actual });
        }
        log_slow(&expected_path, elapsed);
    }

    Ok(report)
}

fn log_slow(path: &Path, elapsed: Duration) {
    if elapsed > Duration::from_secs(1) {
        log::warn!("{} took {:.2?}", path.display(), elapsed);
    }
}

/// Prints a colored summary of a snapshot run to stdout
pub fn print_report(report: &SnapshotReport) {
    for failure in &report.failures {
        println!("{} {}", "[✗]".bright_red(), failure.path.display());
        println!("{}\n{}", "Expected:".bright_yellow(), failure.expected);
        println!("{}\n{}\n", "Got:".bright_yellow(), failure.actual);
    }

    let summary = format!("Passed {}/{} tests", report.passed, report.total);
    if report.all_passed() {
        println!("\n{} {}", "[✓]".bright_green(), summary.bright_green());
    } else {
        println!("\n{} {}", "[✗]".bright_red(), summary.bright_red());
    }
}
