// File: src/logger.rs
//
// Minimal backend for the `log` facade.
// Writes colored, level-tagged lines to stderr so diagnostics never mix
// with program output on stdout.

use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".cyan(),
            Level::Trace => "TRACE".magenta(),
        };
        let target = record.module_path().unwrap_or_else(|| record.target());
        eprintln!("{} {} {}", tag, target.dimmed(), record.args());
    }

    fn flush(&self) {}
}

/// Maps the number of `-v` flags to a level filter
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the stderr logger. Calling it again only changes the level.
pub fn init(level: LevelFilter) {
    // set_logger fails only if a logger is already installed
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(1), LevelFilter::Info);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }
}
