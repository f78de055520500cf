//! Stderr logger for the `log` facade

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes `HH:MM:SS LEVEL target: message` lines to stderr
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("{}", format_record(record));
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} {}: {}",
        Local::now().format("%H:%M:%S"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Install the stderr logger. Warnings and errors only, unless verbose.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

/// Level captured by each case logger
pub fn case_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        Level::Info.to_level_filter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_respects_level() {
        let logger = StderrLogger {
            level: LevelFilter::Warn,
        };
        let warn = Metadata::builder().level(Level::Warn).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&info));
    }

    #[test]
    fn test_init_installs_logger() {
        init(true);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        assert!(log::logger().enabled(&Metadata::builder().level(Level::Debug).build()));
    }

    #[test]
    fn test_format_record() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("schema ready"))
                .level(Level::Info)
                .target("fc_test::schema")
                .build(),
        );
        assert!(line.ends_with("INFO  fc_test::schema: schema ready"));
    }
}
