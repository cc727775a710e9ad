//! Console backend for the `log` facade.
//!
//! Library modules log through `log`; the service binary installs this backend
//! so their records appear next to its own banners, with the same prefixes.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

fn prefix(level: Level) -> &'static str {
    match level {
        Level::Error => "❌",
        Level::Warn => "⚠️",
        Level::Info => "📋",
        Level::Debug | Level::Trace => "🔍",
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => {
                eprintln!("{} {}", prefix(record.level()), record.args())
            }
            Level::Info => println!("{} {}", prefix(record.level()), record.args()),
            Level::Debug | Level::Trace => println!(
                "{} [{}] {}",
                prefix(record.level()),
                record.target(),
                record.args()
            ),
        }
    }

    fn flush(&self) {}
}

/// Installs the console logger with the given maximum level.
///
/// Fails if another logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
