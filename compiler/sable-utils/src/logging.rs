//! Sable compiler logging utilities. The compiler uses the [`log`] façade
//! to emit diagnostics about its own operation, and [`CompilerLogger`] is
//! the backing implementation that formats those records for the terminal.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;

use crate::highlight::{highlight, Colour, Modifier};

/// The global compiler logger instance, registered via
/// [`CompilerLogger::init`].
pub static COMPILER_LOGGER: CompilerLogger = CompilerLogger::new();

/// The logger that the compiler registers with the [`log`] façade. Error
/// records are written to the standard error stream, everything else goes
/// to standard output.
#[derive(Default)]
pub struct CompilerLogger {
    /// The maximum level that this logger will emit, set once during
    /// [`CompilerLogger::init`].
    filter: OnceCell<LevelFilter>,
}

impl CompilerLogger {
    pub const fn new() -> Self {
        Self { filter: OnceCell::new() }
    }

    /// Register this logger as the global [`log`] sink with the provided
    /// maximum level.
    pub fn init(&'static self, filter: LevelFilter) -> Result<(), SetLoggerError> {
        self.filter.set(filter).ok();
        log::set_logger(self)?;
        log::set_max_level(filter);
        Ok(())
    }

    fn filter(&self) -> LevelFilter {
        self.filter.get().copied().unwrap_or(LevelFilter::Info)
    }
}

impl Log for CompilerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_prefix = match record.level() {
            Level::Error => highlight(Colour::Red | Modifier::Bold, "error"),
            Level::Warn => highlight(Colour::Yellow | Modifier::Bold, "warn"),
            Level::Info => highlight(Colour::Blue | Modifier::Bold, "info"),
            Level::Debug => highlight(Colour::Blue | Modifier::Bold, "debug"),
            Level::Trace => highlight(Colour::Magenta | Modifier::Bold, "trace"),
        };

        if record.level() == Level::Error {
            eprintln!("{level_prefix}: {}", record.args());
        } else {
            println!("{level_prefix}: {}", record.args());
        }
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
        std::io::stderr().flush().ok();
    }
}
