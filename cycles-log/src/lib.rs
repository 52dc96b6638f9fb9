//! Logger for canisters, built on the [`log`] facade.
//!
//! Records are filtered with `RUST_LOG`-style directives, formatted with an RFC 3339 timestamp
//! and sent to the replica console and/or a circular in-memory buffer that can be read back with
//! [`take_memory_records`]. The filter can be replaced at runtime through [`LoggerConfig`].
//!
//! ```
//! use cycles_log::{init_log, LogSettings};
//!
//! let config = init_log(&LogSettings::default()).unwrap();
//! log::info!("logger is ready");
//!
//! config.update_filters("warn,cycles_pricing=debug");
//! ```

use std::cell::RefCell;
use std::sync::Arc;

use arc_swap::ArcSwap;
use env_filter::Filter;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

mod formatter;
mod platform;
pub mod settings;
pub mod writer;

use self::formatter::FormatFn;
pub use self::settings::{LogSettings, Pagination};
pub use self::writer::{ConsoleWriter, InMemoryWriter, Logs, MultiWriter, Writer};

/// The logger.
///
/// Use [`Builder`] to construct one, or [`init_log`] to construct and install it as the global
/// logger in one step.
pub struct Logger {
    writer: Box<dyn Writer>,
    filter: Arc<ArcSwap<Filter>>,
    format: FormatFn,
}

/// `Builder` acts as builder for initializing a `Logger`.
///
/// ```
/// use cycles_log::Builder;
/// use log::LevelFilter;
///
/// let (logger, _config) = Builder::new()
///     .parse_filters("debug,cycles_log=error")
///     .filter_module("noisy::module", LevelFilter::Off)
///     .build();
///
/// assert_eq!(logger.filter(), LevelFilter::Debug);
/// ```
#[derive(Default)]
pub struct Builder {
    filter: env_filter::Builder,
    writer: MultiWriter,
    format: formatter::Builder,
}

impl Builder {
    pub fn new() -> Builder {
        Default::default()
    }

    /// Adds a directive to the filter for a specific module.
    pub fn filter_module(mut self, module: &str, level: LevelFilter) -> Self {
        self.filter.filter_module(module, level);
        self
    }

    /// Parses the directives string in the same form as the `RUST_LOG`
    /// environment variable.
    pub fn parse_filters(mut self, filters: &str) -> Self {
        self.filter.parse(filters);
        self
    }

    /// Append a new writer.
    pub fn add_writer(mut self, writer: Box<dyn Writer>) -> Self {
        self.writer.add(writer);
        self
    }

    /// Initializes the global logger with the built logger.
    ///
    /// # Errors
    ///
    /// This function will fail if it is called more than once, or if another
    /// library has already initialized a global logger.
    pub fn try_init(self) -> Result<LoggerConfig, SetLoggerError> {
        let (logger, config) = self.build();

        let max_level = logger.filter();
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(max_level);
        Ok(config)
    }

    /// Build a logger without installing it.
    pub fn build(mut self) -> (Logger, LoggerConfig) {
        let filter = Arc::new(ArcSwap::from_pointee(self.filter.build()));

        let writer: Box<dyn Writer> = if self.writer.writers.len() == 1 {
            self.writer.writers.remove(0)
        } else {
            Box::new(self.writer)
        };

        (
            Logger {
                writer,
                filter: filter.clone(),
                format: self.format.build(),
            },
            LoggerConfig { filter },
        )
    }
}

/// Handle to change the filter of an installed logger.
#[derive(Clone)]
pub struct LoggerConfig {
    filter: Arc<ArcSwap<Filter>>,
}

impl LoggerConfig {
    /// Replaces the filter with the directives given in the `RUST_LOG` format.
    pub fn update_filters(&self, filters: &str) {
        let new_filter = env_filter::Builder::default().parse(filters).build();
        let max_level = new_filter.filter();
        self.filter.store(Arc::new(new_filter));
        log::set_max_level(max_level);
    }
}

impl Logger {
    /// Returns the maximum `LevelFilter` that this logger instance is
    /// configured to output.
    pub fn filter(&self) -> LevelFilter {
        self.filter.load().filter()
    }

    /// Checks if this record matches the configured filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.filter.load().matches(record)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.load().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.matches(record) {
            return;
        }

        thread_local! {
            static LINE: RefCell<String> = RefCell::new(String::new());
        }

        let print = |line: &mut String| {
            if (self.format)(line, record).is_ok() {
                self.writer.print(line.as_str());
            }
            line.clear();
        };

        // The buffer is already borrowed if a writer logs itself.
        let printed = LINE
            .try_with(|line| match line.try_borrow_mut() {
                Ok(mut line) => print(&mut *line),
                Err(_) => print(&mut String::new()),
            })
            .is_ok();

        if !printed {
            print(&mut String::new());
        }
    }

    fn flush(&self) {}
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("filter", &self.filter)
            .finish()
    }
}

/// Builds and installs the global logger based on the settings.
pub fn init_log(settings: &LogSettings) -> Result<LoggerConfig, SetLoggerError> {
    let mut builder = Builder::default().parse_filters(&settings.log_filter);

    if settings.enable_console {
        builder = builder.add_writer(Box::new(ConsoleWriter {}));
    }

    if settings.in_memory_records > 0 {
        InMemoryWriter::init_buffer(settings.in_memory_records);
        builder = builder.add_writer(Box::new(InMemoryWriter::new(settings.max_record_length)));
    }

    builder.try_init()
}

/// Take the log memory records for the circular buffer.
pub fn take_memory_records(pagination: Pagination) -> Logs {
    InMemoryWriter::take_records(pagination.count, pagination.offset)
}
