//! The process-wide shared log sink.
//!
//! The [`Logger`] is constructed lazily on the first call to [`get_shared`]
//! from any thread and lives for the remainder of the process.
//! Emitting records is synchronized by the logger's own lock, which is
//! independent of the lock guarding its construction.
//!
//! # Examples
//!
//! ```
//! use std::thread;
//!
//! let handles: Vec<_> = ["client1", "client2"]
//!     .into_iter()
//!     .map(|client| {
//!         thread::spawn(move || {
//!             let logger = sole::logger::get_shared();
//!             logger.emit(format_args!("This message is from {}", client)).unwrap();
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(sole::logger::construction_count(), 1);
//! ```

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::Coordinator;

/// The shared logger of the process, writing to the standard output.
static SHARED: Coordinator<Logger> = Coordinator::new(Logger::stdout);

/// Returns the process-wide [`Logger`], constructing it on the first call.
///
/// Every call from every thread returns a reference to the same instance.
/// Once it exists, this function never blocks.
#[inline]
pub fn get_shared() -> &'static Logger {
    Coordinator::get_shared(&SHARED)
}

/// Returns the number of times the process-wide [`Logger`] has been
/// constructed, i.e., `0` before the first call to [`get_shared`] and `1`
/// ever after.
#[inline]
pub fn construction_count() -> usize {
    Coordinator::construction_count(&SHARED)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Logger
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A line oriented log sink, which can be written to from many threads.
pub struct Logger {
    sink: Mutex<Box<dyn Write + Send>>,
    records: AtomicUsize,
}

/********** impl inherent *************************************************************************/

impl Logger {
    /// Creates a new [`Logger`] writing to the standard output.
    #[inline]
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Creates a new [`Logger`] writing to the standard error.
    #[inline]
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Creates a new [`Logger`] writing to `writer`.
    #[inline]
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self { sink: Mutex::new(Box::new(writer)), records: AtomicUsize::new(0) }
    }

    /// Appends `message` as a single line to the sink.
    ///
    /// Concurrent calls are serialized, so lines are never interleaved.
    ///
    /// # Errors
    ///
    /// Fails if writing to or flushing the sink fails.
    pub fn emit(&self, message: impl fmt::Display) -> io::Result<()> {
        let mut sink = self.sink();
        writeln!(sink, "{}", message)?;
        sink.flush()?;
        self.records.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Returns the number of records emitted so far.
    #[inline]
    pub fn records(&self) -> usize {
        self.records.load(Ordering::Relaxed)
    }

    /// Registers this logger as the backend of the [`log`] facade and sets
    /// the maximum level of records to be emitted.
    ///
    /// # Errors
    ///
    /// Fails if a backend has already been registered.
    pub fn install(&'static self, level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(level);
        Ok(())
    }

    #[inline]
    fn sink(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // a panic while holding the lock can at worst have cut a line short
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/********** impl Debug ****************************************************************************/

impl fmt::Debug for Logger {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("records", &self.records()).finish_non_exhaustive()
    }
}

/********** impl Log ******************************************************************************/

impl Log for Logger {
    /// Always `true`, filtering by level is left to the `log` macros.
    #[inline]
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        // `Log::log` can not report errors
        let _ = self.emit(format_args!(
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    #[inline]
    fn flush(&self) {
        let _ = self.sink().flush();
    }
}
