//! Leveled logging macros.
//!
//! Each macro takes the logger first and a format string after it:
//!
//! ```ignore
//! log_info!(logger, "listening on {}", addr);
//! log_error!(logger, "write failed: {}", err);
//! ```
//!
//! The arguments are only formatted when the level passes the logger's
//! threshold.

/// Log at an explicit level
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)*) => {
        $logger.log($level, ::std::format_args!($($arg)*))
    };
}

/// Log at fatal level
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => { $logger.fatal(::std::format_args!($($arg)*)) };
}

/// Log at error level
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => { $logger.error(::std::format_args!($($arg)*)) };
}

/// Log at warn level
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => { $logger.warn(::std::format_args!($($arg)*)) };
}

/// Log at info level
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => { $logger.info(::std::format_args!($($arg)*)) };
}

/// Log at debug level
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => { $logger.debug(::std::format_args!($($arg)*)) };
}
