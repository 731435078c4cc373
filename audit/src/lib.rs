//! Audit logging library
//!
//! A leveled log sink for request handlers:
//! - Level filtering with a permissive level-name parser
//! - Call-site capture (file, line, function) at compile time
//! - Optional attribution to the identity of the current request
//! - Synchronous console output
//! - Best-effort persistence through a [`LogRepository`], drained by a single
//!   background worker so that storage never slows down the caller
//!
//! The sink is an explicit value: build one at startup and hand clones to
//! whatever needs to log.
//!
//! # Examples
//!
//! ```
//! use audit::{LogConfig, LogSink};
//!
//! let sink = LogSink::with_output(&LogConfig::default(), std::io::sink());
//! sink.set_level("warn");
//!
//! audit::info!(sink, "dropped: below the threshold");
//! audit::warn!(sink, "kept: {} retries left", 2);
//! ```

pub mod config;
pub mod entry;
pub mod identity;
pub mod level;
mod macros;
pub mod repository;
pub mod sink;

pub use config::LogConfig;
pub use entry::CallSite;
pub use entry::LogEntry;
pub use identity::Identity;
pub use level::Level;
pub use repository::LogRepository;
pub use repository::LogRepositoryError;
pub use sink::LogSink;
