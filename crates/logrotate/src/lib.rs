//! logrotate - Size-based rotating log file writer
//!
//! [`RotatingWriter`] appends byte payloads to a live file from a dedicated
//! background thread. Once the file reaches `max_size` it is renamed to
//! `<path>.<UTC timestamp>` (for example `app.log.2024-05-01T12-30-05Z`), a
//! fresh file is opened at `path`, and all but the newest `max_files` rotated
//! files are deleted.
//!
//! ```no_run
//! use logrotate::{RotateConfig, RotatingWriter};
//!
//! fn main() -> logrotate::Result<()> {
//!     let writer = RotatingWriter::new(RotateConfig::new("logs/app.log", 10 * 1024 * 1024, 5))?;
//!     writer.write(b"service started\n")?;
//!     writer.close();
//!     Ok(())
//! }
//! ```
//!
//! # Known limitation
//!
//! Writes are fire-and-forget. If appending a payload fails, the writer
//! reopens the file and drops that payload; the failure is only visible in
//! `tracing` output. Callers cannot tell a written payload from a dropped one.

mod rotation;
mod scan;
mod writer;

pub use rotation::{rotated_path, rotation_suffix, ActiveFile};
pub use scan::sibling_logs;
pub use writer::RotatingWriter;

pub use logrotate_core::{ConfigFormat, Error, Result, RotateConfig, ShutdownPolicy};
