//! Rotating writer handle and its background worker

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use logrotate_core::{constants, Error, Result, RotateConfig, ShutdownPolicy};
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, warn};
use tracing_subscriber::fmt::MakeWriter;

use crate::rotation::ActiveFile;

/// Stop request. The worker answers on the enclosed channel once the live
/// file is closed.
struct Stop(Sender<()>);

struct Shared {
    config: RotateConfig,
    data_tx: Sender<Vec<u8>>,
    control_tx: Sender<Stop>,
    worker_id: ThreadId,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn close(&self) {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        let (ack_tx, ack_rx) = bounded(1);
        if self.control_tx.send(Stop(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
        if handle.join().is_err() {
            warn!("Log writer thread for {} panicked", self.config.path.display());
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.close();
    }
}

/// Size-rotating log writer.
///
/// Payloads are handed to a background thread that owns the live file, so
/// [`write`](Self::write) never waits on disk I/O. It only blocks while the
/// queue is full. Clones share the same thread and file; dropping the last
/// clone closes the writer.
///
/// Delivery is best effort: an I/O failure on the background thread drops the
/// payload that hit it (and reopens the file). Such failures are logged with
/// `tracing` but never reported to callers.
#[derive(Clone)]
pub struct RotatingWriter {
    shared: Arc<Shared>,
}

impl RotatingWriter {
    /// Open the live file and start the writer thread.
    ///
    /// Creates the parent directory if needed and rotates right away when
    /// the existing file is already larger than `max_size`.
    pub fn new(config: RotateConfig) -> Result<Self> {
        config.validate()?;
        let active = ActiveFile::open(config.clone())?;

        let (data_tx, data_rx) = bounded(config.queue_capacity);
        let (control_tx, control_rx) = unbounded();
        let policy = config.shutdown;

        let handle = thread::Builder::new()
            .name(constants::WORKER_THREAD_NAME.to_string())
            .spawn(move || run(active, data_rx, control_rx, policy))?;

        debug!(
            "Started rotating writer for {} (max_size={}, max_files={})",
            config.path.display(),
            config.max_size,
            config.max_files
        );

        Ok(Self {
            shared: Arc::new(Shared {
                worker_id: handle.thread().id(),
                config,
                data_tx,
                control_tx,
                worker: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Queue a payload for appending.
    ///
    /// Returns the full length on acceptance, or [`Error::Closed`] once the
    /// writer has been closed.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.enqueue(buf)
    }

    fn enqueue(&self, buf: &[u8]) -> Result<usize> {
        // Events the worker logs through this writer are discarded: queueing
        // them would let each rotation's own output trigger the next one.
        if thread::current().id() == self.shared.worker_id {
            return Ok(buf.len());
        }

        self.shared.data_tx.send(buf.to_vec()).map_err(|_| Error::Closed)?;
        Ok(buf.len())
    }

    /// Stop the writer thread and close the live file.
    ///
    /// Blocks until the thread has acknowledged. Whether queued payloads are
    /// written first depends on [`ShutdownPolicy`]. Later calls return at once.
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.worker.lock().is_none()
    }

    /// Path of the live file
    pub fn path(&self) -> &Path {
        &self.shared.config.path
    }

    pub fn config(&self) -> &RotateConfig {
        &self.shared.config
    }
}

impl io::Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.enqueue(buf).map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn write_payload(active: &mut ActiveFile, payload: &[u8]) {
    if let Err(e) = active.append(payload) {
        warn!(
            "Log write to {} failed ({} bytes): {}",
            active.path().display(),
            payload.len(),
            e
        );
    }
}

fn run(
    mut active: ActiveFile,
    data_rx: Receiver<Vec<u8>>,
    control_rx: Receiver<Stop>,
    policy: ShutdownPolicy,
) {
    loop {
        select! {
            recv(data_rx) -> msg => match msg {
                Ok(payload) => write_payload(&mut active, &payload),
                Err(_) => break,
            },
            recv(control_rx) -> msg => {
                if policy == ShutdownPolicy::Drain {
                    // Only what was queued when the stop arrived, so busy
                    // producers cannot hold close() open.
                    let pending = data_rx.len();
                    for payload in data_rx.try_iter().take(pending) {
                        write_payload(&mut active, &payload);
                    }
                }
                active.close();
                if let Ok(Stop(ack)) = msg {
                    let _ = ack.send(());
                }
                return;
            }
        }
    }
    active.close();
}
