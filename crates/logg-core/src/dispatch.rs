//! Asynchronous dispatch engine.
//!
//! ## Architecture
//!
//! ```text
//!  producers ──Write(record)──┐
//!  flush()  ──Flush(ack)──────┼──► bounded FIFO ──► worker thread ──► sinks
//!  close()  ──Close(ack)──────┘                         │
//!                                                       └──► ack / record pool
//! ```
//!
//! Messages and control tokens share one ordered channel, so a flush or close
//! is only seen by the worker after every message enqueued ahead of it has
//! been fanned out. A full queue blocks the producer rather than dropping.
//!
//! Flush and close wait for the worker without a timeout: a sink that hangs
//! in `write_msg` stalls every caller of `flush`/`close`.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Mutex, RwLock};

use crate::error::{LogError, Result};
use crate::record::{LogRecord, RecordPool};
use crate::sink::{destroy_all, fan_out, flush_all, NamedSink};

/// Sink list shared by the facade and the worker
pub(crate) type SharedSinks = Arc<RwLock<Vec<NamedSink>>>;

enum Command {
    Write(LogRecord),
    Flush(SyncSender<()>),
    Close(SyncSender<()>),
}

/// Handle to a running worker
pub(crate) struct Dispatcher {
    tx: SyncSender<Command>,
    pool: Arc<RecordPool>,
    /// One flush or close in flight at a time
    control: Mutex<()>,
    worker: JoinHandle<()>,
}

impl Dispatcher {
    /// Spawn the worker with a queue of `capacity` pending messages.
    pub(crate) fn start(sinks: SharedSinks, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel(capacity);
        let pool = Arc::new(RecordPool::new(capacity));

        let worker_pool = Arc::clone(&pool);
        let worker = thread::Builder::new()
            .name("logg-dispatch".into())
            .spawn(move || run(rx, sinks, worker_pool))?;

        tracing::debug!(capacity, "dispatch worker started");
        Ok(Self {
            tx,
            pool,
            control: Mutex::new(()),
            worker,
        })
    }

    /// Free list used to build records for this queue
    pub(crate) fn pool(&self) -> &RecordPool {
        &self.pool
    }

    /// Queue a record, blocking while the queue is full.
    pub(crate) fn enqueue(&self, record: LogRecord) -> Result<()> {
        self.tx
            .send(Command::Write(record))
            .map_err(|_| LogError::Closed)
    }

    /// Wait until everything queued before this call reached the sinks and
    /// every sink has been flushed.
    pub(crate) fn flush(&self) -> Result<()> {
        let _gate = self.control.lock();
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| LogError::Closed)?;
        ack_rx.recv().map_err(|_| LogError::Closed)
    }

    /// Drain the queue, flush and destroy every sink, then stop the worker.
    pub(crate) fn close(self) -> Result<()> {
        let acked = {
            let _gate = self.control.lock();
            let (ack_tx, ack_rx) = mpsc::sync_channel(1);
            self.tx
                .send(Command::Close(ack_tx))
                .map_err(|_| LogError::Closed)
                .and_then(|()| ack_rx.recv().map_err(|_| LogError::Closed))
        };

        drop(self.tx);
        if self.worker.join().is_err() {
            tracing::error!("dispatch worker panicked");
        }
        acked
    }
}

fn run(rx: Receiver<Command>, sinks: SharedSinks, pool: Arc<RecordPool>) {
    while let Ok(command) = rx.recv() {
        match command {
            Command::Write(record) => {
                fan_out(&sinks.read(), record.when(), record.text(), record.level());
                pool.release(record);
            }
            Command::Flush(ack) => {
                flush_all(&sinks.read());
                let _ = ack.send(());
            }
            Command::Close(ack) => {
                destroy_all(&mut sinks.write());
                let _ = ack.send(());
                break;
            }
        }
    }
    tracing::debug!("dispatch worker stopped");
}
