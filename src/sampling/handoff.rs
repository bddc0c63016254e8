//! Producer/consumer split of acquisition and filtering.
//!
//! The producer only acquires raw samples. When its buffer seals, the whole
//! buffer is moved through a channel to the worker thread; the move is the
//! commit, so the worker can never observe an index the producer has not
//! written. The worker filters the buffer in bulk and sends it back, which is
//! the "processed" transition. Nothing is shared between the two sides.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};

use crate::config::FilterKind;
use crate::error::{FilterError, Result};
use crate::sampling::{CaptureBuffer, PushStatus};
use crate::signal_processing::{Filter, FilterBank};

enum WorkerMessage {
    /// Buffer tagged with the producer's capture generation
    Process(u64, CaptureBuffer),
    Select(FilterKind),
    Reset,
    Shutdown,
}

/// Consumer side: owns the filters and processes sealed buffers
pub struct FilterWorker {
    bank: FilterBank,
    rx: Receiver<WorkerMessage>,
    done_tx: Sender<(u64, CaptureBuffer)>,
}

impl FilterWorker {
    fn run(mut self) {
        while let Ok(message) = self.rx.recv() {
            match message {
                WorkerMessage::Process(generation, mut buffer) => {
                    // each capture is a separate record, filter it from zero state
                    self.bank.reset();
                    buffer.apply_filter(&mut self.bank);
                    log::debug!(
                        "Filtered {} samples with {}",
                        buffer.len(),
                        self.bank.active().label()
                    );
                    if self.done_tx.send((generation, buffer)).is_err() {
                        break;
                    }
                }
                WorkerMessage::Select(kind) => {
                    self.bank.select(kind);
                }
                WorkerMessage::Reset => self.bank.reset_all(),
                WorkerMessage::Shutdown => break,
            }
        }
        log::debug!("Filter worker stopped");
    }
}

/// Producer side of the handoff
///
/// At most one buffer is out at a time, either with the worker or with the
/// caller after collection. `reset` bumps the capture generation, so a buffer
/// still with the worker is dropped when it comes back.
pub struct CaptureProducer {
    buffer: Option<CaptureBuffer>,
    capacity: usize,
    generation: u64,
    awaiting: bool,
    to_worker: Sender<WorkerMessage>,
    from_worker: Receiver<(u64, CaptureBuffer)>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureProducer {
    /// Start the filter worker thread and return the producer that feeds it
    pub fn spawn(bank: FilterBank, capacity: usize) -> Result<Self> {
        let (to_worker, rx) = bounded(4);
        // one buffer in flight at a time
        let (done_tx, from_worker) = bounded(1);

        let worker = FilterWorker { bank, rx, done_tx };
        let handle = thread::Builder::new()
            .name("filter-worker".into())
            .spawn(move || worker.run())
            .map_err(|e| FilterError::WorkerDisconnected(e.to_string()))?;

        Ok(Self {
            buffer: Some(CaptureBuffer::new(capacity)),
            capacity,
            generation: 0,
            awaiting: false,
            to_worker,
            from_worker,
            worker: Some(handle),
        })
    }

    /// Acquire one raw sample.
    ///
    /// Returns `Rejected` while the previous buffer is still with the worker;
    /// acquisition never blocks.
    pub fn push(&mut self, raw: f32) -> Result<PushStatus> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(PushStatus::Rejected);
        };

        let status = buffer.push_raw(raw);
        if status == PushStatus::Sealed {
            self.commit()?;
        }
        Ok(status)
    }

    /// Hand the current buffer to the worker even if it is not full
    pub fn commit(&mut self) -> Result<()> {
        if let Some(mut buffer) = self.buffer.take() {
            buffer.seal();
            self.awaiting = true;
            self.send(WorkerMessage::Process(self.generation, buffer))?;
        }
        Ok(())
    }

    /// Take the processed buffer if the worker has finished with it
    pub fn try_collect(&mut self) -> Result<Option<CaptureBuffer>> {
        loop {
            match self.from_worker.try_recv() {
                Ok((generation, buffer)) => {
                    if let Some(buffer) = self.accept(generation, buffer) {
                        return Ok(Some(buffer));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    return Err(FilterError::WorkerDisconnected(
                        "filter worker exited".into(),
                    ));
                }
            }
        }
    }

    /// Wait up to `timeout` for the processed buffer
    pub fn collect_timeout(&mut self, timeout: Duration) -> Result<Option<CaptureBuffer>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.from_worker.recv_deadline(deadline) {
                Ok((generation, buffer)) => {
                    if let Some(buffer) = self.accept(generation, buffer) {
                        return Ok(Some(buffer));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(FilterError::WorkerDisconnected(
                        "filter worker exited".into(),
                    ));
                }
            }
        }
    }

    fn accept(&mut self, generation: u64, buffer: CaptureBuffer) -> Option<CaptureBuffer> {
        if generation != self.generation {
            log::debug!("Dropping {} samples from an aborted capture", buffer.len());
            return None;
        }
        self.awaiting = false;
        Some(buffer)
    }

    /// Return the collected buffer so acquisition can resume
    ///
    /// Only accepted when the producer has no buffer of its own and nothing
    /// is pending with the worker; otherwise the buffer is dropped. Returns
    /// whether it was taken.
    pub fn recycle(&mut self, mut buffer: CaptureBuffer) -> bool {
        if self.buffer.is_some() || self.awaiting {
            log::warn!("Ignoring recycled buffer, a capture is already in progress");
            return false;
        }
        buffer.reset();
        self.buffer = Some(buffer);
        true
    }

    pub fn select(&mut self, kind: FilterKind) -> Result<()> {
        self.send(WorkerMessage::Select(kind))
    }

    /// Abort the capture in progress and clear the worker's filter state
    ///
    /// A buffer already handed to the worker is discarded when it returns,
    /// and acquisition restarts at once into a fresh buffer.
    pub fn reset(&mut self) -> Result<()> {
        self.generation = self.generation.wrapping_add(1);
        self.awaiting = false;
        match self.buffer.as_mut() {
            Some(buffer) => buffer.reset(),
            None => self.buffer = Some(CaptureBuffer::new(self.capacity)),
        }
        self.send(WorkerMessage::Reset)
    }

    /// True while a sealed buffer is with the worker
    pub fn in_flight(&self) -> bool {
        self.buffer.is_none()
    }

    /// Stop the worker and wait for it to exit
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        // a worker blocked on an uncollected result sees the receiver gone
        drop(std::mem::replace(&mut self.from_worker, crossbeam_channel::never()));
        // the worker may already be gone, joining reports that
        let _ = self.to_worker.send(WorkerMessage::Shutdown);
        handle
            .join()
            .map_err(|_| FilterError::WorkerDisconnected("filter worker panicked".into()))
    }

    fn send(&self, message: WorkerMessage) -> Result<()> {
        self.to_worker
            .send(message)
            .map_err(|_| FilterError::WorkerDisconnected("filter worker exited".into()))
    }
}

impl Drop for CaptureProducer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("{}", e);
        }
    }
}
