use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::types::Batch;

#[derive(Debug, PartialEq, Eq)]
pub enum BatchPoll {
    Ready(Batch),
    Pending,
    Done,
}

/// Consumer side of a gather. Batches arrive in scan order; dropping the
/// stream tells the producer to stop.
#[derive(Debug)]
pub struct EntryStream {
    receiver: Option<Receiver<Batch>>,
    canceled: Arc<AtomicBool>,
}

/// Producer side handed to the scan worker.
#[derive(Debug)]
pub(crate) struct BatchSink {
    sender: Sender<Batch>,
    canceled: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Canceled;

impl BatchSink {
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    /// Blocks until the consumer takes the batch.
    pub fn send(&self, batch: Batch) -> Result<(), Canceled> {
        if self.is_canceled() {
            return Err(Canceled);
        }
        self.sender.send(batch).map_err(|_| Canceled)
    }
}

impl EntryStream {
    /// Rendezvous channel: the producer cannot get more than one batch ahead.
    pub(crate) fn channel() -> (BatchSink, EntryStream) {
        let (sender, receiver) = crossbeam_channel::bounded(0);
        let canceled = Arc::new(AtomicBool::new(false));
        (
            BatchSink {
                sender,
                canceled: Arc::clone(&canceled),
            },
            EntryStream {
                receiver: Some(receiver),
                canceled,
            },
        )
    }

    pub fn empty() -> Self {
        Self {
            receiver: None,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_batch(batch: Batch) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        // Capacity 1 and the receiver is alive, so this cannot fail.
        let _ = sender.send(batch);
        Self {
            receiver: Some(receiver),
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Blocks until the next batch is available. `None` once the stream ended.
    pub fn next_batch(&mut self) -> Option<Batch> {
        let batch = self.receiver.as_ref()?.recv().ok();
        if batch.is_none() {
            self.receiver = None;
        }
        batch
    }

    pub fn poll(&mut self) -> BatchPoll {
        let Some(receiver) = self.receiver.as_ref() else {
            return BatchPoll::Done;
        };

        match receiver.try_recv() {
            Ok(batch) => BatchPoll::Ready(batch),
            Err(TryRecvError::Empty) => BatchPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                BatchPoll::Done
            }
        }
    }

    pub fn cancel(&mut self) {
        self.canceled.store(true, Ordering::Relaxed);
        self.receiver = None;
    }

    pub fn is_done(&self) -> bool {
        self.receiver.is_none()
    }
}

impl Iterator for EntryStream {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        self.next_batch()
    }
}

impl Drop for EntryStream {
    fn drop(&mut self) {
        self.canceled.store(true, Ordering::Relaxed);
    }
}
