//! Upload progress events

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;

/// Sending half of an upload progress channel
///
/// The HTTP upload only ever sends non-decreasing percentages.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<u8>,
}

impl ProgressSender {
    /// Create a progress channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<u8>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report a percentage of the bundle handed to the transport
    pub fn send(&self, percent: u8) {
        // A dropped receiver only means nobody is watching
        let _ = self.tx.send(percent);
    }
}

/// Converts transmitted byte counts into percentage events
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    sender: ProgressSender,
    total: u64,
    sent: AtomicU64,
    last: Mutex<Option<u8>>,
}

impl ProgressTracker {
    pub(crate) fn new(sender: ProgressSender, total: u64) -> Self {
        Self {
            sender,
            total,
            sent: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    /// Emit the initial 0%, if a ratio can be computed at all
    pub(crate) fn start(&self) {
        if self.total > 0 {
            self.emit(0);
        }
    }

    /// Record bytes handed to the transport
    pub(crate) fn advance(&self, bytes: u64) {
        if self.total == 0 {
            return;
        }
        let sent = self.sent.fetch_add(bytes, Ordering::SeqCst) + bytes;
        let sent = sent.min(self.total) as u128;
        let total = self.total as u128;
        let percent = ((sent * 100 + total / 2) / total) as u8;
        self.emit(percent);
    }

    /// The upload phase is over; close the sequence at 100 if it was started
    pub(crate) fn finish(&self) {
        let started = self.last.lock().unwrap_or_else(|e| e.into_inner()).is_some();
        if started {
            self.emit(100);
        }
    }

    fn emit(&self, percent: u8) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let is_new = match *last {
            None => true,
            Some(previous) => percent > previous,
        };
        if is_new {
            *last = Some(percent);
            self.sender.send(percent);
        }
    }
}
