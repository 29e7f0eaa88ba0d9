//! Cross-thread message inlet
//!
//! The runtime core is single-threaded; this bounded channel is the one
//! synchronized hand-off point into it. Producer threads (transports,
//! input pumps, tooling) post through cloned [`MessageInlet`] handles, and
//! the manager drains the receiving end into the process queue at the
//! start of each frame — messages never enter the pipeline anywhere else.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use types::Message;

/// Error returned by [`MessageInlet::post`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum InletError {
    /// The bounded channel is full; the producer should back off
    #[error("message inlet is full (capacity {capacity})")]
    Full { capacity: usize },

    /// The runtime is gone and the receiving end with it
    #[error("message inlet is closed")]
    Closed,
}

/// Cloneable producer handle
#[derive(Clone)]
pub struct MessageInlet {
    tx: Sender<Message>,
    capacity: usize,
}

impl MessageInlet {
    /// Post a message from any thread
    ///
    /// It enters the process queue at the next frame boundary. Never
    /// blocks: a full inlet is reported to the producer instead of stalling
    /// the frame loop's peers.
    pub fn post(&self, message: Message) -> Result<(), InletError> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => InletError::Full {
                capacity: self.capacity,
            },
            TrySendError::Disconnected(_) => InletError::Closed,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Build an inlet pair; the manager keeps the receiver
pub(crate) fn channel(capacity: usize) -> (MessageInlet, Receiver<Message>) {
    let (tx, rx) = bounded(capacity);
    (MessageInlet { tx, capacity }, rx)
}
