//! Event fan-out.
//!
//! Subscribers get their own unbounded channel; emitting clones the
//! event into every live channel and prunes the ones whose receiver is
//! gone. Dispatch order follows subscription order.

use std::sync::Mutex;

use async_channel::{Receiver, Sender};

pub struct EventBus<T> {
    subscribers: Mutex<Vec<Sender<T>>>,
}

impl<T: Clone> EventBus<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = async_channel::unbounded();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    pub fn emit(&self, event: T) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
