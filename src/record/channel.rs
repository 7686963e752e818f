// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::Record;
use crate::config::consts::MAX_CHANNEL_CAPACITY;

pub type RecordSender = mpsc::Sender<Record>;

/// Receiving half of a producer's record channel, shared by every worker of a task.
///
/// Clones share one underlying receiver. Workers wait on a fair lock, so
/// delivery is first-come-first-served and each record reaches exactly one
/// worker. `recv` returns `None` once every sender is dropped and the buffer
/// is drained; that is the only signal that ends a worker loop.
#[derive(Clone, Debug)]
pub struct RecordReceiver {
    inner: Arc<Mutex<mpsc::Receiver<Record>>>,
}

impl RecordReceiver {
    pub fn new(receiver: mpsc::Receiver<Record>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(receiver)),
        }
    }

    pub async fn recv(&self) -> Option<Record> {
        self.inner.lock().await.recv().await
    }
}

/// Create a bounded record channel. The capacity is clamped to
/// `1..=MAX_CHANNEL_CAPACITY`.
pub fn record_channel(capacity: usize) -> (RecordSender, RecordReceiver) {
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
    (tx, RecordReceiver::new(rx))
}
