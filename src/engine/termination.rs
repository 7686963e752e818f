// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One-shot termination signals shared by tasks, producers and consumers.
//!
//! A signal is closed by firing its [`TerminationTrigger`]. The trigger is
//! consumed when fired, so each signal closes at most once. Any number of
//! clones of a [`TerminationSignal`] can wait on it, before or after it closes.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Wait handle that completes once the owning component has terminated.
#[derive(Clone, Debug)]
pub struct TerminationSignal {
    token: Arc<CancellationToken>,
}

impl TerminationSignal {
    /// Wait until the signal is closed. Returns immediately if it already is.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }

    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True when both handles observe the same underlying signal.
    pub fn same_signal(&self, other: &TerminationSignal) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }

    /// A signal that closes when `cancel` fires.
    ///
    /// For stages with no asynchronous work of their own: they are finished as
    /// soon as they have been asked to stop.
    pub fn follow(cancel: &CancellationToken) -> Self {
        Self {
            token: Arc::new(cancel.clone()),
        }
    }

    /// A signal that is already closed.
    pub fn terminated() -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self {
            token: Arc::new(token),
        }
    }
}

/// Closing half of a termination signal.
#[derive(Debug)]
pub struct TerminationTrigger {
    token: Arc<CancellationToken>,
}

impl TerminationTrigger {
    pub fn fire(self) {
        self.token.cancel();
    }
}

pub fn termination_channel() -> (TerminationTrigger, TerminationSignal) {
    let token = Arc::new(CancellationToken::new());
    (
        TerminationTrigger {
            token: token.clone(),
        },
        TerminationSignal { token },
    )
}
