//! One-shot readiness signal for collaborators that attach after the map exists.
//!
//! The collaborator resolves a [`ReadySignal`] once; any number of
//! [`ReadyHandle`]s can wait on it with a timeout.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadyError {
    #[error("Timeout: {name} did not become available within {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    #[error("{0} was dropped before becoming available")]
    Closed(String),
}

pub struct ReadySignal<T> {
    name: Arc<str>,
    tx: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for ReadySignal<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> ReadySignal<T> {
    pub fn new(name: &str) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            name: Arc::from(name),
            tx: Arc::new(tx),
        }
    }

    /// Make `value` available. Only the first call has an effect.
    pub fn resolve(&self, value: T) -> bool {
        let resolved = self.tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(value);
                true
            } else {
                false
            }
        });
        if resolved {
            log::debug!("{} is ready", self.name);
        } else {
            log::warn!("{} was already resolved; ignoring", self.name);
        }
        resolved
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn get(&self) -> Option<T> {
        (*self.tx.borrow()).clone()
    }

    pub fn handle(&self) -> ReadyHandle<T> {
        ReadyHandle {
            name: Arc::clone(&self.name),
            rx: self.tx.subscribe(),
        }
    }
}

pub struct ReadyHandle<T> {
    name: Arc<str>,
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> ReadyHandle<T> {
    /// Wait until the value is available, failing once `timeout` elapses.
    ///
    /// Returns immediately if the signal was already resolved. There is no retry.
    pub async fn wait(mut self, timeout: Duration) -> Result<T, ReadyError> {
        match tokio::time::timeout(timeout, self.rx.wait_for(Option::is_some)).await {
            Ok(Ok(slot)) => (*slot)
                .clone()
                .ok_or_else(|| ReadyError::Closed(self.name.to_string())),
            Ok(Err(_)) => Err(ReadyError::Closed(self.name.to_string())),
            Err(_) => Err(ReadyError::Timeout {
                name: self.name.to_string(),
                timeout,
            }),
        }
    }
}
