//! Cancellable one-shot delayed task.
//!
//! The task runs on its own thread and waits on a channel with a timeout.
//! Cancelling (or dropping the handle) wakes the thread so the callback
//! never fires; [`ScheduledTask::cancel`] also joins, so once it returns
//! the callback has either already finished or will never run.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct ScheduledTask {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Run `callback` after `delay` unless cancelled first.
    pub fn spawn<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(delay) {
                callback();
            }
        });

        Self {
            cancel: Some(tx),
            handle: Some(handle),
        }
    }

    /// Whether the callback already ran (or the task was cancelled).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Cancel the task and wait for its thread to exit.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.stop();
    }
}
