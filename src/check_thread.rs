//! Background thread that delivers audio-context notifications.

use consort_core::PluginHost;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) struct CheckThread {
    stop: Sender<()>,
    done: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl CheckThread {
    pub(crate) fn spawn(host: Arc<PluginHost>, interval: Duration) -> std::io::Result<Self> {
        let (stop, stop_rx) = bounded(1);
        let (done_tx, done) = bounded(1);

        let handle = thread::Builder::new()
            .name("consort-check".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            host.dispatch_posted();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                let _ = done_tx.send(());
            })?;

        Ok(Self {
            stop,
            done,
            handle: Some(handle),
        })
    }

    /// Ask the thread to exit and wait up to `timeout`. A thread that does not
    /// answer in time is detached. Returns whether it stopped.
    pub(crate) fn stop(mut self, timeout: Duration) -> bool {
        let _ = self.stop.send(());

        match self.done.recv_timeout(timeout) {
            Ok(()) => {
                if let Some(handle) = self.handle.take() {
                    if handle.join().is_err() {
                        tracing::error!("check thread panicked");
                    }
                }
                true
            }
            Err(_) => {
                tracing::warn!(?timeout, "check thread did not stop in time, detaching");
                false
            }
        }
    }
}
