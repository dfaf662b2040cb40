//! Hand-off of frames to a dedicated worker thread.
//!
//! Delivery runs on the connection task, so a consumer that blocks or does
//! heavy work stalls every handler after it. Wrapping such a consumer in an
//! [`OffloadHandler`] moves it onto its own OS thread fed by a bounded
//! crossbeam channel; the connection task only pays for a copy and a
//! `try_send`.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{info, warn};

use super::{MessageHandler, SharedHandler, invoke_isolated};

pub struct OffloadHandler {
    label: String,
    tx: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl OffloadHandler {
    /// Spawn the worker thread. At most `capacity` frames wait in the queue;
    /// further frames are dropped with a warning until it drains.
    pub fn spawn(label: impl Into<String>, capacity: usize, handler: SharedHandler) -> std::io::Result<Self> {
        let label = label.into();
        let (tx, rx) = crossbeam_channel::bounded::<String>(capacity.max(1));

        let worker_label = label.clone();
        let worker = thread::Builder::new().name(format!("offload-{label}")).spawn(move || {
            info!("[{worker_label}] offload worker started");
            while let Ok(message) = rx.recv() {
                invoke_isolated(&worker_label, handler.as_ref(), &message);
            }
            info!("[{worker_label}] offload worker stopped");
        })?;

        Ok(Self { label, tx: Some(tx), worker: Some(worker) })
    }

    /// Frames waiting for the worker.
    pub fn pending(&self) -> usize {
        self.tx.as_ref().map_or(0, Sender::len)
    }

    /// Close the queue and block until the worker has handled everything
    /// already queued. Not for use on an async task.
    pub fn shutdown(mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

impl MessageHandler for OffloadHandler {
    fn on_message(&self, message: &str) {
        let Some(tx) = &self.tx else { return };
        match tx.try_send(message.to_string()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("[{}] queue full, dropping message", self.label),
            Err(TrySendError::Disconnected(_)) => warn!("[{}] worker gone, dropping message", self.label),
        }
    }
}

impl Drop for OffloadHandler {
    /// Close the queue without waiting. The detached worker handles what is
    /// left and exits; use [`shutdown`](OffloadHandler::shutdown) to wait.
    fn drop(&mut self) {
        self.tx.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn worker_sees_messages_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let offload = OffloadHandler::spawn(
            "order",
            16,
            Arc::new(move |m: &str| s.lock().unwrap().push(m.to_string())),
        )
        .unwrap();

        for i in 0..5 {
            offload.on_message(&format!("m{i}"));
        }
        offload.shutdown();

        assert_eq!(*seen.lock().unwrap(), vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let count = Arc::new(Mutex::new(0usize));
        let c = count.clone();

        let offload = OffloadHandler::spawn(
            "slow",
            1,
            Arc::new(move |_: &str| {
                let _ = release_rx.lock().unwrap().recv_timeout(Duration::from_secs(5));
                *c.lock().unwrap() += 1;
            }),
        )
        .unwrap();

        // First frame occupies the worker, second fills the queue, the rest drop.
        offload.on_message("a");
        std::thread::sleep(Duration::from_millis(50));
        for _ in 0..10 {
            offload.on_message("b");
        }
        assert_eq!(offload.pending(), 1);

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        offload.shutdown();
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn drop_does_not_wait_for_a_busy_worker() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let (done_tx, done_rx) = mpsc::channel::<String>();
        let done_tx = Mutex::new(done_tx);

        let offload = OffloadHandler::spawn(
            "detach",
            4,
            Arc::new(move |m: &str| {
                let _ = release_rx.lock().unwrap().recv_timeout(Duration::from_secs(5));
                let _ = done_tx.lock().unwrap().send(m.to_string());
            }),
        )
        .unwrap();
        offload.on_message("a");
        offload.on_message("b");

        let started = std::time::Instant::now();
        drop(offload);
        assert!(started.elapsed() < Duration::from_secs(1));

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "a");
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "b");
    }
}
