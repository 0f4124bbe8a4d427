//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Runtime helpers supporting the simulation driver."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Owning side of the shared stop flag.
///
/// Every [`StopListener`] observes the same flag; raising it is idempotent.
#[derive(Debug)]
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> StopListener {
        StopListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        if !*self.tx.borrow() {
            debug!("stop signal raised");
        }
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a [`StopSignal`], cheap to clone into each worker.
#[derive(Debug, Clone)]
pub struct StopListener {
    rx: watch::Receiver<bool>,
}

impl StopListener {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal has been raised.
    ///
    /// Also resolves when the [`StopSignal`] is dropped, since nothing can
    /// raise it anymore and waiting forever would hang the caller.
    pub async fn stopped(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

/// Sleep for `duration` unless the stop signal fires first.
///
/// Returns `true` when the sleep was cut short by the stop signal.
pub async fn sleep_or_stop(duration: Duration, listener: &mut StopListener) -> bool {
    if listener.is_stopped() {
        return true;
    }
    if duration.is_zero() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => listener.is_stopped(),
        _ = listener.stopped() => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_completes_without_stop() {
        let signal = StopSignal::new();
        let mut listener = signal.subscribe();
        assert!(!sleep_or_stop(Duration::from_secs(5), &mut listener).await);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_sleep() {
        let signal = StopSignal::new();
        let mut listener = signal.subscribe();
        let task = tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let stopped = sleep_or_stop(Duration::from_secs(3600), &mut listener).await;
            (stopped, started.elapsed())
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        signal.trigger();
        let (stopped, elapsed) = task.await.unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn listeners_share_the_flag() {
        let signal = StopSignal::new();
        let first = signal.subscribe();
        let second = first.clone();
        assert!(!first.is_stopped());
        signal.trigger();
        signal.trigger();
        assert!(first.is_stopped());
        assert!(second.is_stopped());
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn already_stopped_returns_immediately() {
        let signal = StopSignal::new();
        let mut listener = signal.subscribe();
        signal.trigger();
        assert!(sleep_or_stop(Duration::from_secs(3600), &mut listener).await);
        listener.stopped().await;
    }
}
