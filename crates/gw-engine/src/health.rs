//! Connectivity sampling
//!
//! Collaborators rarely care about individual state transitions; they want
//! a coarse "is the channel up" signal that does not flood them during
//! reconnect churn. The monitor samples the manager's state watch on a
//! fixed interval and publishes the boolean only when it changes.

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use gw_core::error::{GwError, TransportError};
use gw_core::types::ConnectionState;

/// Samples connection state into a boolean connectivity signal
pub struct HealthMonitor {
    /// Sampling interval
    sample_interval: Duration,
}

impl HealthMonitor {
    /// Create a new monitor
    pub fn new(sample_interval: Duration) -> Self {
        Self { sample_interval }
    }

    /// Start sampling the given state subscription.
    ///
    /// Fails when the subscription's publisher is already gone, i.e. there
    /// is no active connection manager to observe.
    pub fn spawn(
        &self,
        state_rx: watch::Receiver<ConnectionState>,
        cancel: CancellationToken,
    ) -> Result<watch::Receiver<bool>, GwError> {
        if state_rx.has_changed().is_err() {
            return Err(GwError::Transport(TransportError::ChannelClosed(
                "no active connection manager to monitor".to_string(),
            )));
        }

        let (tx, rx) = watch::channel(state_rx.borrow().is_connected());
        let interval = self.sample_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let up = state_rx.borrow().is_connected();
                        tx.send_if_modified(|current| {
                            if *current != up {
                                *current = up;
                                true
                            } else {
                                false
                            }
                        });
                        if tx.is_closed() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_monitor_requires_an_active_manager() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        drop(state_tx);

        let monitor = HealthMonitor::new(Duration::from_millis(2000));
        assert!(monitor
            .spawn(state_rx, CancellationToken::new())
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transitions_are_coalesced_to_samples() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);
        let monitor = HealthMonitor::new(Duration::from_millis(2000));
        let mut health = monitor
            .spawn(state_rx, CancellationToken::new())
            .unwrap();

        assert!(*health.borrow());

        // flap within one sampling window: down and back up
        state_tx.send_replace(ConnectionState::Reconnecting);
        state_tx.send_replace(ConnectionState::Connected);
        tokio::time::sleep(Duration::from_millis(2100)).await;
        // the flap fell between samples; signal never changed
        assert!(!health.has_changed().unwrap());

        // a lasting drop is visible at the next sample
        state_tx.send_replace(ConnectionState::Disconnected);
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(health.has_changed().unwrap());
        assert!(!*health.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_sampling() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);
        let cancel = CancellationToken::new();
        let monitor = HealthMonitor::new(Duration::from_millis(2000));
        let mut health = monitor.spawn(state_rx, cancel.clone()).unwrap();

        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;

        state_tx.send_replace(ConnectionState::Disconnected);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(!health.has_changed().unwrap_or(false));
    }
}
