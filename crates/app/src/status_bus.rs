//! In-process status bus backed by a tokio broadcast channel.
//!
//! The shadow reconciler publishes a [`StatusChange`] after persisting a
//! reported state; confirmation waits subscribe so they can re-check the
//! registry immediately instead of sleeping until the next poll tick.

use tokio::sync::broadcast;

use gardenhub_domain::id::DeviceId;

/// A device's persisted status changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub device_id: DeviceId,
    pub is_on: bool,
}

/// In-process status bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the change is simply dropped).
pub struct InProcessStatusBus {
    sender: broadcast::Sender<StatusChange>,
}

impl InProcessStatusBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to changes published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.sender.subscribe()
    }

    pub fn publish(&self, change: StatusChange) {
        // Fails only when nobody listens.
        let _ = self.sender.send(change);
    }
}

/// Wait until `rx` yields a change for `device_id`.
///
/// Lagging is treated as a wake-up: the caller re-reads the registry anyway.
/// Returns `false` once the bus is gone.
pub(crate) async fn changed(
    rx: &mut broadcast::Receiver<StatusChange>,
    device_id: DeviceId,
) -> bool {
    loop {
        match rx.recv().await {
            Ok(change) if change.device_id == device_id => return true,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => return true,
            Err(broadcast::error::RecvError::Closed) => return false,
        }
    }
}
