//! Notifier port — fan-out of shadow changes to interested subscribers.

use std::future::Future;
use std::sync::Arc;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::notification::Notification;

/// Broadcasts [`Notification`]s.
pub trait Notifier {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for Arc<T> {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).notify(notification)
    }
}
