//! Storage port — the device registry.

use std::future::Future;
use std::sync::Arc;

use gardenhub_domain::device::Device;
use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::id::DeviceId;

/// Repository for persisting and querying [`Device`]s.
///
/// Implementations must enforce uniqueness of `position` and `gpio` on
/// write (reporting [`GardenHubError::Conflict`]); the application layer
/// checks first, but only the store can do it atomically.
pub trait DeviceRepository {
    /// Insert a new device.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, GardenHubError>> + Send;

    /// Get a device by its identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send;

    /// Get every device whose id is in `ids`. Unknown ids are skipped and
    /// the result order is unspecified.
    fn get_many(
        &self,
        ids: &[DeviceId],
    ) -> impl Future<Output = Result<Vec<Device>, GardenHubError>> + Send;

    /// Get all devices.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, GardenHubError>> + Send;

    /// Find the device occupying a panel position.
    fn find_by_position(
        &self,
        position: u32,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send;

    /// Find the device wired to a GPIO pin.
    fn find_by_gpio(
        &self,
        gpio: u32,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send;

    /// Overwrite every field except `status`.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, GardenHubError>> + Send;

    /// Overwrite `status` only. Missing devices are a
    /// [`GardenHubError::NotFound`].
    fn set_status(
        &self,
        id: DeviceId,
        status: bool,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send;

    /// Delete a device by its identifier.
    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), GardenHubError>> + Send;
}

impl<T: DeviceRepository + Send + Sync> DeviceRepository for Arc<T> {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, GardenHubError>> + Send {
        (**self).create(device)
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_many(
        &self,
        ids: &[DeviceId],
    ) -> impl Future<Output = Result<Vec<Device>, GardenHubError>> + Send {
        (**self).get_many(ids)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, GardenHubError>> + Send {
        (**self).get_all()
    }

    fn find_by_position(
        &self,
        position: u32,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send {
        (**self).find_by_position(position)
    }

    fn find_by_gpio(
        &self,
        gpio: u32,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send {
        (**self).find_by_gpio(gpio)
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, GardenHubError>> + Send {
        (**self).update(device)
    }

    fn set_status(
        &self,
        id: DeviceId,
        status: bool,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).set_status(id, status)
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).delete(id)
    }
}
