//! Device service — use-cases for managing the device registry.

use gardenhub_domain::device::{Device, DeviceUpdate};
use gardenhub_domain::error::{ConflictError, GardenHubError, NotFoundError};
use gardenhub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for device CRUD operations.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::Validation`] if invariants fail,
    /// [`GardenHubError::Conflict`] if the position or GPIO is taken, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn create_device(&self, device: Device) -> Result<Device, GardenHubError> {
        device.validate()?;
        self.ensure_slots_free(&device).await?;
        let created = self.repo.create(device).await?;
        tracing::info!(device_id = %created.id, "device registered");
        Ok(created)
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, GardenHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices, ordered by panel position.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, GardenHubError> {
        self.repo.get_all().await
    }

    /// Apply a partial update to an existing device.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] for an unknown device,
    /// [`GardenHubError::Validation`] if the result breaks an invariant,
    /// [`GardenHubError::Conflict`] if the new position or GPIO is taken, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_device(
        &self,
        id: DeviceId,
        update: DeviceUpdate,
    ) -> Result<Device, GardenHubError> {
        let mut device = self.get_device(id).await?;
        device.apply(update);
        device.validate()?;
        self.ensure_slots_free(&device).await?;
        self.repo.update(device).await
    }

    /// Delete a device and drop it from every other device's fence.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] for an unknown device, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), GardenHubError> {
        self.get_device(id).await?;
        self.repo.delete(id).await?;

        for mut other in self.repo.get_all().await? {
            if other.unfence(id) {
                tracing::debug!(device_id = %other.id, "removed deleted device from fence");
                self.repo.update(other).await?;
            }
        }
        Ok(())
    }

    async fn ensure_slots_free(&self, device: &Device) -> Result<(), GardenHubError> {
        let position_owner = self.repo.find_by_position(device.position).await?;
        if let Some(owner) = position_owner.filter(|owner| owner.id != device.id) {
            return Err(ConflictError::Position {
                position: device.position,
                owner: owner.id.to_string(),
            }
            .into());
        }
        let gpio_owner = self.repo.find_by_gpio(device.gpio).await?;
        if let Some(owner) = gpio_owner.filter(|owner| owner.id != device.id) {
            return Err(ConflictError::Gpio {
                gpio: device.gpio,
                owner: owner.id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
