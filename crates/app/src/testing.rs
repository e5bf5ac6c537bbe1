//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gardenhub_domain::device::Device;
use gardenhub_domain::error::{ConflictError, GardenHubError, NotFoundError};
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::notification::Notification;
use gardenhub_domain::order::{OrderOutcome, OrderStatus};
use gardenhub_domain::shadow::ShadowEvent;
use gardenhub_domain::timer::{TimerRun, TimerRunName};

use crate::ports::{
    DeviceRepository, Notifier, OrderSender, ShadowTransport, WeatherProvider,
    WorkflowOrchestrator,
};

#[derive(Default)]
pub struct InMemoryDeviceRepo {
    store: Mutex<HashMap<DeviceId, Device>>,
}

impl InMemoryDeviceRepo {
    pub fn with(devices: impl IntoIterator<Item = Device>) -> Self {
        let map = devices.into_iter().map(|d| (d.id, d)).collect();
        Self {
            store: Mutex::new(map),
        }
    }

    pub fn status_of(&self, id: DeviceId) -> Option<bool> {
        self.store.lock().unwrap().get(&id).map(|d| d.status)
    }

    pub fn force_status(&self, id: DeviceId, status: bool) {
        if let Some(device) = self.store.lock().unwrap().get_mut(&id) {
            device.status = status;
        }
    }

    pub fn device(&self, id: DeviceId) -> Option<Device> {
        self.store.lock().unwrap().get(&id).cloned()
    }
}

impl DeviceRepository for InMemoryDeviceRepo {
    async fn create(&self, device: Device) -> Result<Device, GardenHubError> {
        let mut store = self.store.lock().unwrap();
        if store
            .values()
            .any(|d| d.position == device.position || d.gpio == device.gpio)
        {
            return Err(ConflictError::Unique.into());
        }
        store.insert(device.id, device.clone());
        Ok(device)
    }

    async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, GardenHubError> {
        Ok(self.store.lock().unwrap().get(&id).cloned())
    }

    async fn get_many(&self, ids: &[DeviceId]) -> Result<Vec<Device>, GardenHubError> {
        let store = self.store.lock().unwrap();
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn get_all(&self) -> Result<Vec<Device>, GardenHubError> {
        let mut all: Vec<Device> = self.store.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|d| d.position);
        Ok(all)
    }

    async fn find_by_position(&self, position: u32) -> Result<Option<Device>, GardenHubError> {
        let store = self.store.lock().unwrap();
        Ok(store.values().find(|d| d.position == position).cloned())
    }

    async fn find_by_gpio(&self, gpio: u32) -> Result<Option<Device>, GardenHubError> {
        let store = self.store.lock().unwrap();
        Ok(store.values().find(|d| d.gpio == gpio).cloned())
    }

    async fn update(&self, mut device: Device) -> Result<Device, GardenHubError> {
        let mut store = self.store.lock().unwrap();
        let current = store.get(&device.id).ok_or_else(|| NotFoundError {
            entity: "Device",
            id: device.id.to_string(),
        })?;
        device.status = current.status;
        store.insert(device.id, device.clone());
        Ok(device)
    }

    async fn set_status(&self, id: DeviceId, status: bool) -> Result<(), GardenHubError> {
        let mut store = self.store.lock().unwrap();
        let device = store.get_mut(&id).ok_or_else(|| NotFoundError {
            entity: "Device",
            id: id.to_string(),
        })?;
        device.status = status;
        Ok(())
    }

    async fn delete(&self, id: DeviceId) -> Result<(), GardenHubError> {
        self.store.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    published: Mutex<Vec<ShadowEvent>>,
    broken: bool,
}

impl RecordingTransport {
    pub fn broken() -> Self {
        Self {
            published: Mutex::default(),
            broken: true,
        }
    }

    pub fn published(&self) -> Vec<ShadowEvent> {
        self.published.lock().unwrap().clone()
    }
}

impl ShadowTransport for RecordingTransport {
    async fn publish(&self, event: ShadowEvent) -> Result<(), GardenHubError> {
        if self.broken {
            return Err(GardenHubError::transport(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "broker unreachable",
            )));
        }
        self.published.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), GardenHubError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Weather provider answering with a fixed humidity, or failing.
pub struct FixedWeather {
    humidity: Option<u8>,
    calls: AtomicUsize,
}

impl FixedWeather {
    pub fn humidity(value: u8) -> Self {
        Self {
            humidity: Some(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            humidity: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WeatherProvider for FixedWeather {
    async fn current_humidity(&self) -> Result<u8, GardenHubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.humidity.ok_or_else(|| {
            GardenHubError::upstream(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "weather service timed out",
            ))
        })
    }
}

/// Orchestrator that only records runs; tests decide which are "running".
#[derive(Default)]
pub struct FakeOrchestrator {
    running: Mutex<Vec<TimerRun>>,
    stopped: Mutex<Vec<TimerRunName>>,
}

impl FakeOrchestrator {
    pub fn started(&self) -> Vec<TimerRun> {
        self.running.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<TimerRunName> {
        self.stopped.lock().unwrap().clone()
    }

    /// Simulate a run reaching its delay: it leaves the running set.
    pub fn finish(&self, name: &TimerRunName) {
        self.running.lock().unwrap().retain(|r| &r.name != name);
    }
}

impl WorkflowOrchestrator for FakeOrchestrator {
    async fn start(&self, run: TimerRun) -> Result<(), GardenHubError> {
        self.running.lock().unwrap().push(run);
        Ok(())
    }

    async fn list_running(
        &self,
        device_id: DeviceId,
    ) -> Result<Vec<TimerRunName>, GardenHubError> {
        Ok(self
            .running
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.device_id == device_id)
            .map(|r| r.name.clone())
            .collect())
    }

    async fn stop(&self, name: &TimerRunName) -> Result<(), GardenHubError> {
        self.finish(name);
        self.stopped.lock().unwrap().push(name.clone());
        Ok(())
    }
}

/// Order sender that records every call and answers `UNCONFIRMED`.
#[derive(Default)]
pub struct RecordingOrders {
    calls: Mutex<Vec<(DeviceId, bool, Option<Duration>)>>,
}

impl RecordingOrders {
    pub fn calls(&self) -> Vec<(DeviceId, bool, Option<Duration>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl OrderSender for RecordingOrders {
    async fn send_order(
        &self,
        device_id: DeviceId,
        status: bool,
        timeout: Option<Duration>,
    ) -> Result<OrderOutcome, GardenHubError> {
        self.calls.lock().unwrap().push((device_id, status, timeout));
        Ok(OrderOutcome {
            info: String::new(),
            err: OrderStatus::Unconfirmed,
        })
    }
}
