//! `SQLite` implementation of [`DeviceRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use gardenhub_app::ports::DeviceRepository;
use gardenhub_domain::device::Device;
use gardenhub_domain::error::{GardenHubError, NotFoundError};
use gardenhub_domain::id::DeviceId;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

fn decode_err(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let description: Option<String> = row.try_get("description")?;
        let position: i64 = row.try_get("position")?;
        let gpio: i64 = row.try_get("gpio")?;
        let status: bool = row.try_get("status")?;
        let weather_fence: i64 = row.try_get("weather_fence")?;
        let timer_fence: i64 = row.try_get("timer_fence")?;
        let device_fence: String = row.try_get("device_fence")?;

        Ok(Self(Device {
            id: DeviceId::from_str(&id).map_err(decode_err)?,
            name,
            description,
            position: u32::try_from(position).map_err(decode_err)?,
            gpio: u32::try_from(gpio).map_err(decode_err)?,
            status,
            weather_fence: u8::try_from(weather_fence).map_err(decode_err)?,
            timer_fence: u32::try_from(timer_fence).map_err(decode_err)?,
            device_fence: serde_json::from_str(&device_fence).map_err(decode_err)?,
        }))
    }
}

const INSERT: &str = "INSERT INTO devices (id, name, description, position, gpio, status, weather_fence, timer_fence, device_fence) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM devices ORDER BY position";
const SELECT_BY_POSITION: &str = "SELECT * FROM devices WHERE position = ?";
const SELECT_BY_GPIO: &str = "SELECT * FROM devices WHERE gpio = ?";
const UPDATE: &str = "UPDATE devices SET name = ?, description = ?, position = ?, gpio = ?, weather_fence = ?, timer_fence = ?, device_fence = ? WHERE id = ?";
const UPDATE_STATUS: &str = "UPDATE devices SET status = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE id = ?";

fn not_found(id: DeviceId) -> GardenHubError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}

/// `SQLite`-backed device registry.
#[derive(Clone)]
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(
        pool: &SqlitePool,
        query: &'static str,
        value: i64,
    ) -> Result<Option<Device>, GardenHubError> {
        let row: Option<Wrapper> = sqlx::query_as(query)
            .bind(value)
            .fetch_optional(pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let fence = serde_json::to_string(&device.device_fence).map_err(StorageError::from)?;
            sqlx::query(INSERT)
                .bind(device.id.to_string())
                .bind(&device.name)
                .bind(&device.description)
                .bind(i64::from(device.position))
                .bind(i64::from(device.gpio))
                .bind(device.status)
                .bind(i64::from(device.weather_fence))
                .bind(i64::from(device.timer_fence))
                .bind(fence)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(device)
        }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_many(
        &self,
        ids: &[DeviceId],
    ) -> impl Future<Output = Result<Vec<Device>, GardenHubError>> + Send {
        let pool = self.pool.clone();
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM devices WHERE id IN (");
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");

            let rows: Vec<Wrapper> = query
                .build_query_as()
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_position(
        &self,
        position: u32,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move { Self::find_one(&pool, SELECT_BY_POSITION, i64::from(position)).await }
    }

    fn find_by_gpio(
        &self,
        gpio: u32,
    ) -> impl Future<Output = Result<Option<Device>, GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move { Self::find_one(&pool, SELECT_BY_GPIO, i64::from(gpio)).await }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let fence = serde_json::to_string(&device.device_fence).map_err(StorageError::from)?;
            let result = sqlx::query(UPDATE)
                .bind(&device.name)
                .bind(&device.description)
                .bind(i64::from(device.position))
                .bind(i64::from(device.gpio))
                .bind(i64::from(device.weather_fence))
                .bind(i64::from(device.timer_fence))
                .bind(fence)
                .bind(device.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(not_found(device.id));
            }

            // `status` is owned by shadow reconciliation; hand back what is stored.
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(device.id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;
            Wrapper::maybe(row).ok_or_else(|| not_found(device.id))
        }
    }

    fn set_status(
        &self,
        id: DeviceId,
        status: bool,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE_STATUS)
                .bind(status)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(not_found(id));
            }
            Ok(())
        }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
