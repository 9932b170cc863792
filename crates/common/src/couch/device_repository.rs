use crate::couch::client::CouchClient;
use crate::couch::store::{Database, Document};
use crate::domain::{Device, DeviceDraft, DeviceRepository, DomainError, DomainResult};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

const DEVICES_DB: &str = "devices";

impl Document for Device {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Document store implementation of DeviceRepository
pub struct CouchDeviceRepository {
    client: CouchClient,
    db: OnceCell<Result<Database, String>>,
}

impl CouchDeviceRepository {
    pub fn new(client: CouchClient) -> Self {
        Self {
            client,
            db: OnceCell::new(),
        }
    }

    /// Database initialization runs once on first use. A failed
    /// initialization is sticky: every later call fails with the same
    /// error instead of retrying.
    async fn db(&self) -> DomainResult<&Database> {
        let result = self
            .db
            .get_or_init(|| async {
                self.client
                    .database(DEVICES_DB)
                    .await
                    .map_err(|err| err.to_string())
            })
            .await;

        match result {
            Ok(db) => Ok(db),
            Err(message) => Err(DomainError::Initialization(message.clone())),
        }
    }
}

#[async_trait]
impl DeviceRepository for CouchDeviceRepository {
    #[instrument(skip(self, draft), fields(device_name = %draft.name))]
    async fn create_device(&self, draft: DeviceDraft) -> DomainResult<Device> {
        let db = self.db().await?;

        let device = Device {
            id: xid::new().to_string(),
            name: draft.name,
            current_temperature: draft.current_temperature,
            serial_id: draft.serial_id,
            active: draft.active,
            schedules: draft.schedules,
            metadata: draft.metadata,
        };

        let device = db.create(device).await?;
        debug!(device_id = %device.id, "registered device");
        Ok(device)
    }

    #[instrument(skip(self))]
    async fn get_device(&self, device_id: &str) -> DomainResult<Device> {
        let db = self.db().await?;
        db.get(device_id).await
    }

    #[instrument(skip(self))]
    async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let db = self.db().await?;
        let devices: Vec<Device> = db.get_all().await?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    #[instrument(skip(self, device), fields(device_id = %device.id))]
    async fn update_device(&self, device: Device) -> DomainResult<Device> {
        let db = self.db().await?;
        db.update(device).await
    }

    #[instrument(skip(self))]
    async fn delete_device(&self, device_id: &str) -> DomainResult<()> {
        let db = self.db().await?;
        db.delete(device_id).await?;
        debug!(device_id = %device_id, "deleted device");
        Ok(())
    }
}
