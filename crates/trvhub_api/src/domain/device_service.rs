use common::{Device, DeviceRepository, DiscoveredDevice, DomainError, DomainResult, GatewayClient};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Domain service for the device registry.
///
/// The document store is the system of record; every mutation is mirrored
/// to the hardware gateway so the two stay in sync.
pub struct DeviceService {
    device_repository: Arc<dyn DeviceRepository>,
    gateway: Arc<dyn GatewayClient>,
}

impl DeviceService {
    pub fn new(device_repository: Arc<dyn DeviceRepository>, gateway: Arc<dyn GatewayClient>) -> Self {
        Self {
            device_repository,
            gateway,
        }
    }

    /// Register a batch of devices.
    ///
    /// `None` marks a request that carried no payload at all. An empty
    /// batch is a valid no-op and resolves without touching the store or
    /// the gateway. Otherwise one create per device runs concurrently, and
    /// the whole call fails if any single create fails.
    #[instrument(skip(self, devices))]
    pub async fn create_devices(
        &self,
        devices: Option<Vec<DiscoveredDevice>>,
    ) -> DomainResult<Vec<Device>> {
        let Some(devices) = devices else {
            return Err(DomainError::BadRequest("no devices supplied".to_string()));
        };

        if devices.is_empty() {
            return Ok(Vec::new());
        }

        let created =
            try_join_all(devices.into_iter().map(|device| self.create_one(device))).await?;
        debug!(count = created.len(), "created devices");
        Ok(created)
    }

    async fn create_one(&self, discovered: DiscoveredDevice) -> DomainResult<Device> {
        let device = self
            .device_repository
            .create_device(discovered.into())
            .await?;
        self.gateway.create_device(&device).await?;
        Ok(device)
    }

    #[instrument(skip(self))]
    pub async fn get_device(&self, device_id: &str) -> DomainResult<Device> {
        self.device_repository.get_device(device_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        self.device_repository.list_devices().await
    }

    #[instrument(skip(self, device), fields(device_id = %device.id))]
    pub async fn update_device(&self, device: Device) -> DomainResult<Device> {
        let updated = self.device_repository.update_device(device).await?;
        self.gateway.update_device(&updated).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_device(&self, device_id: &str) -> DomainResult<()> {
        self.device_repository.delete_device(device_id).await?;
        self.gateway.delete_device(device_id).await?;
        debug!(device_id = %device_id, "deleted device");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{MockDeviceRepository, MockGatewayClient};
    use serde_json::Map;

    fn discovered(name: &str) -> DiscoveredDevice {
        DiscoveredDevice {
            id: None,
            name: name.to_string(),
            current_temperature: 20.0,
            serial_id: format!("OTRV-{}", name),
            active: true,
            schedules: vec![],
            metadata: Map::new(),
        }
    }

    fn persisted(id: &str, name: &str) -> Device {
        Device {
            id: id.to_string(),
            name: name.to_string(),
            current_temperature: 20.0,
            serial_id: format!("OTRV-{}", name),
            active: true,
            schedules: vec![],
            metadata: Map::new(),
        }
    }

    #[tokio::test]
    async fn create_devices_without_payload_is_bad_request() {
        let service = DeviceService::new(
            Arc::new(MockDeviceRepository::new()),
            Arc::new(MockGatewayClient::new()),
        );

        let result = service.create_devices(None).await;
        assert!(matches!(result, Err(DomainError::BadRequest(_))));
    }

    #[tokio::test]
    async fn create_devices_with_empty_batch_issues_no_calls() {
        let mut repository = MockDeviceRepository::new();
        repository.expect_create_device().times(0);
        let mut gateway = MockGatewayClient::new();
        gateway.expect_create_device().times(0);

        let service = DeviceService::new(Arc::new(repository), Arc::new(gateway));

        let created = service.create_devices(Some(vec![])).await.unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn create_devices_fans_out_one_call_per_device() {
        let mut repository = MockDeviceRepository::new();
        repository
            .expect_create_device()
            .times(4)
            .returning(|draft| {
                Ok(Device {
                    id: format!("id-{}", draft.name),
                    name: draft.name,
                    current_temperature: draft.current_temperature,
                    serial_id: draft.serial_id,
                    active: draft.active,
                    schedules: draft.schedules,
                    metadata: draft.metadata,
                })
            });

        let mut gateway = MockGatewayClient::new();
        gateway.expect_create_device().times(4).returning(|_| Ok(()));

        let service = DeviceService::new(Arc::new(repository), Arc::new(gateway));

        let batch = vec![
            discovered("a"),
            discovered("b"),
            discovered("c"),
            discovered("d"),
        ];
        let created = service.create_devices(Some(batch)).await.unwrap();

        assert_eq!(created.len(), 4);
        assert!(created.iter().all(|device| !device.id.is_empty()));
    }

    #[tokio::test]
    async fn one_failed_create_fails_the_whole_batch() {
        let mut repository = MockDeviceRepository::new();
        repository.expect_create_device().returning(|draft| {
            if draft.name == "bad" {
                Err(DomainError::Conflict("duplicate serial".to_string()))
            } else {
                Ok(Device {
                    id: format!("id-{}", draft.name),
                    name: draft.name,
                    current_temperature: draft.current_temperature,
                    serial_id: draft.serial_id,
                    active: draft.active,
                    schedules: draft.schedules,
                    metadata: draft.metadata,
                })
            }
        });

        let mut gateway = MockGatewayClient::new();
        gateway.expect_create_device().returning(|_| Ok(()));

        let service = DeviceService::new(Arc::new(repository), Arc::new(gateway));

        let batch = vec![discovered("a"), discovered("bad"), discovered("c")];
        let result = service.create_devices(Some(batch)).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_mirrors_the_stored_device_to_the_gateway() {
        let mut repository = MockDeviceRepository::new();
        repository
            .expect_update_device()
            .times(1)
            .returning(|device| Ok(device));

        let mut gateway = MockGatewayClient::new();
        gateway
            .expect_update_device()
            .withf(|device| device.id == "dev1")
            .times(1)
            .returning(|_| Ok(()));

        let service = DeviceService::new(Arc::new(repository), Arc::new(gateway));

        let updated = service.update_device(persisted("dev1", "a")).await.unwrap();
        assert_eq!(updated.id, "dev1");
    }

    #[tokio::test]
    async fn delete_mirrors_to_the_gateway() {
        let mut repository = MockDeviceRepository::new();
        repository
            .expect_delete_device()
            .times(1)
            .returning(|_| Ok(()));

        let mut gateway = MockGatewayClient::new();
        gateway
            .expect_delete_device()
            .withf(|device_id| device_id == "dev1")
            .times(1)
            .returning(|_| Ok(()));

        let service = DeviceService::new(Arc::new(repository), Arc::new(gateway));
        service.delete_device("dev1").await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_missing_device_propagates_not_found() {
        let mut repository = MockDeviceRepository::new();
        repository
            .expect_delete_device()
            .returning(|_| Err(DomainError::NotFound("no such device".to_string())));

        let mut gateway = MockGatewayClient::new();
        gateway.expect_delete_device().times(0);

        let service = DeviceService::new(Arc::new(repository), Arc::new(gateway));
        let result = service.delete_device("missing").await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }
}
