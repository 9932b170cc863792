use crate::domain::DeviceService;
use common::{Device, DiscoveredDevice, DomainResult, GatewayClient};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

const MAX_DEMO_DEVICES: usize = 10;
const SERIAL_PREFIX: &str = "OTRV-";
const SERIAL_SUFFIX_LEN: usize = 10;
const SERIAL_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const DEMO_TEMPERATURE_MIN: f64 = 10.0;
const DEMO_TEMPERATURE_MAX: f64 = 35.0;

/// Discovery workflow over the hardware gateway.
///
/// The bootstrap state lives on the service instance, not in module
/// globals, so concurrent instances and tests stay independent. Two
/// racing discovery calls may still both synthesize demo devices; the
/// synthesize-then-persist step is not serialized.
pub struct DiscoveryService {
    gateway: Arc<dyn GatewayClient>,
    devices: Arc<DeviceService>,
    first_bootstrap_done: AtomicBool,
    rng: Mutex<SmallRng>,
}

impl DiscoveryService {
    pub fn new(gateway: Arc<dyn GatewayClient>, devices: Arc<DeviceService>) -> Self {
        Self::with_rng(gateway, devices, SmallRng::from_os_rng())
    }

    /// Deterministic construction for tests
    pub fn with_rng_seed(
        gateway: Arc<dyn GatewayClient>,
        devices: Arc<DeviceService>,
        seed: u64,
    ) -> Self {
        Self::with_rng(gateway, devices, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(gateway: Arc<dyn GatewayClient>, devices: Arc<DeviceService>, rng: SmallRng) -> Self {
        Self {
            gateway,
            devices,
            first_bootstrap_done: AtomicBool::new(false),
            rng: Mutex::new(rng),
        }
    }

    /// Discover the current device set.
    ///
    /// The gateway is authoritative once it reports devices. An empty
    /// report is special-cased twice: the first one since process start
    /// returns empty without synthesizing, so a cold-start poll never
    /// surprises the user with phantom hardware; later ones synthesize
    /// demo devices only for a user-triggered call, never for a
    /// background poll.
    #[instrument(skip(self))]
    pub async fn discover_all_devices(&self, user_triggered: bool) -> DomainResult<Vec<Device>> {
        let discovered = self.gateway.list_devices().await?;

        if discovered.is_empty() {
            if !self.first_bootstrap_done.swap(true, Ordering::SeqCst) {
                debug!("first empty discovery since start, skipping demo synthesis");
                return Ok(Vec::new());
            }
            if !user_triggered {
                return Ok(Vec::new());
            }

            let demo = self.synthesize_demo_devices();
            debug!(count = demo.len(), "gateway empty, synthesized demo devices");
            if demo.is_empty() {
                return Ok(Vec::new());
            }
            return self.persist_and_refetch(demo).await;
        }

        let (ready, pending): (Vec<_>, Vec<_>) = discovered
            .into_iter()
            .partition(|device| device.id.is_some());

        if pending.is_empty() {
            // Every reported device already carries a persisted
            // identifier; pass the set through untouched.
            return Ok(ready
                .into_iter()
                .filter_map(DiscoveredDevice::into_device)
                .collect());
        }

        self.persist_and_refetch(pending).await
    }

    /// Persist phase. Runs at most once per discovery call, then the
    /// registry is re-read for the server-assigned-id versions. This
    /// replaces a recursive re-poll; the once-only bound is structural
    /// rather than an invariant a future change could break.
    async fn persist_and_refetch(
        &self,
        pending: Vec<DiscoveredDevice>,
    ) -> DomainResult<Vec<Device>> {
        self.devices.create_devices(Some(pending)).await?;
        self.devices.list_devices().await
    }

    fn synthesize_demo_devices(&self) -> Vec<DiscoveredDevice> {
        let mut rng = self.rng.lock().expect("rng lock poisoned");
        let count = rng.random_range(0..=MAX_DEMO_DEVICES);

        (0..count)
            .map(|index| {
                let suffix: String = (0..SERIAL_SUFFIX_LEN)
                    .map(|_| SERIAL_CHARSET[rng.random_range(0..SERIAL_CHARSET.len())] as char)
                    .collect();

                DiscoveredDevice {
                    id: None,
                    name: format!("Device {}", index + 1),
                    current_temperature: round_to_one_dp(
                        rng.random_range(DEMO_TEMPERATURE_MIN..DEMO_TEMPERATURE_MAX),
                    ),
                    serial_id: format!("{}{}", SERIAL_PREFIX, suffix),
                    active: true,
                    schedules: Vec::new(),
                    metadata: serde_json::Map::new(),
                }
            })
            .collect()
    }
}

/// Round to one decimal place
pub fn round_to_one_dp(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{DeviceDraft, DomainError, MockDeviceRepository, MockGatewayClient};
    use std::sync::atomic::AtomicUsize;

    fn reported(id: Option<&str>, name: &str) -> DiscoveredDevice {
        DiscoveredDevice {
            id: id.map(str::to_string),
            name: name.to_string(),
            current_temperature: 21.0,
            serial_id: format!("OTRV-{}", name),
            active: true,
            schedules: vec![],
            metadata: serde_json::Map::new(),
        }
    }

    fn device_from_draft(id: String, draft: DeviceDraft) -> Device {
        Device {
            id,
            name: draft.name,
            current_temperature: draft.current_temperature,
            serial_id: draft.serial_id,
            active: draft.active,
            schedules: draft.schedules,
            metadata: draft.metadata,
        }
    }

    /// A device service whose repository records every created device in a
    /// shared registry and serves it back from list_devices.
    fn registry_backed_service(
        gateway: Arc<MockGatewayClient>,
        registry: Arc<Mutex<Vec<Device>>>,
    ) -> Arc<DeviceService> {
        let mut repository = MockDeviceRepository::new();
        let sequence = Arc::new(AtomicUsize::new(0));

        let create_registry = registry.clone();
        repository.expect_create_device().returning(move |draft| {
            let n = sequence.fetch_add(1, Ordering::SeqCst);
            let device = device_from_draft(format!("dev-{}", n), draft);
            create_registry
                .lock()
                .unwrap()
                .push(device.clone());
            Ok(device)
        });

        let list_registry = registry.clone();
        repository
            .expect_list_devices()
            .returning(move || Ok(list_registry.lock().unwrap().clone()));

        Arc::new(DeviceService::new(Arc::new(repository), gateway))
    }

    #[tokio::test]
    async fn first_empty_discovery_returns_empty_and_marks_bootstrap() {
        let mut gateway = MockGatewayClient::new();
        gateway
            .expect_list_devices()
            .times(2)
            .returning(|| Ok(vec![]));
        let gateway = Arc::new(gateway);

        // Repository mocks carry no expectations; any call would panic
        let devices = Arc::new(DeviceService::new(
            Arc::new(MockDeviceRepository::new()),
            gateway.clone(),
        ));
        let discovery = DiscoveryService::with_rng_seed(gateway, devices, 1);

        let first = discovery.discover_all_devices(false).await.unwrap();
        assert!(first.is_empty());

        // Second background poll with an empty gateway: still no synthesis
        let second = discovery.discover_all_devices(false).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn background_poll_never_synthesizes_even_after_bootstrap() {
        let mut gateway = MockGatewayClient::new();
        gateway
            .expect_list_devices()
            .times(3)
            .returning(|| Ok(vec![]));
        let gateway = Arc::new(gateway);

        let devices = Arc::new(DeviceService::new(
            Arc::new(MockDeviceRepository::new()),
            gateway.clone(),
        ));
        let discovery = DiscoveryService::with_rng_seed(gateway, devices, 1);

        for _ in 0..3 {
            let result = discovery.discover_all_devices(false).await.unwrap();
            assert!(result.is_empty());
        }
    }

    #[tokio::test]
    async fn user_triggered_discovery_synthesizes_and_persists_demo_devices() {
        // The synthesized count is uniform in 0..=10, so try a handful of
        // seeds and require at least one non-empty outcome.
        let mut saw_devices = false;

        for seed in 0..8 {
            let mut gateway = MockGatewayClient::new();
            gateway.expect_list_devices().returning(|| Ok(vec![]));
            gateway.expect_create_device().returning(|_| Ok(()));
            let gateway = Arc::new(gateway);

            let registry = Arc::new(Mutex::new(Vec::new()));
            let devices = registry_backed_service(gateway.clone(), registry.clone());
            let discovery = DiscoveryService::with_rng_seed(gateway, devices, seed);

            // Consume the bootstrap special case first
            assert!(discovery.discover_all_devices(false).await.unwrap().is_empty());

            let result = discovery.discover_all_devices(true).await.unwrap();
            let persisted = registry.lock().unwrap().clone();

            assert!(persisted.len() <= MAX_DEMO_DEVICES);
            assert_eq!(result, persisted);

            if result.is_empty() {
                continue;
            }
            saw_devices = true;

            for (index, device) in result.iter().enumerate() {
                assert!(!device.id.is_empty());
                assert_eq!(device.name, format!("Device {}", index + 1));
                assert!(device.serial_id.starts_with(SERIAL_PREFIX));
                assert_eq!(
                    device.serial_id.len(),
                    SERIAL_PREFIX.len() + SERIAL_SUFFIX_LEN
                );
                assert!(device.active);
                assert!(device.current_temperature >= DEMO_TEMPERATURE_MIN);
                assert!(device.current_temperature < DEMO_TEMPERATURE_MAX);
                // One decimal place
                let scaled = device.current_temperature * 10.0;
                assert!((scaled - scaled.round()).abs() < 1e-9);
            }
        }

        assert!(saw_devices, "no seed synthesized any demo devices");
    }

    #[tokio::test]
    async fn gateway_devices_with_ids_pass_through_unmodified() {
        let mut gateway = MockGatewayClient::new();
        gateway.expect_list_devices().times(1).returning(|| {
            Ok(vec![
                reported(Some("dev1"), "Living Room"),
                reported(Some("dev2"), "Kitchen"),
            ])
        });
        gateway.expect_create_device().times(0);
        let gateway = Arc::new(gateway);

        let mut repository = MockDeviceRepository::new();
        repository.expect_create_device().times(0);
        repository.expect_list_devices().times(0);
        let devices = Arc::new(DeviceService::new(Arc::new(repository), gateway.clone()));

        let discovery = DiscoveryService::with_rng_seed(gateway, devices, 1);
        let result = discovery.discover_all_devices(true).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "dev1");
        assert_eq!(result[1].id, "dev2");
        assert_eq!(result[0].name, "Living Room");
    }

    #[tokio::test]
    async fn unpersisted_gateway_devices_are_persisted_then_refetched() {
        let mut gateway = MockGatewayClient::new();
        gateway.expect_list_devices().times(1).returning(|| {
            Ok(vec![
                reported(None, "New Valve"),
                reported(None, "Other Valve"),
            ])
        });
        gateway.expect_create_device().times(2).returning(|_| Ok(()));
        let gateway = Arc::new(gateway);

        let registry = Arc::new(Mutex::new(Vec::new()));
        let devices = registry_backed_service(gateway.clone(), registry.clone());
        let discovery = DiscoveryService::with_rng_seed(gateway, devices, 1);

        let result = discovery.discover_all_devices(false).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|device| !device.id.is_empty()));
        assert_eq!(result, registry.lock().unwrap().clone());
    }

    #[tokio::test]
    async fn gateway_failure_propagates_unchanged() {
        let mut gateway = MockGatewayClient::new();
        gateway
            .expect_list_devices()
            .returning(|| Err(DomainError::Upstream("gateway down".to_string())));
        let gateway = Arc::new(gateway);

        let devices = Arc::new(DeviceService::new(
            Arc::new(MockDeviceRepository::new()),
            gateway.clone(),
        ));
        let discovery = DiscoveryService::with_rng_seed(gateway, devices, 1);

        let result = discovery.discover_all_devices(true).await;
        assert!(matches!(result, Err(DomainError::Upstream(_))));
    }

    #[test]
    fn rounds_to_one_decimal_place() {
        assert_eq!(round_to_one_dp(12.3456789), 12.3);
        assert_eq!(round_to_one_dp(12.36), 12.4);
        assert_eq!(round_to_one_dp(10.0), 10.0);
    }
}
