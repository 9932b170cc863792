use crate::domain::device::{Device, DeviceDraft};
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A device record as reported by the hardware gateway. A missing `id`
/// marks a device the registry has not persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredDevice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub current_temperature: f64,
    pub serial_id: String,
    pub active: bool,
    #[serde(default)]
    pub schedules: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl DiscoveredDevice {
    /// Convert to a persisted device, if the gateway reported an identifier.
    pub fn into_device(self) -> Option<Device> {
        let id = self.id?;
        Some(Device {
            id,
            name: self.name,
            current_temperature: self.current_temperature,
            serial_id: self.serial_id,
            active: self.active,
            schedules: self.schedules,
            metadata: self.metadata,
        })
    }
}

impl From<DiscoveredDevice> for DeviceDraft {
    fn from(discovered: DiscoveredDevice) -> Self {
        DeviceDraft {
            name: discovered.name,
            current_temperature: discovered.current_temperature,
            serial_id: discovered.serial_id,
            active: discovered.active,
            schedules: discovered.schedules,
            metadata: discovered.metadata,
        }
    }
}

/// Client trait for the external gateway that fronts the physical devices
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Enumerate the devices the gateway currently knows about
    async fn list_devices(&self) -> DomainResult<Vec<DiscoveredDevice>>;

    /// Announce a newly registered device to the gateway
    async fn create_device(&self, device: &Device) -> DomainResult<()>;

    /// Push an updated device record to the gateway
    async fn update_device(&self, device: &Device) -> DomainResult<()>;

    /// Remove a device from the gateway
    async fn delete_device(&self, device_id: &str) -> DomainResult<()>;
}
