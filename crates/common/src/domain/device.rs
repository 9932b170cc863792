use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A registered device. The identifier is assigned server-side at creation
/// and doubles as the storage key; clients never supply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub current_temperature: f64,
    pub serial_id: String,
    pub active: bool,
    #[serde(default)]
    pub schedules: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Input for registering a device; the repository assigns the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDraft {
    pub name: String,
    pub current_temperature: f64,
    pub serial_id: String,
    pub active: bool,
    #[serde(default)]
    pub schedules: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Repository trait for the device registry
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Register a new device, assigning it a unique identifier
    async fn create_device(&self, draft: DeviceDraft) -> DomainResult<Device>;

    /// Fetch a device by identifier
    async fn get_device(&self, device_id: &str) -> DomainResult<Device>;

    /// List every registered device; an empty list is not an error
    async fn list_devices(&self) -> DomainResult<Vec<Device>>;

    /// Replace a stored device in full
    async fn update_device(&self, device: Device) -> DomainResult<Device>;

    /// Remove a device from the registry
    async fn delete_device(&self, device_id: &str) -> DomainResult<()>;
}
