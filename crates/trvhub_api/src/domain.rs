mod device_service;
mod discovery_service;
mod policy_service;
mod user_service;

pub use device_service::*;
pub use discovery_service::*;
pub use policy_service::*;
pub use user_service::*;
