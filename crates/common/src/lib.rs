mod auth;
mod couch;
mod domain;
mod gateway;

pub mod garde;

pub use auth::*;
pub use couch::*;
pub use domain::*;
pub use gateway::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use auth::MockAuthTokenProvider;
#[cfg(any(test, feature = "testing"))]
pub use auth::MockPasswordService;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockDeviceRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockGatewayClient;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockPolicyRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockUserRepository;
