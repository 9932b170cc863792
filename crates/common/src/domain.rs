mod device;
mod gateway;
mod policy;
mod result;
mod user;

pub use device::*;
pub use gateway::*;
pub use policy::*;
pub use result::*;
pub use user::*;
