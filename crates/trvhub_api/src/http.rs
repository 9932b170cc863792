mod auth;
mod device_handler;
mod error;
mod policy_handler;
mod server;
mod user_handler;

pub use auth::*;
pub use error::*;
pub use server::*;
