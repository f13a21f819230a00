pub mod config;
pub mod gateway;
pub mod session;
pub mod telemetry;

pub use config::AppConfig;
pub use gateway::{RestGateway, SyncGateway, WireNotification, WireUser};
pub use session::{Session, SyncOutcome};
