pub mod actions;
mod app_config;
mod booking;
mod config;
mod rooms;

use thiserror::Error;

pub use actions::{BookingConfirmation, OutboundMessage, RoomSelection};
pub use app_config::{AppConfig, Environment, PollSchedule};
pub use booking::{BookingRecord, PricingBreakdown};
pub use config::{load_app_config, load_app_config_from_env};
pub use rooms::{Hotel, Room, RoomSearchResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
