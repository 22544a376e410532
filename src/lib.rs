pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod redact;
pub mod types;

pub use auth::{Clock, SystemClock, Token, TokenResponse};
pub use client::{MinibrewClient, DEFAULT_BASE_URL};
pub use config::Config;
pub use error::Error;
pub use models::DeviceSummary;
pub use types::{Beer, BreweryOverview, Device, DeviceDetails, Session};
