pub mod cache;
pub mod chart;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod transform;

pub use config::Settings;
pub use error::{Error, Result};
