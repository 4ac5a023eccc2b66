pub mod config;
pub mod error;

pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
