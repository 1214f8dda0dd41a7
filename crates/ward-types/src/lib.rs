pub mod config;
pub mod domain;
pub mod error;

pub use config::{EngineConfig, GuardMode};
pub use domain::*;
pub use error::{Error, Result};
