// Library module for testable functions

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::Config;
pub use error::EstimateError;
pub use pipeline::{EstimateKind, Orchestrator, PropertyQuery, PropertyType};
