//! Estimate pipeline - fetch, parse, chart and write one AVM estimate

pub mod chart;
pub mod fetch;
pub mod orchestrate;
pub mod parse;
pub mod types;
pub mod utils;
pub mod write;

pub use orchestrate::Orchestrator;
pub use types::*;
