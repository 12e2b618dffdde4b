// Processors module
pub mod asset_processor;

pub use asset_processor::*;
