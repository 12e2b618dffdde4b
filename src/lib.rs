// Multi-page build planner
// Pages, mode and asset pipeline are composed into one immutable build plan

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;
