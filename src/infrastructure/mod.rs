// Infrastructure layer
pub mod file_system;
pub mod plan_engine;
pub mod processors;

pub use file_system::*;
pub use plan_engine::*;
pub use processors::*;
