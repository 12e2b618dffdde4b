// Core domain layer
pub mod models;
pub mod pages;
pub mod mode;
pub mod assets;
pub mod chunks;
pub mod naming;
pub mod assembler;
pub mod pipeline;
pub mod services;
pub mod interfaces;

pub use models::*;
pub use pages::*;
pub use mode::*;
pub use assets::*;
pub use chunks::*;
pub use naming::*;
pub use assembler::*;
pub use pipeline::*;
pub use services::*;
pub use interfaces::*;
