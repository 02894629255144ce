pub mod bulk_loader;
pub mod descriptor;
pub mod engine;
pub mod load_strategy;
pub mod replace_strategy;
pub mod staged_strategy;

pub use bulk_loader::{bulk_load, LoadReport};
pub use descriptor::ConnectionDescriptor;
pub use engine::Engine;
pub use load_strategy::LoadStrategy;
