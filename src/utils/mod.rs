//! Utility modules

pub mod fallback;
pub mod memory_storage;
pub mod validation;

pub use fallback::*;
pub use memory_storage::*;
pub use validation::*;
