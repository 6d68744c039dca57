//! Closing assembly and review workflow

pub mod builder;
pub mod cash;
pub mod manager;

pub use builder::*;
pub use cash::*;
pub use manager::*;
