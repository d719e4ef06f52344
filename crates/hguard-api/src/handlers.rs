//! HTTP request handlers.

pub mod health;
pub mod pages;
pub mod predict;
pub mod processed;

pub use health::{health, ready};
pub use predict::predict;
pub use processed::serve_processed;
