// Re-export all model types from submodules
pub mod common;
mod github;
mod stats;

// Items from common are imported directly where needed
pub use github::*;
pub use stats::*;
