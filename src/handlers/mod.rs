pub mod contributions;
pub mod stats;
