//! Schema module - Configuration and data types for evolutionary ASCII art.

mod alphabet;
mod config;
mod image;
mod report;

pub use alphabet::*;
pub use config::*;
pub use image::*;
pub use report::*;
