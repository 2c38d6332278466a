pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod types;

pub use config::{GeneratorConfig, NoiseKind, NoiseParams};
pub use constants::*;
pub use error::{ForgeError, Result};
pub use grid::*;
pub use types::*;
