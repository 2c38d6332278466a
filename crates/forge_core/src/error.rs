use thiserror::Error;

/// Errors surfaced by the generation pipeline.
///
/// Degraded outcomes (fallback universe, smoothed-random noise, fewer
/// structures than requested) are not errors; they are reported on the
/// results themselves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeError {
    #[error("density field has not been generated yet")]
    FieldNotGenerated,
    #[error("structure index {index} is out of range ({placed} placed)")]
    StructureOutOfRange { index: usize, placed: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("grid of shape {dims:?} cannot hold {len} values")]
    GridShapeMismatch { dims: [usize; 3], len: usize },
    #[error("density value {value} is outside [0, 1]")]
    DensityOutOfRange { value: f32 },
}

pub type Result<T> = std::result::Result<T, ForgeError>;
