use thiserror::Error;

/// Errors that can occur while rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unknown motion preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid easing curve: {0}")]
    InvalidEasing(String),
}
