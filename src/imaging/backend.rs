//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the planner and pixels.
//! A backend does two things:
//!
//! | Operation | Contract |
//! |---|---|
//! | `identify` | native width and height of the input, without decoding pixels if possible |
//! | `render` | execute a [`RenderPlan`] step by step and write the output file |
//!
//! `render` runs the plan in a fixed order: source sub-crop, scale, strip
//! metadata, sharpen, background composite, cover-crop, save. It never
//! recomputes geometry.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::Dimensions;
use super::plan::RenderPlan;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Everything `render` needs: where to read, where to write, what to do.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: RenderPlan,
}

/// Trait for image processing backends.
///
/// Implementations must be `Sync` so one backend can serve a rayon pool.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Execute a render plan and write the output file.
    fn render(&self, params: &RenderParams) -> Result<(), BackendError>;
}
