//! Resize planning and execution.
//!
//! | Step | Module | Pure? |
//! |---|---|---|
//! | **Normalize options** | [`options`] | yes |
//! | **Anchor placement** | [`position`] | yes |
//! | **Dimension / scale / window math** | [`calculations`] | yes |
//! | **Render plan** | [`plan`] | yes |
//! | **Diagnostics** | [`report`] | yes |
//! | **Execute plan** | [`backend`], [`rust_backend`] | no |
//! | **Boundary call** | [`operations`] | no |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Value types describing geometry, colour, quality and format
//! - **Plan**: Everything decided up front, before a pixel is touched
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`Resizer`], combining planning with backend execution

pub mod backend;
pub mod calculations;
pub mod operations;
pub mod options;
mod params;
pub mod plan;
pub mod position;
pub mod report;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, RenderParams};
pub use operations::{Outcome, ResizeError, Resizer, ResizerSettings, Status};
pub use options::{OptionValue, OptionWarning, RawOptions, TransformOptions, normalize};
pub use params::{Color, CropRegion, Dimensions, OutputFormat, Point, Quality};
pub use plan::{BackgroundPlan, Planner, RenderPlan};
pub use position::Anchor;
pub use report::Report;
pub use rust_backend::RustBackend;
