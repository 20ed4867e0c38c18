//! # Resizer
//!
//! Turns phpThumb-style request options (`w`, `h`, `zc`, `far`, `bg`, `q`,
//! ...) into a deterministic render plan and executes it against an image.
//!
//! # Architecture: Plan, Then Render
//!
//! Every request goes through two independent steps:
//!
//! ```text
//! 1. Plan     original size + options  →  RenderPlan   (pure arithmetic)
//! 2. Render   RenderPlan + source file →  output file  (backend)
//! ```
//!
//! The plan carries every decision up front: the source sub-crop, the scaled
//! size, the background canvas, the cover crop and the output quality. A
//! backend only follows it. That keeps the geometry unit-testable without
//! decoding a single pixel, and lets the `plan` subcommand print exactly what
//! a render would do.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Option normalization, resize geometry, render plans, the backend contract |
//! | [`config`] | `resizer.toml` loading, stock defaults, validation |
//! | [`batch`] | TOML job files run in parallel with rayon |
//! | [`output`] | CLI output formatting for single runs and batches |
//!
//! # Design Decisions
//!
//! ## Declines Are Values
//!
//! [`imaging::Resizer::process_image`] never panics and never returns `Err`.
//! It hands back an [`imaging::Outcome`]: either the plan that was written or
//! the reason the request was declined, plus the diagnostic report collected
//! along the way. Callers that serve images can fall back to the original
//! file on a decline without inspecting error types.
//!
//! ## Unknown Options Are Warnings
//!
//! Unrecognized keys and unparsable values do not fail a request. They are
//! dropped, recorded as [`imaging::OptionWarning`]s and surfaced in the
//! report, so a typo in a URL degrades to the untouched option rather than a
//! broken image.
//!
//! ## Pure-Rust Imaging
//!
//! [`imaging::RustBackend`] uses the `image` crate for decoding, Lanczos3
//! resampling and encoding. No system libraries are involved.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
