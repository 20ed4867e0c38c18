//! The processing boundary.
//!
//! [`Resizer::process_image`] ties the pieces together: locate the input,
//! check the output format, normalize options, identify the input, plan,
//! render. It never fails outright. Every problem becomes a declined
//! [`Outcome`] with the reason in its [`Report`].

use super::backend::{BackendError, ImageBackend, RenderParams};
use super::options::{OptionWarning, RawOptions, normalize};
use super::params::{Dimensions, OutputFormat, Quality};
use super::plan::{Planner, RenderPlan};
use super::report::{Report, describe_plan};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Why a run was declined.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("File not readable: {}", .0.display())]
    InputNotReadable(PathBuf),
    #[error("Image has no pixels: {}", .0.display())]
    EmptyImage(PathBuf),
    #[error("{}: {dimensions} may exceed available memory (limit {limit} pixels)", .path.display())]
    OversizedForBackend {
        path: PathBuf,
        dimensions: Dimensions,
        limit: u64,
    },
    #[error("Unsupported output format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ResizeError {
    /// Declines that skip the input without attempting any work.
    fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound(_) | Self::InputNotReadable(_) | Self::OversizedForBackend { .. }
        )
    }
}

#[derive(Debug)]
pub enum Status {
    /// The output was written according to this plan.
    Done(RenderPlan),
    Declined(ResizeError),
}

/// Result of one [`Resizer::process_image`] call.
#[derive(Debug)]
pub struct Outcome {
    pub status: Status,
    pub report: Report,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Done(_))
    }

    pub fn plan(&self) -> Option<&RenderPlan> {
        match &self.status {
            Status::Done(plan) => Some(plan),
            Status::Declined(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ResizeError> {
        match &self.status {
            Status::Done(_) => None,
            Status::Declined(err) => Some(err),
        }
    }
}

/// Settings that apply to every call, usually taken from the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizerSettings {
    /// Record plan detail in each report.
    pub debug: bool,
    pub default_quality: Quality,
    /// Fallback directory for inputs that are not readable as given.
    pub base_path: Option<PathBuf>,
    /// Decline inputs with more pixels than this.
    pub max_pixels: Option<u64>,
}

/// Resize front end over an [`ImageBackend`].
pub struct Resizer<B: ImageBackend> {
    backend: B,
    settings: ResizerSettings,
    planner: Planner,
}

impl<B: ImageBackend> Resizer<B> {
    pub fn new(backend: B, settings: ResizerSettings) -> Self {
        let planner = Planner::new(settings.default_quality);
        Self {
            backend,
            settings,
            planner,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &ResizerSettings {
        &self.settings
    }

    /// Normalize options and resolve a plan without touching any file.
    pub fn plan(
        &self,
        original: Dimensions,
        options: &RawOptions,
        format: OutputFormat,
    ) -> (RenderPlan, Vec<OptionWarning>) {
        let (options, warnings) = normalize(options);
        (self.planner.resolve(original, &options, format), warnings)
    }

    /// Resize `input` into `output` as described by `options`.
    pub fn process_image(&self, input: &Path, output: &Path, options: &RawOptions) -> Outcome {
        let started = Instant::now();
        let mut report = Report::new(self.settings.debug);

        let status = match self.run(input, output, options, &mut report) {
            Ok(plan) => {
                report.detail(format!("Wrote {}", output.display()));
                Status::Done(plan)
            }
            Err(err) => {
                record_decline(&err, input, options, &mut report);
                Status::Declined(err)
            }
        };

        report.detail(format!(
            "Execution time: {} ms",
            started.elapsed().as_millis()
        ));
        Outcome { status, report }
    }

    fn run(
        &self,
        input: &Path,
        output: &Path,
        options: &RawOptions,
        report: &mut Report,
    ) -> Result<RenderPlan, ResizeError> {
        let source = self.locate(input)?;
        let format = OutputFormat::from_path(output)
            .ok_or_else(|| ResizeError::UnsupportedFormat(output.to_path_buf()))?;

        if !options.is_empty() {
            report.detail(format!("Input options: {options}"));
        }

        let original = self.backend.identify(&source)?;
        if original.is_empty() {
            return Err(ResizeError::EmptyImage(source));
        }
        if let Some(limit) = self.settings.max_pixels {
            if original.area() > limit as f64 {
                return Err(ResizeError::OversizedForBackend {
                    path: source,
                    dimensions: original,
                    limit,
                });
            }
        }

        let (plan, warnings) = self.plan(original, options, format);
        for warning in warnings {
            report.push(format!("Warning: {warning}"));
        }
        report.extend_detail(describe_plan(&plan));

        self.backend.render(&RenderParams {
            source,
            output: output.to_path_buf(),
            plan: plan.clone(),
        })?;
        Ok(plan)
    }

    /// Find a readable input: as given, then under `base_path`.
    fn locate(&self, input: &Path) -> Result<PathBuf, ResizeError> {
        if is_readable(input) {
            return Ok(input.to_path_buf());
        }
        if let Some(base) = &self.settings.base_path {
            let relative = input.strip_prefix("/").unwrap_or(input);
            let candidate = base.join(relative);
            if is_readable(&candidate) {
                return Ok(candidate);
            }
        }
        if input.exists() {
            Err(ResizeError::InputNotReadable(input.to_path_buf()))
        } else {
            Err(ResizeError::InputNotFound(input.to_path_buf()))
        }
    }
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

fn record_decline(err: &ResizeError, input: &Path, options: &RawOptions, report: &mut Report) {
    if err.is_skip() {
        report.push(format!("{err}  *** Skipping ***"));
    } else {
        report.push(format!("*** Error *** {err}"));
        report.push(format!("Input file: {}", input.display()));
        report.push(format!("Input options: {options}"));
    }
}
