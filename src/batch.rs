//! Batch processing of resize jobs.
//!
//! A job file lists inputs, outputs and per-job options:
//!
//! ```toml
//! [[jobs]]
//! input = "photos/a.jpg"
//! output = "out/a-thumb.jpg"
//! options = { w = 150, h = 150, zc = "c", q = 75, qmax = 90 }
//!
//! [[jobs]]
//! input = "photos/b.png"
//! output = "out/b.webp"
//! options = { w = 800, fltr = ["usm|80|0.5|3"] }
//! ```
//!
//! Relative paths resolve against the job file's directory.
//!
//! ## Parallel Processing
//!
//! Jobs run in parallel using [rayon](https://docs.rs/rayon). Each job gets
//! its own [`Outcome`] and report; nothing is shared between jobs except the
//! backend. Progress is streamed as [`BatchEvent`]s over an optional
//! channel, and results come back in job-file order regardless of which
//! worker finished first.

use crate::imaging::{Dimensions, ImageBackend, Outcome, RawOptions, Resizer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Job file parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One resize request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub options: RawOptions,
}

/// On-disk job file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

/// Parse job file content, resolving relative paths against `base_dir`.
pub fn parse_jobs(content: &str, base_dir: &Path) -> Result<Vec<Job>, BatchError> {
    let file: JobFile = toml::from_str(content)?;
    Ok(file
        .jobs
        .into_iter()
        .map(|job| Job {
            input: base_dir.join(&job.input),
            output: base_dir.join(&job.output),
            options: job.options,
        })
        .collect())
}

/// Load a job file from disk.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, BatchError> {
    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    parse_jobs(&content, base_dir)
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    JobFinished {
        /// 1-based position in the job file.
        index: usize,
        input: PathBuf,
        output: PathBuf,
        /// Output size when the job succeeded.
        written: Option<Dimensions>,
        /// Decline reason when it did not.
        error: Option<String>,
        /// Report lines for this job.
        report: Vec<String>,
    },
}

impl BatchEvent {
    fn finished(index: usize, job: &Job, outcome: &Outcome) -> Self {
        Self::JobFinished {
            index: index + 1,
            input: job.input.clone(),
            output: job.output.clone(),
            written: outcome.plan().map(|plan| plan.final_dimensions),
            error: outcome.error().map(ToString::to_string),
            report: outcome.report.lines().to_vec(),
        }
    }
}

/// A job together with what happened to it.
#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub outcome: Outcome,
}

/// Aggregate counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub declined: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[JobResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        Self {
            succeeded,
            declined: results.len() - succeeded,
        }
    }
}

/// Run every job on the current rayon pool.
///
/// Results are returned in job order. When `progress` is given, it receives
/// one [`BatchEvent::Started`] and then one [`BatchEvent::JobFinished`] per
/// job as each completes.
pub fn run_batch<B: ImageBackend>(
    resizer: &Resizer<B>,
    jobs: Vec<Job>,
    progress: Option<Sender<BatchEvent>>,
) -> Vec<JobResult> {
    if let Some(tx) = &progress {
        // receiver gone means nobody is listening; the batch still runs
        tx.send(BatchEvent::Started { total: jobs.len() }).ok();
    }

    jobs.into_par_iter()
        .enumerate()
        .map_with(progress, |progress, (index, job)| {
            let outcome = resizer.process_image(&job.input, &job.output, &job.options);
            if let Some(tx) = progress {
                tx.send(BatchEvent::finished(index, &job, &outcome)).ok();
            }
            JobResult { job, outcome }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{OptionValue, ResizerSettings};
    use tempfile::TempDir;

    const JOBS: &str = r#"
[[jobs]]
input = "photos/a.jpg"
output = "out/a.jpg"
options = { w = 150, h = 150, zc = "c" }

[[jobs]]
input = "/abs/b.png"
output = "out/b.png"
"#;

    #[test]
    fn parse_jobs_resolves_relative_paths() {
        let jobs = parse_jobs(JOBS, Path::new("/work")).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].input, PathBuf::from("/work/photos/a.jpg"));
        assert_eq!(jobs[0].output, PathBuf::from("/work/out/a.jpg"));
        assert_eq!(jobs[0].options.get("w"), Some(&OptionValue::Int(150)));
        // absolute paths are kept
        assert_eq!(jobs[1].input, PathBuf::from("/abs/b.png"));
        assert!(jobs[1].options.is_empty());
    }

    #[test]
    fn parse_jobs_rejects_unknown_fields() {
        let result = parse_jobs("[[jobs]]\ninput = \"a\"\noutput = \"b\"\nopts = {}", Path::new(""));
        assert!(matches!(result, Err(BatchError::Toml(_))));
    }

    #[test]
    fn parse_jobs_empty_file() {
        assert!(parse_jobs("", Path::new("")).unwrap().is_empty());
    }

    #[test]
    fn load_jobs_uses_file_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jobs.toml");
        std::fs::write(&path, JOBS).unwrap();

        let jobs = load_jobs(&path).unwrap();
        assert_eq!(jobs[0].input, tmp.path().join("photos/a.jpg"));
    }

    #[test]
    fn load_jobs_missing_file_errors() {
        let result = load_jobs(Path::new("/nonexistent/jobs.toml"));
        assert!(matches!(result, Err(BatchError::Io(_))));
    }

    fn jobs_in(tmp: &TempDir, names: &[&str]) -> Vec<Job> {
        names
            .iter()
            .map(|name| {
                let input = tmp.path().join(name);
                if !name.starts_with("missing") {
                    std::fs::write(&input, b"jpeg").unwrap();
                }
                Job {
                    input,
                    output: tmp.path().join(format!("out-{name}")),
                    options: RawOptions::new().with("w", 100),
                }
            })
            .collect()
    }

    #[test]
    fn run_batch_keeps_job_order() {
        let tmp = TempDir::new().unwrap();
        let jobs = jobs_in(&tmp, &["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(400, 200); 4]);
        let resizer = Resizer::new(backend, ResizerSettings::default());

        let results = run_batch(&resizer, jobs.clone(), None);

        let inputs: Vec<&PathBuf> = results.iter().map(|r| &r.job.input).collect();
        let expected: Vec<&PathBuf> = jobs.iter().map(|j| &j.input).collect();
        assert_eq!(inputs, expected);
        assert!(results.iter().all(|r| r.outcome.is_success()));
        assert_eq!(resizer.backend().rendered().len(), 4);
    }

    #[test]
    fn run_batch_reports_declines_per_job() {
        let tmp = TempDir::new().unwrap();
        let jobs = jobs_in(&tmp, &["a.jpg", "missing.jpg"]);
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(400, 200)]);
        let resizer = Resizer::new(backend, ResizerSettings::default());

        let results = run_batch(&resizer, jobs, None);

        assert!(results[0].outcome.is_success());
        assert!(!results[1].outcome.is_success());
        assert!(results[0].outcome.report.is_empty());
        assert_eq!(
            BatchSummary::from_results(&results),
            BatchSummary {
                succeeded: 1,
                declined: 1
            }
        );
    }

    #[test]
    fn run_batch_streams_events() {
        let tmp = TempDir::new().unwrap();
        let jobs = jobs_in(&tmp, &["a.jpg", "missing.jpg", "c.jpg"]);
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(400, 200); 2]);
        let resizer = Resizer::new(backend, ResizerSettings::default());

        let (tx, rx) = std::sync::mpsc::channel();
        run_batch(&resizer, jobs, Some(tx));
        let events: Vec<BatchEvent> = rx.into_iter().collect();

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], BatchEvent::Started { total: 3 });

        let mut finished: Vec<(usize, Option<Dimensions>, bool)> = events[1..]
            .iter()
            .map(|event| match event {
                BatchEvent::JobFinished {
                    index,
                    written,
                    error,
                    ..
                } => (*index, *written, error.is_some()),
                BatchEvent::Started { .. } => panic!("started twice"),
            })
            .collect();
        finished.sort_by_key(|(index, _, _)| *index);
        assert_eq!(
            finished,
            vec![
                (1, Some(Dimensions::new(100, 50)), false),
                (2, None, true),
                (3, Some(Dimensions::new(100, 50)), false),
            ]
        );
    }
}
