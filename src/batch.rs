//! Apply one image operation to many files.
//!
//! Inputs are files or directories. Directories are walked recursively and
//! every file with a readable extension (see
//! [`supported_input_extensions`](crate::imaging::supported_input_extensions))
//! is picked up, sorted by path so runs are reproducible.
//!
//! ## Output Naming
//!
//! Files found by walking a directory keep their place under that
//! directory's name; files named directly land at the top of `out_dir`:
//!
//! ```text
//! imgfit fill photos/ ...     photos/2024/dawn.jpg  →  out/photos/2024/dawn-fill.png
//! imgfit fill dawn.jpg ...    dawn.jpg              →  out/dawn-fill.png
//! (suffix = false)            dawn.jpg              →  out/dawn.png
//! ```
//!
//! Inputs that would still share an output path (`x.jpg` next to `x.png`,
//! or two directly named files with the same stem) are not processed. Each
//! is reported as failed rather than overwriting the other.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). Each
//! job loads, transforms and writes one file on its own surface, so jobs share
//! nothing but the immutable backend. A failing file is recorded in the
//! report and does not stop the rest of the batch.

use crate::config::{Config, OutputConfig};
use crate::imaging::io::is_supported_input;
use crate::imaging::{
    BackendError, Color, Dimensions, Image, Padding, RasterBackend, Scale, image_with_padding,
    load_image, resize_by_scale, resize_to_fill, resize_to_longest_edge, save_image,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("No input images found")]
    NoInputs,
}

/// A transformation applied to every file in a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Pad { padding: Padding, fill: Color },
    Scale(Scale),
    LongestEdge(u32),
    Fill(Dimensions),
}

impl Operation {
    /// Short name, used as the output file suffix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pad { .. } => "pad",
            Self::Scale(_) => "scale",
            Self::LongestEdge(_) => "edge",
            Self::Fill(_) => "fill",
        }
    }

    pub fn apply(&self, backend: &impl RasterBackend, image: &Image) -> Result<Image, BackendError> {
        match *self {
            Self::Pad { padding, fill } => image_with_padding(backend, image, padding, fill),
            Self::Scale(scale) => resize_by_scale(backend, image, scale),
            Self::LongestEdge(edge) => resize_to_longest_edge(backend, image, edge),
            Self::Fill(target) => resize_to_fill(backend, image, target),
        }
    }
}

/// Outcome of one file in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Source dimensions (width, height), when the file decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_size: Option<(u32, u32)>,
    /// Written dimensions (width, height), on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a whole batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub operation: String,
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.jobs.len() - self.succeeded()
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), BatchError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Progress events sent while a batch runs, one per finished file.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    JobFinished(JobReport),
}

/// One image to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    /// Where the file is read from.
    pub path: PathBuf,
    /// Where its result goes under the output directory, before renaming.
    pub relative: PathBuf,
}

/// Expand files and directories into a sorted, de-duplicated list of images.
///
/// Files named explicitly are kept whatever their extension, so a bad input
/// surfaces as a per-file error. Directory contents are filtered to readable
/// extensions.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<BatchInput>, BatchError> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let root = path.file_name().map(PathBuf::from).unwrap_or_default();
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry?;
                if entry.file_type().is_file() && is_supported_input(entry.path()) {
                    let inner = entry.path().strip_prefix(path).unwrap_or(entry.path());
                    inputs.push(BatchInput {
                        relative: root.join(inner),
                        path: entry.into_path(),
                    });
                }
            }
        } else {
            let name = path.file_name().map(PathBuf::from).unwrap_or_default();
            inputs.push(BatchInput {
                path: path.clone(),
                relative: name,
            });
        }
    }
    inputs.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.relative.cmp(&b.relative)));
    inputs.dedup_by(|a, b| a.path == b.path);

    if inputs.is_empty() {
        return Err(BatchError::NoInputs);
    }
    Ok(inputs)
}

/// Where the result for `input` is written.
pub fn output_path(
    input: &BatchInput,
    out_dir: &Path,
    operation: &Operation,
    output: &OutputConfig,
) -> PathBuf {
    let stem = input
        .relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = if output.suffix {
        format!("{}-{}.{}", stem, operation.name(), output.format.extension())
    } else {
        format!("{}.{}", stem, output.format.extension())
    };
    let parent = input.relative.parent().unwrap_or(Path::new(""));
    out_dir.join(parent).join(name)
}

fn run_job(
    backend: &impl RasterBackend,
    input: &Path,
    output: &Path,
    operation: &Operation,
    config: &Config,
) -> JobReport {
    let mut report = JobReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        source_size: None,
        output_size: None,
        error: None,
    };

    let result = load_image(input).and_then(|image| {
        report.source_size = Some((image.width(), image.height()));
        let transformed = operation.apply(backend, &image)?;
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        save_image(&transformed, output, config.quality())?;
        Ok(transformed.dimensions())
    });

    match result {
        Ok(dims) => report.output_size = Some((dims.width, dims.height)),
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

/// Run `operation` over `inputs`, writing results into `out_dir`.
///
/// Uses the backend described by `config`. See [`run_batch_with_backend`].
pub fn run_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    operation: Operation,
    config: &Config,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    run_batch_with_backend(&config.backend(), inputs, out_dir, operation, config, events)
}

/// Run a batch on a specific backend (allows testing with mock).
pub fn run_batch_with_backend(
    backend: &impl RasterBackend,
    inputs: &[PathBuf],
    out_dir: &Path,
    operation: Operation,
    config: &Config,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let files = collect_inputs(inputs)?;
    std::fs::create_dir_all(out_dir)?;

    let planned: Vec<(PathBuf, PathBuf)> = files
        .into_iter()
        .map(|input| {
            let output = output_path(&input, out_dir, &operation, &config.output);
            (input.path, output)
        })
        .collect();
    let mut claims: HashMap<&Path, usize> = HashMap::new();
    for (_, output) in &planned {
        *claims.entry(output.as_path()).or_default() += 1;
    }

    let jobs: Vec<JobReport> = planned
        .par_iter()
        .map(|(input, output)| {
            let report = if claims[output.as_path()] > 1 {
                JobReport {
                    input: input.clone(),
                    output: output.clone(),
                    source_size: None,
                    output_size: None,
                    error: Some(format!(
                        "{} is also the output of another input",
                        output.display()
                    )),
                }
            } else {
                run_job(backend, input, output, &operation, config)
            };
            if let Some(tx) = &events {
                // Receiver gone means nobody is listening; keep working.
                tx.send(BatchEvent::JobFinished(report.clone())).ok();
            }
            report
        })
        .collect();

    Ok(BatchReport {
        operation: operation.name().to_string(),
        jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{gradient_image, write_test_png};
    use tempfile::TempDir;

    fn fill_op() -> Operation {
        Operation::Fill(Dimensions::new(8, 8))
    }

    fn input(path: &str, relative: &str) -> BatchInput {
        BatchInput {
            path: PathBuf::from(path),
            relative: PathBuf::from(relative),
        }
    }

    fn paths(inputs: &[BatchInput]) -> Vec<PathBuf> {
        inputs.iter().map(|i| i.path.clone()).collect()
    }

    #[test]
    fn operation_names() {
        assert_eq!(
            Operation::Pad {
                padding: Padding::uniform(1),
                fill: Color::TRANSPARENT
            }
            .name(),
            "pad"
        );
        assert_eq!(Operation::Scale(Scale::new(2.0).unwrap()).name(), "scale");
        assert_eq!(Operation::LongestEdge(10).name(), "edge");
        assert_eq!(fill_op().name(), "fill");
    }

    #[test]
    fn output_path_with_suffix() {
        let out = output_path(
            &input("photos/dawn.jpg", "dawn.jpg"),
            Path::new("out"),
            &fill_op(),
            &OutputConfig::default(),
        );
        assert_eq!(out, PathBuf::from("out/dawn-fill.png"));
    }

    #[test]
    fn output_path_without_suffix_uses_format_extension() {
        let config = OutputConfig {
            format: OutputFormat::Jpeg,
            suffix: false,
            ..OutputConfig::default()
        };
        let out = output_path(
            &input("a/b/dawn.png", "dawn.png"),
            Path::new("out"),
            &fill_op(),
            &config,
        );
        assert_eq!(out, PathBuf::from("out/dawn.jpg"));
    }

    #[test]
    fn output_path_keeps_walked_subdirectories() {
        let out = output_path(
            &input("/home/me/photos/2024/dawn.jpg", "photos/2024/dawn.jpg"),
            Path::new("out"),
            &fill_op(),
            &OutputConfig::default(),
        );
        assert_eq!(out, PathBuf::from("out/photos/2024/dawn-fill.png"));
    }

    #[test]
    fn collect_inputs_walks_and_filters() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        write_test_png(&tmp.path().join("b.png"), 2, 2);
        write_test_png(&nested.join("a.png"), 2, 2);
        std::fs::write(tmp.path().join("notes.txt"), "hi").unwrap();

        let inputs = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths(&inputs), vec![tmp.path().join("b.png"), nested.join("a.png")]);

        let root = PathBuf::from(tmp.path().file_name().unwrap());
        assert_eq!(inputs[0].relative, root.join("b.png"));
        assert_eq!(inputs[1].relative, root.join("nested").join("a.png"));
    }

    #[test]
    fn collect_inputs_dedups_overlapping_args() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("x.png");
        write_test_png(&file, 2, 2);

        let inputs = collect_inputs(&[file.clone(), tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths(&inputs), vec![file]);
    }

    #[test]
    fn collect_inputs_empty_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            collect_inputs(&[tmp.path().to_path_buf()]),
            Err(BatchError::NoInputs)
        ));
    }

    #[test]
    fn batch_writes_outputs_and_reports_sizes() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let out = tmp.path().join("out");
        std::fs::create_dir_all(&src).unwrap();
        write_test_png(&src.join("one.png"), 200, 100);
        write_test_png(&src.join("two.png"), 60, 90);

        let report = run_batch(
            &[src.clone()],
            &out,
            Operation::LongestEdge(50),
            &Config::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.operation, "edge");
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.jobs[0].source_size, Some((200, 100)));
        assert_eq!(report.jobs[0].output_size, Some((50, 25)));
        assert_eq!(report.jobs[1].output_size, Some((33, 50)));

        let written = load_image(&out.join("src").join("one-edge.png")).unwrap();
        assert_eq!(written.dimensions(), Dimensions::new(50, 25));
    }

    #[test]
    fn same_name_in_different_directories_both_written() {
        let tmp = TempDir::new().unwrap();
        let (a, b, out) = (tmp.path().join("a"), tmp.path().join("b"), tmp.path().join("out"));
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        write_test_png(&a.join("x.png"), 40, 20);
        write_test_png(&b.join("x.png"), 20, 40);

        let report = run_batch(
            &[a, b],
            &out,
            Operation::LongestEdge(10),
            &Config::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_ne!(report.jobs[0].output, report.jobs[1].output);
        assert_eq!(
            load_image(&out.join("a").join("x-edge.png")).unwrap().dimensions(),
            Dimensions::new(10, 5)
        );
        assert_eq!(
            load_image(&out.join("b").join("x-edge.png")).unwrap().dimensions(),
            Dimensions::new(5, 10)
        );
    }

    #[test]
    fn colliding_outputs_fail_instead_of_overwriting() {
        let tmp = TempDir::new().unwrap();
        let (a, b, out) = (tmp.path().join("a"), tmp.path().join("b"), tmp.path().join("out"));
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        write_test_png(&a.join("x.png"), 4, 4);
        write_test_png(&b.join("x.png"), 4, 4);
        let unique = tmp.path().join("y.png");
        write_test_png(&unique, 4, 4);

        // Named directly, both files would land on out/x-edge.png.
        let report = run_batch(
            &[a.join("x.png"), b.join("x.png"), unique],
            &out,
            Operation::LongestEdge(10),
            &Config::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        for job in report.jobs.iter().filter(|j| j.input.ends_with("x.png")) {
            assert!(job.error.as_deref().unwrap().contains("another input"));
            assert_eq!(job.output_size, None);
        }
        assert!(!out.join("x-edge.png").exists());
        assert!(out.join("y-edge.png").exists());
    }

    #[test]
    fn same_stem_different_extension_collides() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("pics");
        std::fs::create_dir_all(&dir).unwrap();
        write_test_png(&dir.join("x.png"), 4, 4);
        gradient_image(4, 4).into_rgba().save(dir.join("x.tiff")).unwrap();

        let report = run_batch(
            &[dir],
            &tmp.path().join("out"),
            fill_op(),
            &Config::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.failed(), 2);
    }

    #[test]
    fn bad_file_does_not_stop_batch() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.png");
        let bad = tmp.path().join("bad.png");
        write_test_png(&good, 10, 10);
        std::fs::write(&bad, b"not an image").unwrap();

        let report = run_batch(
            &[good, bad],
            &tmp.path().join("out"),
            fill_op(),
            &Config::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let failed = report.jobs.iter().find(|j| !j.succeeded()).unwrap();
        assert!(failed.input.ends_with("bad.png"));
        assert!(failed.error.as_deref().unwrap().contains("Decode"));
    }

    #[test]
    fn batch_sends_one_event_per_file() {
        let tmp = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_test_png(&tmp.path().join(name), 4, 4);
        }
        let (tx, rx) = std::sync::mpsc::channel();

        run_batch(
            &[tmp.path().to_path_buf()],
            &tmp.path().join("out"),
            fill_op(),
            &Config::default(),
            Some(tx),
        )
        .unwrap();

        let events: Vec<BatchEvent> = rx.iter().collect();
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn batch_uses_given_backend() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.png");
        write_test_png(&file, 200, 100);
        let mock = MockBackend::new();

        run_batch_with_backend(
            &mock,
            &[file],
            &tmp.path().join("out"),
            Operation::Fill(Dimensions::new(50, 50)),
            &Config::default(),
            None,
        )
        .unwrap();

        assert!(mock.get_operations().contains(&RecordedOp::DrawImage {
            source: Dimensions::new(200, 100),
            rect: crate::imaging::Rect::new(-25, 0, Dimensions::new(100, 50)),
        }));
    }

    #[test]
    fn report_serializes_to_json() {
        let tmp = TempDir::new().unwrap();
        let report = BatchReport {
            operation: "pad".into(),
            jobs: vec![JobReport {
                input: "in.png".into(),
                output: "out/in-pad.png".into(),
                source_size: Some((10, 10)),
                output_size: Some((12, 12)),
                error: None,
            }],
        };
        let path = tmp.path().join("report.json");
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["operation"], "pad");
        assert_eq!(value["jobs"][0]["output_size"][0], 12);
        assert!(value["jobs"][0].get("error").is_none());
    }
}
