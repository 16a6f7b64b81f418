//! CLI output formatting.
//!
//! Every processed file gets a header line with its name and the size
//! change, followed by indented context lines:
//!
//! ```text
//! dawn.jpg 200x100 → 50x25
//!     Output: out/dawn-edge.png
//! broken.png failed
//!     Error: Decode failed: broken.png: ...
//!
//! edge: 1 written, 1 failed
//! ```
//!
//! Each `format_*` function returns lines (or a line) and does no I/O, so it
//! can be tested directly. The `print_*` wrappers write to stdout.

use crate::batch::{BatchEvent, BatchReport, JobReport};
use crate::imaging::{Color, Dimensions};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn size((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

/// Lines describing one finished file.
pub fn format_job(job: &JobReport) -> Vec<String> {
    let name = file_name(&job.input);
    match (&job.error, job.source_size, job.output_size) {
        (None, Some(src), Some(out)) => vec![
            format!("{} {} → {}", name, size(src), size(out)),
            format!("    Output: {}", job.output.display()),
        ],
        (Some(err), _, _) => vec![format!("{} failed", name), format!("    Error: {}", err)],
        _ => vec![format!("{} skipped", name)],
    }
}

/// Lines for a progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::JobFinished(job) => format_job(job),
    }
}

/// One-line summary of a whole batch.
pub fn format_batch_summary(report: &BatchReport) -> String {
    let failed = report.failed();
    if failed == 0 {
        format!("{}: {} written", report.operation, report.succeeded())
    } else {
        format!(
            "{}: {} written, {} failed",
            report.operation,
            report.succeeded(),
            failed
        )
    }
}

/// Line confirming a solid-color image was written.
pub fn format_solid(path: &Path, dims: Dimensions, color: Color) -> String {
    format!("{} {} {}", path.display(), dims, color)
}

pub fn print_batch_summary(report: &BatchReport) {
    println!();
    println!("{}", format_batch_summary(report));
}

pub fn print_solid(path: &Path, dims: Dimensions, color: Color) {
    println!("{}", format_solid(path, dims, color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn job(error: Option<&str>) -> JobReport {
        JobReport {
            input: PathBuf::from("photos/dawn.jpg"),
            output: PathBuf::from("out/dawn-edge.png"),
            source_size: Some((200, 100)),
            output_size: error.is_none().then_some((50, 25)),
            error: error.map(String::from),
        }
    }

    #[test]
    fn successful_job_shows_size_change_and_output() {
        assert_eq!(
            format_job(&job(None)),
            vec!["dawn.jpg 200x100 → 50x25", "    Output: out/dawn-edge.png"]
        );
    }

    #[test]
    fn failed_job_shows_error() {
        assert_eq!(
            format_job(&job(Some("boom"))),
            vec!["dawn.jpg failed", "    Error: boom"]
        );
    }

    #[test]
    fn event_formats_like_job() {
        let event = BatchEvent::JobFinished(job(None));
        assert_eq!(format_batch_event(&event), format_job(&job(None)));
    }

    #[test]
    fn summary_counts() {
        let mut report = BatchReport {
            operation: "edge".into(),
            jobs: vec![job(None), job(None)],
        };
        assert_eq!(format_batch_summary(&report), "edge: 2 written");

        report.jobs.push(job(Some("boom")));
        assert_eq!(format_batch_summary(&report), "edge: 2 written, 1 failed");
    }

    #[test]
    fn solid_line() {
        assert_eq!(
            format_solid(Path::new("red.png"), Dimensions::new(1, 1), Color::RED),
            "red.png 1x1 #ff0000"
        );
    }
}
