use crate::extractor::ImageRecord;
use crate::scanner::WalkStatistics;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one finished crawl.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub output_file: Option<PathBuf>,
    pub directories_visited: usize,
    pub files_visited: usize,
    pub images_recorded: usize,
    pub extraction_failures: usize,
    pub loops_skipped: usize,
    pub links_skipped: usize,
    pub elapsed: Duration,
    pub completed_at: DateTime<Local>,
    #[serde(skip)]
    pub records: Vec<ImageRecord>,
}

impl ScanReport {
    pub fn new(
        root: PathBuf,
        stats: WalkStatistics,
        records: Vec<ImageRecord>,
        elapsed: Duration,
    ) -> Self {
        let extraction_failures = records.iter().filter(|r| r.is_failure()).count();

        Self {
            root,
            output_file: None,
            directories_visited: stats.directories_visited,
            files_visited: stats.files_visited,
            images_recorded: records.len(),
            extraction_failures,
            loops_skipped: stats.loops_skipped,
            links_skipped: stats.links_skipped,
            elapsed,
            completed_at: Local::now(),
            records,
        }
    }

    pub fn with_output_file(mut self, path: PathBuf) -> Self {
        self.output_file = Some(path);
        self
    }

    pub fn has_failures(&self) -> bool {
        self.extraction_failures > 0
    }

    pub fn failed_records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter().filter(|r| r.is_failure())
    }

    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Root: {}\n  Directories: {}\n  Files visited: {}\n  Images recorded: {}\n",
            self.root.display(),
            self.directories_visited,
            self.files_visited,
            self.images_recorded
        );

        if self.extraction_failures > 0 {
            summary.push_str(&format!(
                "  Unreadable images: {}\n",
                self.extraction_failures
            ));
        }

        if self.loops_skipped > 0 {
            summary.push_str(&format!("  Link loops skipped: {}\n", self.loops_skipped));
        }

        if self.links_skipped > 0 {
            summary.push_str(&format!("  Linked folders skipped: {}\n", self.links_skipped));
        }

        if let Some(ref output) = self.output_file {
            summary.push_str(&format!("  Report: {}\n", output.display()));
        }

        summary
    }
}
