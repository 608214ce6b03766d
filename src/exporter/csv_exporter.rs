use crate::config::OutputConfig;
use crate::error::{CrawlerError, Result};
use crate::extractor::ImageRecord;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Column names in the order they are written.
pub const CSV_HEADER: [&str; 6] = [
    "Filename",
    "FullFilepath",
    "Height",
    "Width",
    "LastModified",
    "Notes",
];

// Field order here is the column order on disk
#[derive(Serialize)]
struct CsvRow<'a> {
    filename: &'a str,
    full_path: &'a str,
    height: u32,
    width: u32,
    last_modified: &'a str,
    notes: &'a str,
}

impl<'a> From<&'a ImageRecord> for CsvRow<'a> {
    fn from(record: &'a ImageRecord) -> Self {
        Self {
            filename: &record.filename,
            full_path: &record.full_path,
            height: record.height,
            width: record.width,
            last_modified: &record.last_modified,
            notes: &record.notes,
        }
    }
}

pub struct CsvExporter {
    output_directory: PathBuf,
    file_prefix: String,
}

impl CsvExporter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            output_directory: config.directory.clone(),
            file_prefix: config.file_prefix.clone(),
        }
    }

    pub fn with_output_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.output_directory = directory.into();
        self
    }

    /// Writes `records` to a new timestamped file in the output directory and
    /// returns the path written.
    pub fn export(&self, records: &[ImageRecord]) -> Result<PathBuf> {
        self.ensure_output_directory()?;
        let path = self.next_output_path(Local::now());
        Self::export_to(records, &path)?;
        Ok(path)
    }

    /// Writes the header row and one row per record, in slice order.
    pub fn export_to(records: &[ImageRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_directory(parent)?;
        }

        // Header written by hand so an empty scan still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;

        Ok(())
    }

    pub fn ensure_output_directory(&self) -> Result<()> {
        create_directory(&self.output_directory)
    }

    /// Picks a file name for a run started at `now`, never reusing an
    /// existing file.
    pub fn next_output_path(&self, now: DateTime<Local>) -> PathBuf {
        let stem = format!("{}-{}", self.file_prefix, now.format("%Y%m%d-%H%M%S-%3f"));

        let mut candidate = self.output_directory.join(format!("{}.csv", stem));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self
                .output_directory
                .join(format!("{}-{}.csv", stem, counter));
            counter += 1;
        }

        candidate
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => CrawlerError::Permission {
            path: format!("Cannot create output directory {}: {}", path.display(), e),
        },
        _ => CrawlerError::Io(e),
    })
}
