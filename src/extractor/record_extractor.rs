use crate::extractor::dimensions::{DimensionError, DimensionReader, ImageHeaderReader};
use crate::scanner::events::{notify, ScanEvent, ScanObserver};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Note written for every file that could not be measured.
pub const FAILURE_NOTE: &str = "EXCEPTION. ERROR READING FILE.";

/// Local time, independent of the user's locale.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the report: a single image-classified file.
///
/// `width == 0 && height == 0` with a non-empty `notes` marks a file that
/// could not be measured. `failure` carries the underlying error and is the
/// in-memory way to tell that apart from an image that decodes to zero pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub full_path: String,
    pub width: u32,
    pub height: u32,
    pub last_modified: String,
    pub notes: String,
    #[serde(skip)]
    pub failure: Option<String>,
}

impl ImageRecord {
    pub fn measured(path: &Path, width: u32, height: u32, last_modified: String) -> Self {
        Self {
            filename: file_name(path),
            full_path: full_path(path),
            width,
            height,
            last_modified,
            notes: String::new(),
            failure: None,
        }
    }

    pub fn failed<S: Into<String>>(path: &Path, reason: S) -> Self {
        Self {
            filename: file_name(path),
            full_path: full_path(path),
            width: 0,
            height: 0,
            last_modified: String::new(),
            notes: FAILURE_NOTE.to_string(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Turns image paths into records, absorbing every per-file failure.
pub struct Extractor {
    reader: Box<dyn DimensionReader>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_reader(ImageHeaderReader)
    }

    pub fn with_reader<R: DimensionReader + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Measures one file. Always returns a record; failures become the
    /// zero-sized sentinel with [`FAILURE_NOTE`].
    pub fn extract(&self, path: &Path) -> ImageRecord {
        match self.measure(path) {
            Ok((width, height, last_modified)) => {
                ImageRecord::measured(path, width, height, last_modified)
            }
            Err(err) => ImageRecord::failed(path, err.to_string()),
        }
    }

    fn measure(&self, path: &Path) -> Result<(u32, u32, String), DimensionError> {
        let (width, height) = self.reader.dimensions(path)?;

        let modified = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(DimensionError::Metadata)?;

        Ok((width, height, format_timestamp(modified)))
    }

    /// Measures `paths` on a pool of `workers` threads.
    ///
    /// The output order is the order of `paths`, and observer events are
    /// delivered from the calling thread in that same order once all files
    /// have been measured.
    #[cfg(feature = "parallel")]
    pub fn extract_parallel(
        &self,
        paths: &[PathBuf],
        workers: usize,
        observer: ScanObserver<'_>,
    ) -> crate::error::Result<Vec<ImageRecord>> {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| crate::error::CrawlerError::Config {
                message: format!("Failed to start extraction workers: {}", e),
            })?;

        let mut tagged: Vec<(usize, ImageRecord)> = pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(index, path)| (index, self.extract(path)))
                .collect()
        });
        tagged.sort_by_key(|(index, _)| *index);

        Ok(tagged
            .into_iter()
            .map(|(_, record)| {
                Self::report(observer, &record);
                record
            })
            .collect())
    }

    pub(crate) fn report(observer: ScanObserver<'_>, record: &ImageRecord) {
        let event = match record.failure {
            Some(ref reason) => ScanEvent::ExtractionFailed {
                path: PathBuf::from(&record.full_path),
                reason: reason.clone(),
            },
            None => ScanEvent::ImageMeasured(record.clone()),
        };
        notify(observer, event);
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn full_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
