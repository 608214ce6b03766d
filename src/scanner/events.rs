//! Progress events emitted while a scan runs

use crate::extractor::ImageRecord;
use std::path::PathBuf;

/// Notification handed to the scan observer.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A directory is about to have its files visited.
    DirectoryEntered(PathBuf),

    /// A file was listed, whether or not it turns out to be an image.
    FileVisited(PathBuf),

    /// An image file was measured successfully.
    ImageMeasured(ImageRecord),

    /// An image file could not be measured; a sentinel record was kept.
    ExtractionFailed { path: PathBuf, reason: String },

    /// A followed link points back at one of its ancestors and was not entered.
    LinkLoopSkipped(PathBuf),

    /// A link to a directory was not entered because links are not followed.
    LinkedDirectorySkipped(PathBuf),
}

/// Observer callback threaded through traversal and extraction.
pub type ScanObserver<'a> = Option<&'a dyn Fn(&ScanEvent)>;

pub(crate) fn notify(observer: ScanObserver<'_>, event: ScanEvent) {
    if let Some(callback) = observer {
        callback(&event);
    }
}
