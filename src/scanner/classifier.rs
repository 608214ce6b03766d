use crate::config::ScanConfig;
use std::path::Path;

/// Decides whether a file name names an image by its extension.
///
/// The extension is the segment after the last `.` of the file name. A name
/// without any `.` is never an image, whatever the allow-list holds.
#[derive(Debug, Clone)]
pub struct Classifier {
    extensions: Vec<String>,
    case_insensitive: bool,
}

impl Classifier {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_extensions(config.extensions.iter().cloned(), config.case_insensitive)
    }

    pub fn with_extensions<I, S>(extensions: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions = extensions
            .into_iter()
            .map(Into::into)
            .map(|ext: String| {
                if case_insensitive {
                    ext.to_lowercase()
                } else {
                    ext
                }
            })
            .collect();

        Self {
            extensions,
            case_insensitive,
        }
    }

    pub fn is_image(&self, filename: &str) -> bool {
        let Some((_, extension)) = filename.rsplit_once('.') else {
            return false;
        };

        if self.case_insensitive {
            let extension = extension.to_lowercase();
            self.extensions.iter().any(|ext| *ext == extension)
        } else {
            self.extensions.iter().any(|ext| ext == extension)
        }
    }

    /// Classifies by the final path component; paths with a non UTF-8 name are
    /// compared lossily.
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.is_image(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}
