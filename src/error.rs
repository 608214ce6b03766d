use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path does not exist: {path}")]
    InvalidPath { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Failed to list directory {}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Permission denied: {path}")]
    Permission { path: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CrawlerError {
    fn user_message(&self) -> String {
        match self {
            CrawlerError::InvalidPath { path } => {
                format!("The folder to scan does not exist: {}", path)
            }
            CrawlerError::NotADirectory { path } => {
                format!("The path to scan is a file, not a folder: {}", path)
            }
            CrawlerError::Traversal { path, source } => {
                format!("Could not read directory {}: {}", path.display(), source)
            }
            CrawlerError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CrawlerError::Csv(error) => {
                format!("Could not write the CSV report: {}", error)
            }
            CrawlerError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CrawlerError::InvalidPath { .. } => Some(
                "Check the spelling of the path, or pass an absolute path to the folder you want to scan.".to_string()
            ),
            CrawlerError::NotADirectory { .. } => Some(
                "Pass the folder that contains the images rather than a single image file.".to_string()
            ),
            CrawlerError::Traversal { .. } => Some(
                "Ensure you have read permission for every folder below the scan root, or scan a narrower folder.".to_string()
            ),
            CrawlerError::Config { .. } => Some(
                "Check your configuration file syntax. Run with --generate-config to see a valid example.".to_string()
            ),
            CrawlerError::Csv(_) | CrawlerError::Permission { .. } => Some(
                "Ensure the output directory is writable, or choose another one with --output-dir.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CrawlerError {
    fn from(error: toml::de::Error) -> Self {
        CrawlerError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlerError>;
