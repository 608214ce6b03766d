use crate::error::{CrawlerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    pub case_insensitive: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "png".to_string(), "tif".to_string()],
            case_insensitive: false,
            follow_links: true,
            max_depth: None, // Unlimited
            workers: num_cpus::get(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Output"),
            file_prefix: "ImageSizeCrawler-output".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CrawlerError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CrawlerError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CrawlerError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["image-size-crawler.toml", ".image-size-crawler.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extensions) = cli_args.extensions {
            self.scan.extensions = extensions
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(case_insensitive) = cli_args.case_insensitive {
            self.scan.case_insensitive = case_insensitive;
        }

        if let Some(follow_links) = cli_args.follow_links {
            self.scan.follow_links = follow_links;
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.scan.max_depth = Some(max_depth);
        }

        if let Some(workers) = cli_args.workers {
            self.scan.workers = workers;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            return Err(CrawlerError::Config {
                message: "At least one image extension must be specified".to_string(),
            });
        }

        // Extensions are compared against the segment after the last dot
        if let Some(bad) = self
            .scan
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('.'))
        {
            return Err(CrawlerError::Config {
                message: format!(
                    "Invalid extension '{}': list extensions without a leading dot",
                    bad
                ),
            });
        }

        if self.scan.workers == 0 {
            return Err(CrawlerError::Config {
                message: "Worker count must be greater than 0".to_string(),
            });
        }

        if self.scan.max_depth == Some(0) {
            return Err(CrawlerError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self.output.file_prefix.trim().is_empty() {
            return Err(CrawlerError::Config {
                message: "Output file prefix cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extensions: Option<String>,
    pub case_insensitive: Option<bool>,
    pub follow_links: Option<bool>,
    pub max_depth: Option<usize>,
    pub workers: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: Option<bool>) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_follow_links(mut self, follow_links: Option<bool>) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }
}
