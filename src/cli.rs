use crate::config::{CliOverrides, Config};
use crate::error::Result;
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image-size-crawler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Catalogue image dimensions of a folder tree into a CSV report")]
#[command(
    long_about = "Image Size Crawler walks a folder and every folder below it, measures the \
                  pixel width and height of each image it finds, and writes one CSV row per \
                  image together with its last-modified time."
)]
#[command(after_help = "EXAMPLES:\n  \
    image-size-crawler ~/Pictures\n  \
    image-size-crawler /mnt/archive --output-dir reports --verbose\n  \
    image-size-crawler . --extensions jpg,jpeg,png --case-insensitive\n  \
    image-size-crawler /mnt/share --no-follow-links\n  \
    image-size-crawler /data --config crawler.toml --output-format json")]
pub struct Cli {
    /// Folder to scan (prompted for when omitted)
    pub path: Option<PathBuf>,

    /// Directory that receives the timestamped CSV report
    #[arg(short, long, help = "Directory for the CSV report (default: ./Output)")]
    pub output_dir: Option<PathBuf>,

    /// Exact CSV file to write instead of a timestamped name
    #[arg(long, conflicts_with = "output_dir")]
    pub output_file: Option<PathBuf>,

    /// Image extensions to record (comma-separated)
    #[arg(
        short,
        long,
        help = "Image extensions to record, without dots (e.g., jpg,png,tif)"
    )]
    pub extensions: Option<String>,

    /// Match extensions regardless of case
    #[arg(long)]
    pub case_insensitive: bool,

    /// Report linked directories instead of descending into them
    #[arg(long)]
    pub no_follow_links: bool,

    /// Maximum directory depth below the scanned folder
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Worker threads used to measure images
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (scan and measure without writing the CSV)
    #[arg(long, help = "Scan and report without writing the CSV file")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extensions(self.extensions.clone())
            .with_case_insensitive(self.case_insensitive.then_some(true))
            .with_follow_links(self.no_follow_links.then_some(false))
            .with_max_depth(self.max_depth)
            .with_workers(self.workers)
            .with_output_dir(self.output_dir.clone())
    }

    /// `--workers` only has an effect in builds with the `parallel` feature.
    pub fn workers_ignored(&self) -> bool {
        self.workers.is_some() && !cfg!(feature = "parallel")
    }
}

/// Asks for the folder to scan, the way the tool behaves when started
/// without arguments.
pub fn prompt_for_path<R: BufRead, W: Write>(mut input: R, mut output: W) -> anyhow::Result<PathBuf> {
    writeln!(
        output,
        "Enter the path of the folder you want to traverse:"
    )
    .context("failed to write prompt")?;
    output.flush().context("failed to flush prompt")?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read folder path from standard input")?;

    // Pasted paths often arrive wrapped in quotes
    let trimmed = line.trim().trim_matches('"').trim_matches('\'');
    if read == 0 || trimmed.is_empty() {
        bail!("no folder path was entered");
    }

    Ok(PathBuf::from(trimmed))
}
