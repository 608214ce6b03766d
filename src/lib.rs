pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, ScanConfig};
pub use error::{CrawlerError, Result, UserFriendlyError};

// Core functionality re-exports
pub use exporter::{CsvExporter, ScanReport, CSV_HEADER};
pub use extractor::{
    DimensionError, DimensionReader, Extractor, ImageHeaderReader, ImageRecord, FAILURE_NOTE,
};
pub use scanner::{Classifier, ScanEvent, ScanObserver, Traverser, WalkStatistics};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main library interface: walk a folder, measure its images, write the CSV.
pub struct ImageSizeCrawler {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl ImageSizeCrawler {
    /// Create a crawler with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        config.validate()?;

        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Spinners would interleave with JSON lines
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
        })
    }

    /// Create a crawler from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Scan `root` and write the report to a new timestamped file in the
    /// configured output directory.
    ///
    /// Nothing is written when the walk fails.
    pub fn crawl<P: AsRef<Path>>(&self, root: P) -> Result<ScanReport> {
        let report = self.scan_with_progress(root.as_ref())?;

        let exporter = CsvExporter::new(&self.config.output);
        let output_file = exporter.export(&report.records)?;

        Ok(report.with_output_file(absolute(output_file)))
    }

    /// Scan `root` and write the report to exactly `output_file`.
    pub fn crawl_to<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        root: P,
        output_file: Q,
    ) -> Result<ScanReport> {
        let report = self.scan_with_progress(root.as_ref())?;

        let output_file = output_file.as_ref();
        CsvExporter::export_to(&report.records, output_file)?;

        Ok(report.with_output_file(absolute(output_file.to_path_buf())))
    }

    /// Walk and measure without writing anything.
    ///
    /// `observer` receives every directory entered, file visited and
    /// measurement outcome, in traversal order.
    pub fn scan<P: AsRef<Path>>(&self, root: P, observer: ScanObserver<'_>) -> Result<ScanReport> {
        let start_time = Instant::now();
        let root = scanner::traverser::resolve_root(root.as_ref())?;

        let traverser = Traverser::new(&self.config.scan);
        let extractor = Extractor::new();
        let (records, stats) = self.measure(&traverser, &extractor, &root, observer)?;

        Ok(ScanReport::new(root, stats, records, start_time.elapsed()))
    }

    #[cfg(feature = "parallel")]
    fn measure(
        &self,
        traverser: &Traverser,
        extractor: &Extractor,
        root: &Path,
        observer: ScanObserver<'_>,
    ) -> Result<(Vec<ImageRecord>, WalkStatistics)> {
        let workers = self.config.scan.workers;
        if workers <= 1 {
            return traverser.traverse(root, extractor, observer);
        }

        let (paths, stats) = traverser.discover(root, observer)?;
        let records = extractor.extract_parallel(&paths, workers, observer)?;
        Ok((records, stats))
    }

    #[cfg(not(feature = "parallel"))]
    fn measure(
        &self,
        traverser: &Traverser,
        extractor: &Extractor,
        root: &Path,
        observer: ScanObserver<'_>,
    ) -> Result<(Vec<ImageRecord>, WalkStatistics)> {
        traverser.traverse(root, extractor, observer)
    }

    /// Scan with the spinner and console logging bound to the observer
    fn scan_with_progress(&self, root: &Path) -> Result<ScanReport> {
        self.output_formatter
            .start_operation(&format!("Scanning {} for images", root.display()));

        let spinner = self.progress_manager.create_scan_spinner();
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let observer = |event: &ScanEvent| {
            ui::progress::update_scan_progress(&spinner, event);

            match event {
                ScanEvent::DirectoryEntered(path) => {
                    output.info(&format!("{}", path.display()));
                }
                ScanEvent::FileVisited(path) => {
                    output.debug(&format!("{}", path.display()));
                }
                ScanEvent::ImageMeasured(record) => {
                    output.debug(&format!(
                        "{}: {}x{}",
                        record.filename, record.width, record.height
                    ));
                }
                ScanEvent::ExtractionFailed { path, reason } => {
                    output.warning(&format!("Could not read {}: {}", path.display(), reason));
                }
                ScanEvent::LinkLoopSkipped(path) => {
                    output.warning(&format!(
                        "Skipped {}: link points back to a parent folder",
                        path.display()
                    ));
                }
                ScanEvent::LinkedDirectorySkipped(path) => {
                    output.warning(&format!(
                        "Skipped {}: linked folder not followed",
                        path.display()
                    ));
                }
            }
        };

        let result = self.scan(root, Some(&observer));

        match result {
            Ok(ref report) => ui::progress::finish_progress_with_summary(
                &spinner,
                &format!("Found {} images", report.images_recorded),
                report.elapsed,
            ),
            Err(_) => spinner.abandon_with_message("Scan failed"),
        }
        self.progress_manager.clear();

        let report = result?;
        self.output_formatter.debug(&report.display_summary());

        Ok(report)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CrawlerError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convenience function: scan `root` with default settings and return the
/// records without writing a report.
pub fn scan_directory<P: AsRef<Path>>(root: P) -> Result<Vec<ImageRecord>> {
    let crawler = ImageSizeCrawler::new(Config::default(), OutputMode::Plain, 0, true)?;
    Ok(crawler.scan(root, None)?.records)
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
