use crate::error::{CrawlerError, UserFriendlyError};
use crate::exporter::ScanReport;
use console::{style, Emoji, StyledObject, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static MAGNIFIER: Emoji = Emoji("🔍 ", "> ");

/// Kind of console message. Each kind has its own verbosity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Operation,
    Success,
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    /// Verbosity needed to show the message; `None` means it is never hidden.
    fn threshold(self) -> Option<u8> {
        match self {
            Level::Success | Level::Error => None,
            Level::Operation | Level::Warning => Some(0),
            Level::Info => Some(1),
            Level::Debug => Some(2),
        }
    }

    fn json_name(self) -> &'static str {
        match self {
            Level::Operation => "operation_start",
            Level::Success => "success",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    fn plain_prefix(self) -> &'static str {
        match self {
            Level::Operation => "STARTING",
            Level::Success => "SUCCESS",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

/// Console and log output, filtered by verbosity.
///
/// Level 0 carries operation banners, warnings and results, level 1 adds
/// directory progress, level 2 adds every visited file. Errors always go to
/// stderr, everything else to stdout.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = mode == OutputMode::Human
            && !quiet
            && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn start_operation(&self, operation: &str) {
        self.emit(Level::Operation, operation);
    }

    pub fn print_user_friendly_error(&self, error: &CrawlerError) {
        self.error(&error.user_message());

        let Some(suggestion) = error.suggestion() else {
            return;
        };

        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "suggestion",
                "message": suggestion
            })),
            OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
            OutputMode::Human if self.use_colors => {
                eprintln!();
                eprintln!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
            }
            OutputMode::Human => {
                eprintln!();
                eprintln!("Suggestion: {}", suggestion);
            }
        }
    }

    /// Prints the end-of-run summary.
    ///
    /// Where the report was saved is printed in every text mode, even when
    /// quiet, since it is the one thing the user needs after a run.
    pub fn print_scan_report(&self, report: &ScanReport) {
        match self.mode {
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
            OutputMode::Human if self.quiet => {
                if let Some(folder) = saved_folder(report) {
                    println!("Output was saved here: {}", folder);
                }
            }
            OutputMode::Human => self.print_human_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn shows(&self, level: Level) -> bool {
        match level.threshold() {
            None => true,
            Some(min) => !self.quiet && self.verbose_level >= min,
        }
    }

    fn emit(&self, level: Level, message: &str) {
        if !self.shows(level) {
            return;
        }

        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "message",
                "level": level.json_name(),
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
            OutputMode::Plain if level == Level::Error => {
                eprintln!("{}: {}", level.plain_prefix(), message)
            }
            OutputMode::Plain => println!("{}: {}", level.plain_prefix(), message),
            OutputMode::Human => self.print_human(level, message),
        }
    }

    fn print_human(&self, level: Level, message: &str) {
        let line = if self.use_colors {
            let (emoji, styled): (&Emoji, StyledObject<&str>) = match level {
                Level::Operation => (&MAGNIFIER, style(message).bold()),
                Level::Success => (&CHECKMARK, style(message).green().bold()),
                Level::Error => (&CROSS, style(message).red().bold()),
                Level::Warning => (&WARNING, style(message).yellow().bold()),
                Level::Info => (&INFO, style(message).cyan()),
                Level::Debug => {
                    println!("  {}", style(message).dim());
                    return;
                }
            };
            format!("{}{}", emoji, styled)
        } else {
            let prefix = match level {
                Level::Operation => ">",
                Level::Success => "✓",
                Level::Error => "✗",
                Level::Warning => "!",
                Level::Info => "i",
                Level::Debug => "  DEBUG:",
            };
            format!("{} {}", prefix, message)
        };

        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: impl ToString) -> String {
        let value = value.to_string();
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &ScanReport) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!("{} {}", style("Image scan completed!").green().bold(), CHECKMARK);
        } else {
            println!("✓ Image scan completed!");
        }

        println!();
        println!("  Scanned folder:  {}", report.root.display());
        println!("  Directories:     {}", self.highlight(report.directories_visited));
        println!("  Files visited:   {}", self.highlight(report.files_visited));
        println!("  Images recorded: {}", self.highlight(report.images_recorded));
        if report.has_failures() {
            println!("  Unreadable:      {}", self.highlight(report.extraction_failures));
        }
        if report.links_skipped > 0 {
            println!("  Links skipped:   {}", self.highlight(report.links_skipped));
        }
        println!("  Time taken:      {}", self.highlight(format_duration(report.elapsed)));

        if let (Some(folder), Some(output)) = (saved_folder(report), &report.output_file) {
            println!();
            println!("  Output was saved here: {}", folder);
            println!("  Report file:           {}", output.display());
        }

        if report.has_failures() && self.shows(Level::Info) {
            println!();
            println!("  Unreadable images:");
            for record in report.failed_records() {
                println!("    - {}", record.full_path);
            }
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &ScanReport) {
        if !self.quiet {
            println!("COMPLETED: Image scan");
            println!("Root: {}", report.root.display());
            println!("Directories: {}", report.directories_visited);
            println!("Files visited: {}", report.files_visited);
            println!("Images recorded: {}", report.images_recorded);
            println!("Unreadable: {}", report.extraction_failures);
            println!("Links skipped: {}", report.links_skipped);
            println!("Duration: {}", format_duration(report.elapsed));
        }

        if let (Some(folder), Some(output)) = (saved_folder(report), &report.output_file) {
            println!("Output was saved here: {}", folder);
            if !self.quiet {
                println!("Output: {}", output.display());
            }
        }
    }
}

fn saved_folder(report: &ScanReport) -> Option<String> {
    report
        .output_file
        .as_ref()
        .and_then(|file| file.parent())
        .map(|folder| folder.display().to_string())
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Prints through the formatter without tearing an active progress bar.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    fn print(&self, level: Level, message: &str) {
        // Skip the suspend/redraw cycle for messages that would be filtered
        if !self.formatter.shows(level) {
            return;
        }

        match self.progress_manager {
            Some(pm) => pm.suspend(|| self.formatter.emit(level, message)),
            None => self.formatter.emit(level, message),
        }
    }

    pub fn warning(&self, message: &str) {
        self.print(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.print(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.print(Level::Debug, message);
    }
}
