use clap::Parser;
use image_size_crawler::{
    cli::prompt_for_path, Cli, CrawlerError, ImageSizeCrawler, OutputFormatter, OutputMode,
    UserFriendlyError,
};
use std::io;
use std::path::PathBuf;
use std::process;

const DEFAULT_CONFIG_FILE: &str = "image-size-crawler.toml";

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let crawler = match ImageSizeCrawler::from_cli(&cli) {
        Ok(crawler) => crawler,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.workers_ignored() {
        crawler
            .output_formatter()
            .warning("--workers has no effect: this build measures images sequentially");
    }

    let root = match cli.path.clone() {
        Some(path) => path,
        None => match prompt_for_path(io::stdin().lock(), io::stdout()) {
            Ok(path) => path,
            Err(e) => {
                crawler.output_formatter().error(&format!("{:#}", e));
                return 1;
            }
        },
    };

    if cli.dry_run {
        return handle_dry_run(&crawler, &root);
    }

    let result = match cli.output_file {
        Some(ref output_file) => crawler.crawl_to(&root, output_file),
        None => crawler.crawl(&root),
    };

    match result {
        // Unreadable images are rows in the report, not a failed run
        Ok(report) => {
            crawler.output_formatter().print_scan_report(&report);
            0
        }
        Err(e) => {
            crawler.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn error_exit_code(error: &CrawlerError) -> i32 {
    match error {
        CrawlerError::InvalidPath { .. } | CrawlerError::NotADirectory { .. } => 3,
        CrawlerError::Traversal { .. } => 4,
        CrawlerError::Permission { .. } | CrawlerError::Csv(_) | CrawlerError::Io(_) => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match ImageSizeCrawler::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path.display());
            println!("\nTo use this configuration:");
            println!("  image-size-crawler <folder> --config {}", config_path.display());
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(crawler: &ImageSizeCrawler, root: &std::path::Path) -> i32 {
    let formatter = crawler.output_formatter();

    formatter.info("DRY RUN MODE - No report will be written");
    formatter.print_separator();

    let config = crawler.config();
    formatter.info("Configuration that would be used:");
    println!("  Extensions: {}", config.scan.extensions.join(", "));
    println!("  Case insensitive: {}", config.scan.case_insensitive);
    println!("  Follow links: {}", config.scan.follow_links);
    if let Some(depth) = config.scan.max_depth {
        println!("  Max depth: {}", depth);
    }
    if cfg!(feature = "parallel") {
        println!("  Workers: {}", config.scan.workers);
    } else {
        println!("  Workers: 1 (built without the parallel feature)");
    }
    println!("  Output directory: {}", config.output.directory.display());
    formatter.print_separator();

    match crawler.scan(root, None) {
        Ok(report) => {
            formatter.print_scan_report(&report);
            formatter.success("Dry run completed successfully");
            0
        }
        Err(e) => {
            crawler.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn print_startup_error(error: &CrawlerError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
