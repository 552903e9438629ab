//! dirsearch - find files and directories by name, type and content.
//!
//! Entry point for the CLI application.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use dirsearch::{CancelToken, SearchConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dirsearch", version, about = "Search a directory tree by name, type and content")]
struct Args {
    /// Directory to search
    directory: PathBuf,

    /// Space-separated glob patterns to search for
    #[arg(long, default_value = "")]
    names: String,

    /// Space-separated glob patterns to exclude
    #[arg(long, default_value = ".git")]
    exclude_names: String,

    /// Include directories
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    directories: bool,

    /// Include files
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    files: bool,

    /// Text a file must contain
    #[arg(long, default_value = "")]
    text: String,

    /// Text a file must not contain (accepted, not applied)
    #[arg(long, default_value = "")]
    exclude_text: String,

    /// Print the settings before searching
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    print_settings: bool,

    /// Print a summary after searching
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    print_summary: bool,

    /// Number of content-scan workers
    #[arg(long, default_value_t = dirsearch::engine::DEFAULT_WORKERS)]
    workers: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose);

    let directory = std::path::absolute(&args.directory)
        .with_context(|| format!("Failed to get directory '{}'", args.directory.display()))?;

    let config = SearchConfig {
        include_names: space_separated(&args.names),
        exclude_names: space_separated(&args.exclude_names),
        include_directories: args.directories,
        include_files: args.files,
        include_text: non_empty(args.text),
        exclude_text: non_empty(args.exclude_text),
    };

    if args.print_settings {
        print_settings(&directory, &config);
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutdown received.");
        handler_token.cancel();
    })
    .context("Failed to set signal handler")?;

    let handle = dirsearch::search()
        .root(&directory)
        .config(config)
        .workers(args.workers)
        .cancel_token(cancel)
        .start()
        .context("Failed to start search")?;

    // Errors print from their own thread so neither stream waits on the other.
    let errors = handle.errors().clone();
    let error_printer = thread::spawn(move || {
        for err in errors.iter() {
            eprintln!("{err}");
        }
    });

    for path in handle.paths().iter() {
        println!("{}", path.display());
    }

    let done = handle.wait();
    let _ = error_printer.join();

    if let Err(e) = &done.status {
        if !e.is_cancelled() {
            eprintln!("Error: {e}");
        }
    }

    if args.print_summary {
        println!("{}", done.summary);
    }

    Ok(())
}

fn print_settings(directory: &std::path::Path, config: &SearchConfig) {
    println!("Directory: {}", directory.display());
    println!("Include Names: {:?}", config.include_names);
    println!("Exclude Names: {:?}", config.exclude_names);
    println!("Include Directories: {}", config.include_directories);
    println!("Include Files: {}", config.include_files);
    println!("Include Text: {}", config.include_text.as_deref().unwrap_or(""));
    println!("Exclude Text: {}", config.exclude_text.as_deref().unwrap_or(""));
}

fn space_separated(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_owned).collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dirsearch=debug,warn")
    } else {
        EnvFilter::new("dirsearch=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
