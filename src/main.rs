// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (progress and errors go to stderr)
// 3. Crawl the website
// 4. Print the URLs we found
// 5. Exit with proper code (0 = success, 1 = a page failed, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing

use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use site_crawler::{crawl_with_settings, CrawlResult};
use tracing_subscriber::EnvFilter;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run our application logic and capture the exit code
    // std::process::exit() terminates the program with the given code
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Sends tracing output to stderr, with colors when it's a terminal
//
// RUST_LOG overrides the level, e.g. RUST_LOG=site_crawler=debug
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "site_crawler=debug,warn"
    } else {
        "site_crawler=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// This is the main application logic
// Returns:
//   Ok(0) = every page crawled fine
//   Ok(1) = at least one page failed (the list is still printed)
//   Err = unexpected error
async fn run(cli: Cli) -> Result<i32> {
    println!(
        "Crawling URL: \"{}\" to a depth of {} links",
        cli.url, cli.depth
    );

    let result = crawl_with_settings(&cli.url, cli.depth, cli.settings()).await;

    print_results(&result, cli.json)?;

    match &result.error {
        Some(err) => {
            eprintln!("ERROR: {}", err);
            Ok(1)
        }
        None => Ok(0),
    }
}

// Prints the results either as a numbered list or JSON
fn print_results(result: &CrawlResult, json: bool) -> Result<()> {
    if json {
        // Serialize results to JSON and print
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print_list(&result.urls);
    }
    Ok(())
}

// Prints one line per URL: "001. https://example.com/"
fn print_list(urls: &[String]) {
    println!("Links");
    println!("-----");
    for (i, url) in urls.iter().enumerate() {
        println!("{:03}. {}", i + 1, url);
    }
    println!();
}
