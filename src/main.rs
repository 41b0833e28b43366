//! # chatdoc
//!
//! Command-line front end: renders a markdown answer (file or stdin) to HTML,
//! JSON, plain text or normalized markdown, and optionally copies the raw
//! input to the clipboard.

mod cli;
mod run;

use clap::Parser;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = cli::Args::parse();
    run::init_logger(&args);

    // Exit with Display, not Debug, on bad configuration
    let config = chatdoc::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    run::run(&args, &config).await
}
