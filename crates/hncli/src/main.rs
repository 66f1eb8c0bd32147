//! A command line client for browsing the Hacker News dataset.

#![warn(missing_debug_implementations, clippy::all)]

mod cli;
mod logging;
mod output;
mod scan;

#[tokio::main]
async fn main() {
    match cli::execute().await {
        Ok(()) => std::process::exit(0),
        Err(error) => {
            logging::ensure_log_error(&error);
            std::process::exit(1);
        }
    }
}
