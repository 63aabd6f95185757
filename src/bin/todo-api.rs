//! Todo API server binary.
//!
//! Parses the configuration and hands it to the API layer; any startup
//! failure ends the process with a diagnostic and a non-zero exit code.

use clap::Parser;
use todo_api::api;
use todo_api::config::Config;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = Config::parse();
    api::run(config).await?;
    Ok(())
}
