/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use clap::Parser;
use venue_cli::opt::VenueCli;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt::init();
    if let Err(e) = venue_cli::run(VenueCli::parse()).await {
        tracing::error!(error = %e, "venue-cli exited with an error");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
