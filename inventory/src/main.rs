//! API inventory CLI Entry Point

use api_inventory::cli::{self, Cli};
use api_inventory::{logging, InventoryContext};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = cli.client_config();
    let context = match InventoryContext::from_config(&config) {
        Ok(context) => context,
        Err(e) => {
            error!("Invalid client configuration: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::execute(&context, cli.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
