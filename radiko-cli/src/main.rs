mod cli;

use clap::Parser;
use radiko::Client;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[tokio::main]
async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut client = Client::new()?;
    let session = client.authorize().await?;
    info!(area = %session.area_id, "authorized");

    let manifest = match args.command {
        Command::Live { id } => client.resolve(&id, None).await?,
        Command::Timeshift { id, at } => {
            let at = radiko::time::parse_datetime(&at)?;
            client.resolve(&id, Some(at)).await?
        }
    };

    // The manifest URI is the whole output; hand it to a player.
    println!("{manifest}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
