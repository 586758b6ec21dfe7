mod commands;
mod config;
mod main_lib;

use commands::{run, Command};
use config::Config;
use main_lib::{build_client, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    let client = build_client(&config)?;
    run(command, client).await
}
