use clap::Parser;
use dotenvy::dotenv;
use vitrine::cli::{Cli, run};
use vitrine::logging::init_cli_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_cli_tracing();

    run(Cli::parse()).await
}
