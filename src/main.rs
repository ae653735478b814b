use ambient_fx::{cli::Cli, diagnostics::init_file_logging};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_file_logging(path)?;
    }
    ambient_fx::run(cli).await
}
