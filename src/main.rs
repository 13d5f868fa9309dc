use anyhow::Result;
use ultrachat::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
