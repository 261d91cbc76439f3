use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    search_debugger_cli::cli::app::run().await
}
