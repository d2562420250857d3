use anyhow::{Context, Result};
use clap::Parser;
use sitedex_core::FileConfig;
use sitedex_mcp::cli::Cli;
use sitedex_mcp::logging::initialize_logging;
use sitedex_mcp::settings::{Environment, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    if let Err(e) = execute(&cli).await {
        tracing::error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

async fn execute(cli: &Cli) -> Result<()> {
    let file = FileConfig::load(cli.config.as_deref()).context("failed to load config file")?;
    let settings = Settings::resolve(cli, file, Environment::from_process())
        .context("invalid configuration")?;

    tracing::info!(
        source = settings.site.source.kind(),
        tool = %settings.tool_name,
        resources = settings.resources,
        "starting sitedex-mcp"
    );

    sitedex_mcp::run(settings).await?;
    Ok(())
}
