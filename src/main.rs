use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use franklin::{
    Config,
    commands::{download_bam, download_vcf},
    config::Command,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let written = match &config.command {
        Command::DownloadBam(args) => download_bam(args, &config.output_dir).await?,
        Command::DownloadVcf(args) => download_vcf(args, &config.output_dir).await?,
    };

    tracing::info!("{} files written to {:?}", written.len(), config.output_dir);

    Ok(())
}
