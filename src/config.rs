use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::AnalysisId;

#[derive(Debug, Clone, Parser)]
#[command(name = "franklin")]
#[command(about = "Franklin API client interface")]
pub struct Config {
    /// Directory downloaded files are written to
    #[arg(long, global = true, env = "FRANKLIN_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download analysis BAM file
    #[command(name = "download_bam")]
    DownloadBam(DownloadArgs),

    /// Download all analysis VCF files
    #[command(name = "download_vcf")]
    DownloadVcf(DownloadArgs),
}

/// How to reach and log in to the Franklin server
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Base uri for the Franklin server
    #[arg(env = "FRANKLIN_BASE_URI")]
    pub base_uri: String,

    /// Franklin username
    #[arg(env = "FRANKLIN_EMAIL")]
    pub email: String,

    /// Franklin password
    #[arg(env = "FRANKLIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Analysis id
    pub analysis_id: AnalysisId,
}
