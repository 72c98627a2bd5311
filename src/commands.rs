//! The `download_bam` and `download_vcf` subcommands.

use crate::Result;
use crate::auth::Credentials;
use crate::client::Franklin;
use crate::config::{ConnectionArgs, DownloadArgs};
use crate::download::Downloader;
use std::path::{Path, PathBuf};

async fn connect(connection: &ConnectionArgs) -> Result<Franklin> {
    let credentials = Credentials::new(&connection.email, &connection.password);
    Franklin::connect_with(reqwest::Client::new(), &connection.base_uri, &credentials).await
}

/// Write one file per BAM-family file type of the analysis.
pub async fn download_bam(args: &DownloadArgs, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let franklin = connect(&args.connection).await?;
    let locations = franklin.get_analysis_bam(args.analysis_id).await?;
    tracing::info!(
        "analysis {} has {} BAM files",
        args.analysis_id,
        locations.len()
    );

    let downloader = Downloader::new(franklin.http_client().clone(), output_dir);
    downloader
        .download_all(
            locations
                .iter()
                .map(|(file_type, url)| (file_type.as_str(), url.as_str())),
        )
        .await
}

/// Write every VCF of the analysis; one type can map to several files.
pub async fn download_vcf(args: &DownloadArgs, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let franklin = connect(&args.connection).await?;
    let locations = franklin.get_analysis_vcf(args.analysis_id).await?;

    let downloader = Downloader::new(franklin.http_client().clone(), output_dir);
    downloader
        .download_all(locations.iter().flat_map(|(vcf_type, urls)| {
            urls.iter().map(move |url| (vcf_type.as_str(), url.as_str()))
        }))
        .await
}
