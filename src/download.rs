//! Streaming download of signed storage URLs.
//!
//! Signed URLs carry their own authorization in the query string, so they
//! are fetched with a plain HTTP client and never get the API bearer header.

use crate::{Error, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Local file name for a signed storage URL: the last path segment, query
/// string dropped.
///
/// `https://host/path/to/file.bam?X-Amz-Algorithm=...` gives `file.bam`.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidInput(format!(
            "no file name in url path: {}",
            parsed.path()
        )));
    }

    Ok(name.to_string())
}

/// Writes signed URLs to files in one output directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(client: Client, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download one URL and return the path written.
    ///
    /// The file is only created once the server has answered with a success
    /// status. The body is copied chunk by chunk, never held in memory whole.
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        let path = self.output_dir.join(&file_name);

        // reqwest errors embed the request url, signature included.
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            // Signed URLs embed credentials in the query string.
            return Err(Error::Http {
                status,
                url: strip_query(url),
            });
        }

        let mut file = fs::File::create(&path).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Transport(e.without_url()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!("downloaded {} ({} bytes)", path.display(), written);
        Ok(path)
    }

    /// Download every `(file_type, url)` pair in order, stopping at the first
    /// failure.
    pub async fn download_all<'a, I>(&self, locations: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut paths = Vec::new();
        for (file_type, url) in locations {
            tracing::info!("downloading {} file {}", file_type, strip_query(url));
            paths.push(self.download(url).await?);
        }
        Ok(paths)
    }
}

fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_file_name_from_aws_url() {
        let name = file_name_from_url(
            "https://server.amazonaws.com/path/to/bam/123__950-dragen-ready.bam?X-Amz-Algorithm=AWS4-HMAC-SHA256",
        )
        .unwrap();
        assert_eq!(name, "123__950-dragen-ready.bam");
    }

    #[test]
    fn test_file_name_without_query() {
        assert_eq!(
            file_name_from_url("https://host/path/to/file.vcf.gz").unwrap(),
            "file.vcf.gz"
        );
    }

    #[test]
    fn test_file_name_missing() {
        let err = file_name_from_url("https://host/path/to/?sig=1").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = file_name_from_url("https://host").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_file_name_not_a_url() {
        let err = file_name_from_url("path/to/file.bam").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://host/a.bam?X-Amz-Signature=secret"),
            "https://host/a.bam"
        );
        assert_eq!(strip_query("https://host/a.bam"), "https://host/a.bam");
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..=255u8).cycle().take(256 * 1024).collect();
        Mock::given(method("GET"))
            .and(path("/bucket/sample.bam"))
            .and(query_param("X-Amz-Signature", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(Client::new(), dir.path());
        let url = format!("{}/bucket/sample.bam?X-Amz-Signature=abc", server.uri());

        let written = downloader.download(&url).await.unwrap();

        assert_eq!(written, dir.path().join("sample.bam"));
        assert_eq!(std::fs::read(&written).unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_error_creates_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/expired.bam"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(Client::new(), dir.path());
        let url = format!("{}/bucket/expired.bam?X-Amz-Signature=secret", server.uri());

        let err = downloader.download(&url).await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::FORBIDDEN));
        assert!(!err.to_string().contains("secret"));
        assert!(!dir.path().join("expired.bam").exists());
    }

    #[tokio::test]
    async fn test_connection_error_hides_signature() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(Client::new(), dir.path());

        let err = downloader
            .download("http://127.0.0.1:1/bucket/a.bam?X-Amz-Signature=supersecret")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(!err.to_string().contains("supersecret"));
        assert!(!format!("{:?}", err).contains("supersecret"));
        assert!(!dir.path().join("a.bam").exists());
    }

    #[tokio::test]
    async fn test_download_all_stops_at_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/a.vcf.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/b.vcf.gz"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/c.vcf.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("c"))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(Client::new(), dir.path());
        let urls: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|n| format!("{}/bucket/{}.vcf.gz", server.uri(), n))
            .collect();

        let result = downloader
            .download_all(urls.iter().map(|u| ("vcf", u.as_str())))
            .await;

        assert!(result.is_err());
        assert!(dir.path().join("a.vcf.gz").exists());
        assert!(!dir.path().join("c.vcf.gz").exists());
    }
}
