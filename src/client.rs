//! Franklin REST API client.
//!
//! Every public method maps to one endpoint under `{base_uri}/v1`. Methods
//! that document a field (`assays`, `variants`, ...) return that top-level
//! field of the JSON body; the others return the whole body. Any non-2xx
//! response is an [`Error::Http`], except `analysis/report` where 400 means
//! "no report yet".

use crate::auth::{Authenticator, Credentials, RequestSigner};
use crate::types::{
    AnalysesByAssay, AnalysisFilter, AnalysisId, AnalysisList, AnalysisParams, AssayList,
    BamLocations, OrgAssessments, OrgAssessmentsRequest, ParseSearchRequest, SearchParams,
    StatusRequest, VariantList, VariantOptions, VariantQuery, VariantType, VcfLocations,
};
use crate::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// API version segment appended to the service base URI
pub const API_VERSION: &str = "v1";

/// Report format requested when none is given
pub const DEFAULT_REPORT_FORMAT: &str = "pdf";

/// Franklin API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the signer.
#[derive(Clone)]
pub struct Franklin {
    http: Client,
    api_root: String,
    signer: Arc<dyn RequestSigner>,
}

impl Franklin {
    /// Log in with `email`/`password` and return a ready client.
    ///
    /// # Arguments
    ///
    /// * `base_uri` - Base URI of the Franklin server, without the version
    ///   segment (e.g. "https://franklin.genoox.com/api")
    pub async fn connect(base_uri: &str, email: &str, password: &str) -> Result<Self> {
        Self::connect_with(Client::new(), base_uri, &Credentials::new(email, password)).await
    }

    /// Like [`Franklin::connect`], reusing a preconfigured HTTP client.
    pub async fn connect_with(
        http: Client,
        base_uri: &str,
        credentials: &Credentials,
    ) -> Result<Self> {
        let api_root = Self::api_root(base_uri)?;
        let auth = Authenticator::login(&http, &api_root, credentials).await?;

        Ok(Self {
            http,
            api_root,
            signer: Arc::new(auth),
        })
    }

    /// Build a client around an existing signer without logging in.
    pub fn with_signer(base_uri: &str, signer: Arc<dyn RequestSigner>) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            api_root: Self::api_root(base_uri)?,
            signer,
        })
    }

    fn api_root(base_uri: &str) -> Result<String> {
        let base_uri = base_uri.trim_end_matches('/');
        Url::parse(base_uri)?;
        Ok(format!("{}/{}", base_uri, API_VERSION))
    }

    /// The versioned root every endpoint path is resolved against.
    pub fn api_uri(&self) -> &str {
        &self.api_root
    }

    /// HTTP client shared with this API client, also usable for signed URLs.
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    /// List all assays of the organization (`assays` field).
    pub async fn list_assays(&self) -> Result<Vec<Value>> {
        let list: AssayList = self.fetch(self.request(Method::GET, "assay/list")).await?;
        Ok(list.assays)
    }

    /// List analysis ids per assay (`analyses_by_assay` field).
    pub async fn list_analyses(&self, filter: &AnalysisFilter) -> Result<AnalysesByAssay> {
        let list: AnalysisList = self
            .fetch(self.request(Method::GET, "analyses/list").query(filter))
            .await?;
        Ok(list.analyses_by_assay)
    }

    /// Status records for the given analyses, as returned by the service.
    pub async fn get_analysis_status(&self, analysis_ids: &[AnalysisId]) -> Result<Vec<Value>> {
        self.fetch(
            self.request(Method::POST, "analyses/status")
                .json(&StatusRequest { analysis_ids }),
        )
        .await
    }

    /// QC metrics of an analysis, whole body.
    pub async fn get_analysis_qc_metrics(&self, analysis_id: AnalysisId) -> Result<Value> {
        self.get_analysis("analysis/qc_metrics", analysis_id).await
    }

    /// The analysis report, or `None` while the service has none to give.
    ///
    /// The service answers 400 for analyses without a report; any other
    /// failure status is still an error.
    pub async fn get_analysis_report(&self, analysis_id: AnalysisId) -> Result<Option<Value>> {
        match self.get_analysis("analysis/report", analysis_id).await {
            Ok(report) => Ok(Some(report)),
            Err(Error::Http { status, .. }) if status == StatusCode::BAD_REQUEST => {
                tracing::debug!("no report available for analysis {}", analysis_id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Signed storage URL of the rendered report, whole body.
    ///
    /// `format` defaults to [`DEFAULT_REPORT_FORMAT`].
    pub async fn get_analysis_signed_report_file(
        &self,
        analysis_id: AnalysisId,
        format: Option<&str>,
    ) -> Result<Value> {
        let params = AnalysisParams {
            analysis_id,
            format: Some(format.unwrap_or(DEFAULT_REPORT_FORMAT)),
        };
        self.fetch(
            self.request(Method::GET, "analysis/signed_report_file")
                .query(&params),
        )
        .await
    }

    /// Signed VCF URLs grouped by VCF type.
    pub async fn get_analysis_vcf(&self, analysis_id: AnalysisId) -> Result<VcfLocations> {
        self.get_analysis("analysis/vcf_location", analysis_id).await
    }

    /// Signed BAM-family URLs keyed by file type.
    pub async fn get_analysis_bam(&self, analysis_id: AnalysisId) -> Result<BamLocations> {
        self.get_analysis("analysis/bam_location", analysis_id).await
    }

    /// Variants of one family (`variants` field).
    ///
    /// `variant_type` must be "snp" or "sv"; anything else fails with
    /// [`Error::InvalidInput`] before a request is made.
    pub async fn get_analysis_variants(
        &self,
        variant_type: &str,
        analysis_id: AnalysisId,
    ) -> Result<Value> {
        let variant_type: VariantType = variant_type.parse()?;
        let endpoint = format!("analysis/variants/{}", variant_type);
        let list: VariantList = self.get_analysis(&endpoint, analysis_id).await?;
        Ok(list.variants)
    }

    /// Organization assessments for the given variants
    /// (`variants_assessments` field).
    pub async fn get_variant_org_assessments(&self, variants: &[VariantQuery]) -> Result<Value> {
        let assessments: OrgAssessments = self
            .fetch(
                self.request(Method::POST, "variant/org_assessments")
                    .json(&OrgAssessmentsRequest { variants }),
            )
            .await?;
        Ok(assessments.variants_assessments)
    }

    /// Search a variant in any nomenclature the service understands
    /// (c.dot, p.dot, chromosome and position, ...). Returns the
    /// `variant_options` field.
    pub async fn search_variant(&self, search_text: &str) -> Result<Value> {
        let options: VariantOptions = self
            .fetch(
                self.request(Method::GET, "variant/search")
                    .query(&SearchParams { search_text }),
            )
            .await?;
        Ok(options.variant_options)
    }

    /// Parse free search text into a variant, whole body.
    pub async fn parse_variant(&self, search_text_input: &str) -> Result<Value> {
        self.fetch(
            self.request(Method::POST, "parse_search")
                .json(&ParseSearchRequest { search_text_input }),
        )
        .await
    }

    async fn get_analysis<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        analysis_id: AnalysisId,
    ) -> Result<T> {
        self.fetch(
            self.request(Method::GET, endpoint)
                .query(&AnalysisParams::new(analysis_id)),
        )
        .await
    }

    /// Start a signed request against `{api_root}/{endpoint}`.
    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.api_root, endpoint);
        tracing::debug!("{} {}", method, url);
        self.signer.sign(self.http.request(method, url))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            tracing::debug!("{} returned {}", url, status);
            return Err(Error::Http { status, url });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl std::fmt::Debug for Franklin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Franklin")
            .field("api_root", &self.api_root)
            .finish_non_exhaustive()
    }
}
