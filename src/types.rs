use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Numeric analysis identifier as used by the Franklin API
pub type AnalysisId = u64;

/// Analysis ids grouped by the assay they belong to
pub type AnalysesByAssay = BTreeMap<String, Vec<AnalysisId>>;

/// VCF type -> signed URLs, one type may carry several files
pub type VcfLocations = BTreeMap<String, Vec<String>>;

/// BAM-family file type (bam, bai, ...) -> signed URL
pub type BamLocations = BTreeMap<String, String>;

/// Analysis lifecycle states accepted by the `status` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Active,
    Suspended,
    Resolved,
    Creating,
}

/// Optional filters for `analyses/list`. Unset filters are left out of the
/// query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisFilter {
    /// Partial match on the analysis name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AnalysisStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assay_id: Option<String>,
}

impl AnalysisFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.analysis_name = Some(name.into());
        self
    }

    pub fn status(mut self, status: AnalysisStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn created_before(mut self, date: NaiveDate) -> Self {
        self.created_before = Some(date);
        self
    }

    pub fn created_after(mut self, date: NaiveDate) -> Self {
        self.created_after = Some(date);
        self
    }

    pub fn assay(mut self, assay_id: impl Into<String>) -> Self {
        self.assay_id = Some(assay_id.into());
        self
    }
}

/// Variant families exposed by `analysis/variants/{type}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantType {
    Snp,
    Sv,
}

impl VariantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Snp => "snp",
            VariantType::Sv => "sv",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snp" => Ok(VariantType::Snp),
            "sv" => Ok(VariantType::Sv),
            other => Err(Error::InvalidInput(format!(
                "unsupported variant type {:?}, expected \"snp\" or \"sv\"",
                other
            ))),
        }
    }
}

/// A single variant to look up in `variant/org_assessments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantQuery {
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub alternative: String,
    /// Reference genome build, e.g. "hg19"
    pub reference_version: String,
}

// Query strings

#[derive(Debug, Serialize)]
pub(crate) struct AnalysisParams<'a> {
    pub analysis_id: AnalysisId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'a str>,
}

impl AnalysisParams<'_> {
    pub fn new(analysis_id: AnalysisId) -> Self {
        Self {
            analysis_id,
            format: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginParams<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchParams<'a> {
    pub search_text: &'a str,
}

// Request bodies

#[derive(Debug, Serialize)]
pub(crate) struct StatusRequest<'a> {
    pub analysis_ids: &'a [AnalysisId],
}

#[derive(Debug, Serialize)]
pub(crate) struct OrgAssessmentsRequest<'a> {
    pub variants: &'a [VariantQuery],
}

#[derive(Debug, Serialize)]
pub(crate) struct ParseSearchRequest<'a> {
    pub search_text_input: &'a str,
}

// Response envelopes: each names the single top-level field an operation
// extracts, so a missing field surfaces as a decode error.

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssayList {
    pub assays: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisList {
    pub analyses_by_assay: AnalysesByAssay,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantList {
    pub variants: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrgAssessments {
    pub variants_assessments: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantOptions {
    pub variant_options: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_string<T: Serialize>(params: &T) -> Option<String> {
        reqwest::Client::new()
            .get("https://franklin.test/v1/analyses/list")
            .query(params)
            .build()
            .unwrap()
            .url()
            .query()
            .map(str::to_string)
    }

    #[test]
    fn test_variant_type_parse() {
        assert_eq!("snp".parse::<VariantType>().unwrap(), VariantType::Snp);
        assert_eq!("sv".parse::<VariantType>().unwrap(), VariantType::Sv);
    }

    #[test]
    fn test_variant_type_rejects_unknown() {
        for bad in ["cnv", "SNP", "", "snp "] {
            let err = bad.parse::<VariantType>().unwrap_err();
            assert!(err.is_validation(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_variant_type_display() {
        assert_eq!(VariantType::Snp.to_string(), "snp");
        assert_eq!(VariantType::Sv.to_string(), "sv");
    }

    #[test]
    fn test_empty_filter_sends_no_query() {
        assert_eq!(query_string(&AnalysisFilter::new()), None);
    }

    #[test]
    fn test_filter_query_string() {
        let filter = AnalysisFilter::new()
            .name("Demo")
            .status(AnalysisStatus::Active)
            .created_after(NaiveDate::from_ymd_opt(2018, 10, 1).unwrap())
            .created_before(NaiveDate::from_ymd_opt(2018, 10, 31).unwrap());

        assert_eq!(
            query_string(&filter).as_deref(),
            Some(
                "analysis_name=Demo&status=active&created_before=2018-10-31&created_after=2018-10-01"
            )
        );
    }

    #[test]
    fn test_filter_by_assay_only() {
        let filter = AnalysisFilter::new().assay("620434fa-e367-425a");
        assert_eq!(
            query_string(&filter).as_deref(),
            Some("assay_id=620434fa-e367-425a")
        );
    }

    #[test]
    fn test_report_file_params() {
        let params = AnalysisParams {
            analysis_id: 42,
            format: Some("pdf"),
        };
        assert_eq!(
            query_string(&params).as_deref(),
            Some("analysis_id=42&format=pdf")
        );
        assert_eq!(
            query_string(&AnalysisParams::new(42)).as_deref(),
            Some("analysis_id=42")
        );
    }

    #[test]
    fn test_variant_query_serialization() {
        let variant = VariantQuery {
            chromosome: "chr7".to_string(),
            position: 117559590,
            reference: "ATCT".to_string(),
            alternative: "A".to_string(),
            reference_version: "hg38".to_string(),
        };
        let body = serde_json::to_value(OrgAssessmentsRequest {
            variants: std::slice::from_ref(&variant),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "variants": [{
                    "chromosome": "chr7",
                    "position": 117559590,
                    "reference": "ATCT",
                    "alternative": "A",
                    "reference_version": "hg38"
                }]
            })
        );
    }

    #[test]
    fn test_missing_envelope_field_is_decode_error() {
        let result = serde_json::from_str::<AssayList>(r#"{"items": []}"#);
        assert!(result.is_err());
    }
}
