//! Shared types for the lease analysis exchange
//!
//! The service speaks camelCase JSON and only `ratingScore` is expected on every
//! response. Everything else is optional and may be missing, `null`, or loosely
//! typed (floats for integers, bare strings for red flags).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Analysis report returned by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall risk score (0-100)
    #[serde(
        rename = "ratingScore",
        alias = "riskScore",
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_score: Option<u8>,

    /// Short risk label, e.g. "High Risk"
    #[serde(
        rename = "ratingText",
        alias = "riskLabel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_label: Option<String>,

    #[serde(
        rename = "shortSummary",
        alias = "summary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_flags: Option<Vec<RedFlag>>,

    /// Count reported by the service; may differ from `red_flags.len()`
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub red_flags_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_clauses: Option<Vec<FairClause>>,

    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub fair_clauses_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,

    /// Full narrative analysis
    #[serde(
        rename = "aiSummary",
        alias = "narrativeSummary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub narrative_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_risk_findings: Option<Vec<HighRiskFinding>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negotiation_strategy: Option<Vec<String>>,
}

impl AnalysisResult {
    /// Result carrying only a score
    pub fn with_score(score: u8) -> Self {
        Self {
            risk_score: Some(score.min(100)),
            ..Default::default()
        }
    }
}

/// Potentially unfair clause
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawRedFlag")]
pub struct RedFlag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Red flags arrive either as objects or as bare issue strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRedFlag {
    Plain(String),
    Detailed {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        issue: Option<String>,
        #[serde(default)]
        recommendation: Option<String>,
    },
}

impl From<RawRedFlag> for RedFlag {
    fn from(raw: RawRedFlag) -> Self {
        match raw {
            RawRedFlag::Plain(issue) => RedFlag {
                issue: Some(issue),
                ..Default::default()
            },
            RawRedFlag::Detailed {
                title,
                issue,
                recommendation,
            } => RedFlag {
                title,
                issue,
                recommendation,
            },
        }
    }
}

/// Clause judged fair to the tenant
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawFairClause")]
pub struct FairClause {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFairClause {
    Plain(String),
    Detailed {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        recommendation: Option<String>,
    },
}

impl From<RawFairClause> for FairClause {
    fn from(raw: RawFairClause) -> Self {
        match raw {
            RawFairClause::Plain(title) => FairClause {
                title: Some(title),
                recommendation: None,
            },
            RawFairClause::Detailed {
                title,
                recommendation,
            } => FairClause {
                title,
                recommendation,
            },
        }
    }
}

/// One hit from the risk-vector analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskFinding {
    #[serde(default)]
    pub term: String,
    /// Points deducted from the score
    #[serde(default, deserialize_with = "lenient_deduction")]
    pub deduction: i64,
    #[serde(default)]
    pub explanation: String,
}

/// Body of a failed request: `{"error": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ServiceErrorBody {
    /// First non-blank message the service supplied
    pub fn into_message(self) -> Option<String> {
        self.error
            .into_iter()
            .chain(self.message)
            .find(|m| !m.trim().is_empty())
    }
}

/// Response of the health endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Integer view of a JSON number (floats are rounded, strings parsed)
fn number_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_as_i64)
        .map(|n| n.clamp(0, 100) as u8))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_as_i64)
        .filter(|n| *n >= 0)
        .map(|n| n as usize))
}

fn lenient_deduction<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_as_i64).unwrap_or(0))
}
