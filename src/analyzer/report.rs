//! Report rendering
//!
//! Turns a loosely-structured `AnalysisResult` into an ordered list of display
//! sections. Section order is fixed; every optional section is omitted when its
//! field is absent or empty. Rendering never fails.

use super::types::{AnalysisResult, FairClause, HighRiskFinding, RedFlag};
use serde::Serialize;

/// Label used when the service did not supply one
pub const DEFAULT_RISK_LABEL: &str = "N/A";

/// Risk band derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Scores at or above this are high risk
    pub const HIGH_THRESHOLD: u8 = 70;
    /// Scores at or above this (and below high) are medium risk
    pub const MEDIUM_THRESHOLD: u8 = 40;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Indicator color shared by the headline and the score bar
    pub fn color(&self) -> &'static str {
        match self {
            Self::High => "#dc3545",
            Self::Medium => "#ffc107",
            Self::Low => "#28a745",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Section identity, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    RiskAssessment,
    Summary,
    RedFlags,
    FairClauses,
    Recommendations,
    Narrative,
    HighRiskFindings,
    NegotiationStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedFlagItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairClauseItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingItem {
    pub term: String,
    /// Points deducted, shown as "-N points"
    pub deduction: i64,
    pub explanation: String,
}

/// One displayable block of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum ReportSection {
    RiskAssessment {
        score: u8,
        label: String,
        band: RiskBand,
    },
    Summary {
        text: String,
    },
    RedFlags {
        /// Explicit count from the service when present, else the list length
        count: usize,
        items: Vec<RedFlagItem>,
    },
    FairClauses {
        count: usize,
        items: Vec<FairClauseItem>,
    },
    Recommendations {
        items: Vec<String>,
    },
    Narrative {
        text: String,
    },
    HighRiskFindings {
        items: Vec<FindingItem>,
    },
    NegotiationStrategy {
        items: Vec<String>,
    },
}

impl ReportSection {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::RiskAssessment { .. } => SectionKind::RiskAssessment,
            Self::Summary { .. } => SectionKind::Summary,
            Self::RedFlags { .. } => SectionKind::RedFlags,
            Self::FairClauses { .. } => SectionKind::FairClauses,
            Self::Recommendations { .. } => SectionKind::Recommendations,
            Self::Narrative { .. } => SectionKind::Narrative,
            Self::HighRiskFindings { .. } => SectionKind::HighRiskFindings,
            Self::NegotiationStrategy { .. } => SectionKind::NegotiationStrategy,
        }
    }

    pub fn heading(&self) -> String {
        match self {
            Self::RiskAssessment { label, .. } => format!("Risk Assessment: {}", label),
            Self::Summary { .. } => "Summary".to_string(),
            Self::RedFlags { count, .. } => format!("Red Flags ({})", count),
            Self::FairClauses { count, .. } => format!("Fair Clauses ({})", count),
            Self::Recommendations { .. } => "Recommendations".to_string(),
            Self::Narrative { .. } => "AI Analysis".to_string(),
            Self::HighRiskFindings { items } => {
                format!("High Risk Findings ({} vectors detected)", items.len())
            }
            Self::NegotiationStrategy { .. } => "Negotiation Strategy".to_string(),
        }
    }
}

/// Rendered report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub score: u8,
    pub band: RiskBand,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(ReportSection::kind).collect()
    }
}

/// Derives report sections from an analysis result
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn render(result: &AnalysisResult) -> Report {
        let score = result.risk_score.unwrap_or(0).min(100);
        let band = RiskBand::from_score(score);
        let label = non_blank(result.risk_label.as_deref())
            .unwrap_or(DEFAULT_RISK_LABEL)
            .to_string();

        let mut sections = vec![ReportSection::RiskAssessment { score, label, band }];

        if let Some(text) = non_blank(result.summary.as_deref()) {
            sections.push(ReportSection::Summary {
                text: text.to_string(),
            });
        }

        if let Some(flags) = non_empty(&result.red_flags) {
            sections.push(ReportSection::RedFlags {
                count: result.red_flags_count.unwrap_or(flags.len()),
                items: flags.iter().enumerate().map(red_flag_item).collect(),
            });
        }

        if let Some(clauses) = non_empty(&result.fair_clauses) {
            sections.push(ReportSection::FairClauses {
                count: result.fair_clauses_count.unwrap_or(clauses.len()),
                items: clauses.iter().enumerate().map(fair_clause_item).collect(),
            });
        }

        if let Some(items) = non_empty(&result.recommendations) {
            sections.push(ReportSection::Recommendations {
                items: items.to_vec(),
            });
        }

        if let Some(text) = non_blank(result.narrative_summary.as_deref()) {
            sections.push(ReportSection::Narrative {
                text: text.to_string(),
            });
        }

        if let Some(findings) = non_empty(&result.high_risk_findings) {
            sections.push(ReportSection::HighRiskFindings {
                items: findings.iter().map(finding_item).collect(),
            });
        }

        if let Some(items) = non_empty(&result.negotiation_strategy) {
            sections.push(ReportSection::NegotiationStrategy {
                items: items.to_vec(),
            });
        }

        Report {
            score,
            band,
            sections,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Absent and empty lists are treated the same
fn non_empty<T>(list: &Option<Vec<T>>) -> Option<&[T]> {
    list.as_deref().filter(|l| !l.is_empty())
}

fn red_flag_item((index, flag): (usize, &RedFlag)) -> RedFlagItem {
    RedFlagItem {
        title: titled(flag.title.as_deref(), "Red Flag", index),
        issue: flag.issue.clone(),
        recommendation: flag.recommendation.clone(),
    }
}

fn fair_clause_item((index, clause): (usize, &FairClause)) -> FairClauseItem {
    FairClauseItem {
        title: titled(clause.title.as_deref(), "Fair Clause", index),
        recommendation: clause.recommendation.clone(),
    }
}

fn finding_item(finding: &HighRiskFinding) -> FindingItem {
    FindingItem {
        term: finding.term.clone(),
        deduction: finding.deduction,
        explanation: finding.explanation.clone(),
    }
}

fn titled(title: Option<&str>, fallback: &str, index: usize) -> String {
    match non_blank(title) {
        Some(title) => title.to_string(),
        None => format!("{} {}", fallback, index + 1),
    }
}
