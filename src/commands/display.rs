//! Terminal rendering of analysis reports.

use console::{style, Color};

use crate::analyzer::{Report, ReportSection, RiskBand};

/// Nearest xterm-256 color to the band's indicator color
fn band_color(band: RiskBand) -> Color {
    let hex = band.color().trim_start_matches('#');
    let channel = |i: usize| {
        let value = hex
            .get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(0);
        (u16::from(value) * 5 + 127) / 255
    };
    let index = 16 + 36 * channel(0) + 6 * channel(2) + channel(4);
    Color::Color256(index as u8)
}

/// Format a report for the terminal, one block per section in report order
pub fn render_report(report: &Report) -> String {
    let mut lines = Vec::new();

    for section in &report.sections {
        lines.push(String::new());
        lines.push(style(section.heading()).bold().to_string());
        lines.push("-".repeat(40));

        match section {
            ReportSection::RiskAssessment { score, band, .. } => {
                lines.push(format!(
                    "  Score: {} ({} risk)",
                    style(format!("{}/100", score)).fg(band_color(*band)).bold(),
                    band.as_str()
                ));
            }
            ReportSection::Summary { text } | ReportSection::Narrative { text } => {
                lines.extend(text.lines().map(|l| format!("  {}", l)));
            }
            ReportSection::RedFlags { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    lines.push(format!("  {} {}", style(format!("{}.", i + 1)).red(), item.title));
                    if let Some(issue) = &item.issue {
                        lines.push(format!("     Issue: {}", issue));
                    }
                    if let Some(rec) = &item.recommendation {
                        lines.push(format!("     Recommendation: {}", rec));
                    }
                }
            }
            ReportSection::FairClauses { items, .. } => {
                for item in items {
                    lines.push(format!("  {} {}", style("✓").green(), item.title));
                    if let Some(rec) = &item.recommendation {
                        lines.push(format!("     {}", rec));
                    }
                }
            }
            ReportSection::Recommendations { items } => {
                lines.extend(items.iter().map(|r| format!("  • {}", r)));
            }
            ReportSection::HighRiskFindings { items } => {
                for finding in items {
                    lines.push(format!(
                        "  {} {}",
                        finding.term,
                        style(format!("-{} points", finding.deduction)).red()
                    ));
                    if !finding.explanation.trim().is_empty() {
                        lines.push(format!("     {}", finding.explanation));
                    }
                }
            }
            ReportSection::NegotiationStrategy { items } => {
                for (i, step) in items.iter().enumerate() {
                    lines.push(format!("  {}. {}", i + 1, step));
                }
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalysisResult, ReportRenderer};
    use serde_json::json;

    fn render(value: serde_json::Value) -> String {
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        console::strip_ansi_codes(&render_report(&ReportRenderer::render(&result))).into_owned()
    }

    #[test]
    fn test_minimal_report() {
        let out = render(json!({"riskScore": 25, "riskLabel": "Low Risk"}));
        assert!(out.contains("Risk Assessment: Low Risk"));
        assert!(out.contains("Score: 25/100 (low risk)"));
        assert!(!out.contains("Red Flags"));
    }

    #[test]
    fn test_sections_in_report_order() {
        let out = render(json!({
            "riskScore": 78,
            "riskLabel": "High Risk",
            "summary": "Several one-sided terms.",
            "redFlags": [{"title": "No notice period", "issue": "Landlord may evict at will"}],
            "recommendations": ["Ask for a 30 day notice clause"],
            "highRiskFindings": [{"term": "Forfeiture of deposit", "deduction": 15}]
        }));

        let positions: Vec<usize> = [
            "Risk Assessment",
            "Summary",
            "Red Flags (1)",
            "Recommendations",
            "High Risk Findings (1 vectors detected)",
        ]
        .iter()
        .map(|h| out.find(h).unwrap_or_else(|| panic!("missing {}", h)))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(out.contains("1. No notice period"));
        assert!(out.contains("Issue: Landlord may evict at will"));
        assert!(out.contains("Forfeiture of deposit -15 points"));
    }

    #[test]
    fn test_finding_explanations_shown() {
        let out = render(json!({
            "riskScore": 64,
            "highRiskFindings": [
                {"term": "Lock-in", "deduction": 6, "explanation": "11 month lock-in period"},
                {"term": "Entry", "deduction": 8, "explanation": "   "}
            ]
        }));

        assert!(out.contains("Lock-in -6 points"));
        assert!(out.contains("     11 month lock-in period"));
        assert!(out.contains("Entry -8 points"));
        assert!(!out.lines().any(|l| !l.is_empty() && l.trim().is_empty()));
    }

    #[test]
    fn test_band_colors_follow_indicator_palette() {
        assert!(matches!(band_color(RiskBand::High), Color::Color256(167)));
        assert!(matches!(band_color(RiskBand::Medium), Color::Color256(220)));
        assert!(matches!(band_color(RiskBand::Low), Color::Color256(71)));
    }
}
