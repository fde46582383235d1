use serde::Serialize;

use super::currency::CurrencyFormatter;
use super::types::ScenarioResult;

pub const SUMMARY_TITLE: &str = "Simulation Result Summary";
pub const TOTAL_SAVINGS_LABEL: &str = "Total Retirement Savings";
pub const DEPLETION_AGE_LABEL: &str = "Estimated Funds Depletion Age";
/// Shown when the funds outlast the modeled horizon.
pub const NEVER_DEPLETED_LABEL: &str = "90+";
pub const MESSAGE_BULLET: &str = "➢";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineStat {
    pub value: String,
    pub label: &'static str,
}

/// View-model for the textual part of a simulation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSummary {
    pub title: &'static str,
    pub total_savings: HeadlineStat,
    pub depletion_age: HeadlineStat,
    pub messages: Vec<String>,
}

impl RenderedSummary {
    /// Plain-text layout for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(self.title);
        out.push('\n');
        for stat in [&self.total_savings, &self.depletion_age] {
            out.push_str(&format!("  {}: {}\n", stat.label, stat.value));
        }
        for message in &self.messages {
            out.push_str(&format!("  {message}\n"));
        }
        out
    }
}

pub fn render_summary(result: &ScenarioResult) -> RenderedSummary {
    let depletion = match result.retirement_funds_depletion_age {
        Some(age) => age.to_string(),
        None => NEVER_DEPLETED_LABEL.to_string(),
    };

    RenderedSummary {
        title: SUMMARY_TITLE,
        total_savings: HeadlineStat {
            value: CurrencyFormatter::SGD.format(Some(result.total_retirement_savings), true),
            label: TOTAL_SAVINGS_LABEL,
        },
        depletion_age: HeadlineStat {
            value: depletion,
            label: DEPLETION_AGE_LABEL,
        },
        messages: result
            .summary
            .iter()
            .map(|msg| format!("{MESSAGE_BULLET} {msg}"))
            .collect(),
    }
}
