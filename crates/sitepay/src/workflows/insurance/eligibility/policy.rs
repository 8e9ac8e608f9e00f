use super::super::domain::{CoverageStatus, ManualOverrides};
use super::rules::RuleFinding;
use super::InsuranceDecision;

/// Manual status codes always win over the automatic finding.
pub(crate) fn apply_overrides(
    findings: Vec<RuleFinding>,
    overrides: &ManualOverrides,
) -> Vec<InsuranceDecision> {
    findings
        .into_iter()
        .map(|finding| match overrides.get(finding.insurance) {
            Some(required) => InsuranceDecision {
                insurance: finding.insurance,
                required,
                status: CoverageStatus::manual(required),
                reason: manual_reason(overrides.reason.as_deref(), &finding.reason),
            },
            None => InsuranceDecision {
                insurance: finding.insurance,
                required: finding.required,
                status: CoverageStatus::automatic(finding.required),
                reason: finding.reason,
            },
        })
        .collect()
}

fn manual_reason(reason: Option<&str>, automatic: &str) -> String {
    match reason.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => format!("manual override: {text} (automatic: {automatic})"),
        None => format!("manual override (automatic: {automatic})"),
    }
}
