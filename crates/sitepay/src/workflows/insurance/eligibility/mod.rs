mod config;
mod policy;
mod rules;

pub use config::EligibilityConfig;

use super::domain::{CoverageStatus, InsuranceType, ManualOverrides};
use crate::workflows::workforce::{WorkHistory, Worker, WorkerId, WorkerType, YearMonth};
use policy::apply_overrides;
use serde::{Deserialize, Serialize};

/// Monthly facts the rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub worker_id: WorkerId,
    pub worker_type: WorkerType,
    pub age: u32,
    pub monthly_wage: u64,
    pub work_days: u32,
    pub work_hours: f32,
    #[serde(default)]
    pub overrides: ManualOverrides,
}

/// Stateless classifier applying [`EligibilityConfig`] thresholds.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    config: EligibilityConfig,
}

impl EligibilityEngine {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn classify(&self, input: &EligibilityInput) -> EligibilityOutcome {
        let findings = rules::evaluate_rules(input, &self.config);
        let decisions = apply_overrides(findings, &input.overrides);

        EligibilityOutcome {
            worker_id: input.worker_id.clone(),
            decisions,
        }
    }

    /// Classifies the current month of `history`. Age is taken on the first day of the month.
    pub fn classify_history(
        &self,
        worker: &Worker,
        history: &WorkHistory,
        year_month: YearMonth,
        overrides: ManualOverrides,
    ) -> EligibilityOutcome {
        let input = EligibilityInput {
            worker_id: worker.id.clone(),
            worker_type: worker.worker_type,
            age: worker.age_on(year_month.first_day()),
            monthly_wage: history.current.wages,
            work_days: history.current.days,
            work_hours: history.current.hours,
            overrides,
        };
        self.classify(&input)
    }
}

/// Result for one insurance type, with the audit text that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceDecision {
    pub insurance: InsuranceType,
    pub required: bool,
    pub status: CoverageStatus,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub worker_id: WorkerId,
    pub decisions: Vec<InsuranceDecision>,
}

impl EligibilityOutcome {
    pub fn decision(&self, insurance: InsuranceType) -> Option<&InsuranceDecision> {
        self.decisions
            .iter()
            .find(|decision| decision.insurance == insurance)
    }

    pub fn is_required(&self, insurance: InsuranceType) -> bool {
        self.decision(insurance)
            .map(|decision| decision.required)
            .unwrap_or(false)
    }

    pub fn required_types(&self) -> Vec<InsuranceType> {
        self.decisions
            .iter()
            .filter(|decision| decision.required)
            .map(|decision| decision.insurance)
            .collect()
    }

    pub fn summary(&self) -> String {
        let required = self.required_types();
        if required.is_empty() {
            return "no insurance required".to_string();
        }
        let labels: Vec<&str> = required.iter().map(|kind| kind.label()).collect();
        format!("required: {}", labels.join(", "))
    }
}
