use serde::{Deserialize, Serialize};

/// Payload posted to the simulation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub current_age: u32,
    pub retirement_age: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub investment_strategy: String,
    pub retirement_investment_strategy: String,
    pub investment_increase: f64,
    pub career_switch_impact: f64,
    pub career_switch_age: u32,
    pub purchase_amount: f64,
    pub purchase_age: u32,
}

/// One year of the projected trajectory.
///
/// The service also sends per-year breakdown fields (income, expenses,
/// returns); those are ignored here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePoint {
    pub age: u32,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub total_retirement_savings: f64,
    #[serde(default)]
    pub retirement_funds_depletion_age: Option<u32>,
    pub summary: Vec<String>,
    pub working_phase: Vec<PhasePoint>,
    pub retirement_phase: Vec<PhasePoint>,
}

impl ScenarioResult {
    /// Index of the last working-year point, or `None` when there is no
    /// working phase at all.
    pub fn retirement_index(&self) -> Option<usize> {
        self.working_phase.len().checked_sub(1)
    }

    /// Working years followed by retirement years.
    pub fn points(&self) -> impl Iterator<Item = &PhasePoint> {
        self.working_phase.iter().chain(self.retirement_phase.iter())
    }

    pub fn point_count(&self) -> usize {
        self.working_phase.len() + self.retirement_phase.len()
    }

    /// Checks that ages across both phases are strictly increasing.
    pub fn check_ordering(&self) -> Result<(), String> {
        let mut previous: Option<u32> = None;
        for (idx, point) in self.points().enumerate() {
            if let Some(prev) = previous {
                if point.age <= prev {
                    return Err(format!(
                        "age {} at position {idx} does not follow age {prev}",
                        point.age
                    ));
                }
            }
            previous = Some(point.age);
        }
        Ok(())
    }
}
