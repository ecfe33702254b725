use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    pub initial_investment: f64,
    pub monthly_investment: f64,
    /// Annual nominal rate in percent, e.g. 12 for 12%.
    pub expected_return: f64,
    /// Years to project. Kept as a real so fractional input can be rejected.
    pub tenure: f64,
    /// Yearly increase of the monthly contribution in percent.
    pub step_up: f64,
}

impl InvestmentPlan {
    pub const DEFAULT: Self = Self {
        initial_investment: 0.0,
        monthly_investment: 10_000.0,
        expected_return: 12.0,
        tenure: 10.0,
        step_up: 0.0,
    };

    /// Number of whole years the engine will emit for this plan.
    ///
    /// Zero for any tenure below one year, including `NaN`.
    pub fn whole_years(&self) -> u32 {
        if self.tenure >= 1.0 {
            // `as` saturates for out-of-range values.
            self.tenure.floor() as u32
        } else {
            0
        }
    }
}

impl Default for InvestmentPlan {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBreakdown {
    pub year: u32,
    pub invested: f64,
    pub value: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub final_value: f64,
    pub total_invested: f64,
    pub total_profit: f64,
    pub profit_percentage: f64,
}
