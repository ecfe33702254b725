//! Shareable URL parameters for a plan.
//!
//! The five parameter names are part of every shared link, so they must not
//! change: `initial`, `monthly`, `return`, `tenure`, `stepUp`.

use serde::Deserialize;

use crate::core::InvestmentPlan;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlanQuery {
    pub initial: Option<String>,
    pub monthly: Option<String>,
    #[serde(rename = "return")]
    pub expected_return: Option<String>,
    pub tenure: Option<String>,
    #[serde(rename = "stepUp")]
    pub step_up: Option<String>,
}

/// Rebuilds a plan from URL parameters.
///
/// Missing parameters fall back to the default plan. Present but malformed
/// values become zero and are left for the validator to reject.
pub fn plan_from_query(query: &PlanQuery) -> InvestmentPlan {
    let defaults = InvestmentPlan::DEFAULT;
    InvestmentPlan {
        initial_investment: coerce(query.initial.as_deref(), defaults.initial_investment),
        monthly_investment: coerce(query.monthly.as_deref(), defaults.monthly_investment),
        expected_return: coerce(query.expected_return.as_deref(), defaults.expected_return),
        tenure: coerce(query.tenure.as_deref(), defaults.tenure),
        step_up: coerce(query.step_up.as_deref(), defaults.step_up),
    }
}

pub fn plan_to_query(plan: &InvestmentPlan) -> String {
    format!(
        "initial={}&monthly={}&return={}&tenure={}&stepUp={}",
        plan.initial_investment,
        plan.monthly_investment,
        plan.expected_return,
        plan.tenure,
        plan.step_up
    )
}

pub fn share_url(base_url: &str, plan: &InvestmentPlan) -> String {
    let base = base_url.split(['?', '#']).next().unwrap_or(base_url);
    format!("{base}?{}", plan_to_query(plan))
}

fn coerce(raw: Option<&str>, default: f64) -> f64 {
    match raw {
        None => default,
        Some(text) => text.trim().parse::<f64>().unwrap_or(0.0),
    }
}
