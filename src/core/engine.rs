use super::types::{InvestmentPlan, ProjectionSummary, YearlyBreakdown};

const MONTHS_PER_YEAR: i32 = 12;

/// Projects a plan year by year.
///
/// The engine does not validate. For a plan the validator would reject it
/// still returns one record per whole year of `tenure`, which is an empty
/// sequence for any tenure below one year. The record count never exceeds
/// `u32::MAX`; the validator rejects tenures beyond that, and the output is
/// `O(tenure)` in memory, so callers serving untrusted input should cap the
/// tenure well below it.
pub fn project(plan: &InvestmentPlan) -> Vec<YearlyBreakdown> {
    let years = plan.whole_years();
    let monthly_rate = plan.expected_return / 100.0 / MONTHS_PER_YEAR as f64;
    let mut results = Vec::with_capacity(years.min(1_000) as usize);

    let mut cumulative_invested = plan.initial_investment;
    let mut portfolio_value = plan.initial_investment;

    for year in 1..=years {
        let monthly_for_year = monthly_contribution_for_year(plan, year);
        let contributed = monthly_for_year * MONTHS_PER_YEAR as f64;
        cumulative_invested += contributed;
        portfolio_value = grow_one_year(portfolio_value, monthly_for_year, monthly_rate);

        results.push(YearlyBreakdown {
            year,
            invested: cumulative_invested,
            value: portfolio_value,
            profit: portfolio_value - cumulative_invested,
        });
    }

    results
}

/// Monthly contribution used during `year` (1-based). Year 1 uses the base
/// amount; the step-up compounds once per completed year after that.
pub fn monthly_contribution_for_year(plan: &InvestmentPlan, year: u32) -> f64 {
    let completed_years = year.saturating_sub(1);
    let growth = 1.0 + plan.step_up / 100.0;
    let multiplier = match i32::try_from(completed_years) {
        Ok(exponent) => growth.powi(exponent),
        Err(_) => growth.powf(f64::from(completed_years)),
    };
    plan.monthly_investment * multiplier
}

pub fn summarize(years: &[YearlyBreakdown]) -> Option<ProjectionSummary> {
    let last = years.last()?;
    let profit_percentage = if last.invested > 0.0 {
        last.profit / last.invested * 100.0
    } else {
        0.0
    };
    Some(ProjectionSummary {
        final_value: last.value,
        total_invested: last.invested,
        total_profit: last.profit,
        profit_percentage,
    })
}

fn grow_one_year(balance: f64, monthly_contribution: f64, monthly_rate: f64) -> f64 {
    if monthly_rate == 0.0 {
        return balance + monthly_contribution * MONTHS_PER_YEAR as f64;
    }
    let growth = (1.0 + monthly_rate).powi(MONTHS_PER_YEAR);
    // Ordinary annuity: each deposit lands at the end of its month.
    let contributions_future_value = monthly_contribution * ((growth - 1.0) / monthly_rate);
    balance * growth + contributions_future_value
}
