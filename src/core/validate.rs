use thiserror::Error;

use super::types::InvestmentPlan;

/// Reason a plan was rejected. Only the first violated rule is reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("Initial investment cannot be negative")]
    NegativeInitialInvestment,
    #[error("Monthly investment cannot be negative")]
    NegativeMonthlyInvestment,
    #[error("At least one investment amount must be greater than 0")]
    NoCapitalCommitted,
    #[error("Expected return cannot be negative")]
    NegativeReturn,
    #[error("Tenure must be at least 1 year")]
    TenureTooShort,
    #[error("Tenure must be a whole number")]
    TenureNotInteger,
    #[error("Step-up percentage cannot be negative")]
    NegativeStepUp,
}

impl ValidationError {
    /// Stable identifier for API clients that localize their own messages.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NegativeInitialInvestment => "negative-initial-investment",
            Self::NegativeMonthlyInvestment => "negative-monthly-investment",
            Self::NoCapitalCommitted => "no-capital-committed",
            Self::NegativeReturn => "negative-return",
            Self::TenureTooShort => "tenure-too-short",
            Self::TenureNotInteger => "tenure-not-integer",
            Self::NegativeStepUp => "negative-step-up",
        }
    }
}

/// Checks a plan against the domain rules in a fixed order.
///
/// Non-finite values fail the check of the field they appear in, so a plan
/// that passes never carries `NaN` or an infinity into the engine.
pub fn validate(plan: &InvestmentPlan) -> Result<(), ValidationError> {
    if !is_non_negative(plan.initial_investment) {
        return Err(ValidationError::NegativeInitialInvestment);
    }
    if !is_non_negative(plan.monthly_investment) {
        return Err(ValidationError::NegativeMonthlyInvestment);
    }
    if plan.initial_investment == 0.0 && plan.monthly_investment == 0.0 {
        return Err(ValidationError::NoCapitalCommitted);
    }
    if !is_non_negative(plan.expected_return) {
        return Err(ValidationError::NegativeReturn);
    }
    if plan.tenure.is_nan() || plan.tenure < 1.0 {
        return Err(ValidationError::TenureTooShort);
    }
    // Whole years beyond u32::MAX cannot be emitted as distinct records.
    if !plan.tenure.is_finite()
        || plan.tenure.fract() != 0.0
        || plan.tenure > f64::from(u32::MAX)
    {
        return Err(ValidationError::TenureNotInteger);
    }
    if !is_non_negative(plan.step_up) {
        return Err(ValidationError::NegativeStepUp);
    }
    Ok(())
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
