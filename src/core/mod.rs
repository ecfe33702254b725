mod engine;
mod types;
mod validate;

pub use engine::{monthly_contribution_for_year, project, summarize};
pub use types::{InvestmentPlan, ProjectionSummary, YearlyBreakdown};
pub use validate::{ValidationError, validate};
