use num_format::{CustomFormat, Error as FormatError, Grouping, ToFormattedString};

use crate::core::{ProjectionSummary, YearlyBreakdown};

pub const CSV_FILE_NAME: &str = "sip-breakdown.csv";
const CSV_HEADER: &str = "Year,Invested,Value,Profit";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DigitGrouping {
    /// Lakh/crore grouping: `12,34,567`.
    Indian,
    /// Thousands grouping: `1,234,567`.
    Standard,
}

/// Rounds to whole units and inserts digit separators.
pub fn format_amount(value: f64, grouping: DigitGrouping) -> Result<String, FormatError> {
    let format = number_format(grouping)?;
    Ok(whole_units(value).to_formatted_string(&format))
}

/// Serializes a breakdown with every amount rounded to whole units.
pub fn breakdown_to_csv(years: &[YearlyBreakdown]) -> String {
    let mut lines = Vec::with_capacity(years.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for row in years {
        lines.push(format!(
            "{},{},{},{}",
            row.year,
            whole_units(row.invested),
            whole_units(row.value),
            whole_units(row.profit)
        ));
    }
    lines.join("\n")
}

pub fn render_table(
    years: &[YearlyBreakdown],
    summary: Option<&ProjectionSummary>,
    grouping: DigitGrouping,
) -> Result<String, FormatError> {
    let format = number_format(grouping)?;
    let amount = |value: f64| whole_units(value).to_formatted_string(&format);
    let rows = years
        .iter()
        .map(|row| {
            [
                row.year.to_string(),
                amount(row.invested),
                amount(row.value),
                amount(row.profit),
            ]
        })
        .collect::<Vec<_>>();

    let headers = ["Year", "Invested", "Value", "Profit"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(str::to_string), &widths);
    push_row(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    if let Some(summary) = summary {
        out.push('\n');
        out.push_str(&format!(
            "Final value:    {}\n",
            amount(summary.final_value)
        ));
        out.push_str(&format!(
            "Total invested: {}\n",
            amount(summary.total_invested)
        ));
        out.push_str(&format!(
            "Total profit:   {} ({:+.1}%)\n",
            amount(summary.total_profit),
            summary.profit_percentage
        ));
    }
    Ok(out)
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&line);
    out.push('\n');
}

fn whole_units(value: f64) -> i64 {
    // Saturating cast; NaN becomes 0.
    value.round() as i64
}

fn number_format(grouping: DigitGrouping) -> Result<CustomFormat, FormatError> {
    let grouping = match grouping {
        DigitGrouping::Indian => Grouping::Indian,
        DigitGrouping::Standard => Grouping::Standard,
    };
    CustomFormat::builder()
        .grouping(grouping)
        .separator(",")
        .minus_sign("-")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InvestmentPlan, project, summarize};
    use std::fs;
    use std::path::Path;

    fn assert_golden_snapshot(path: &str, actual: &str) {
        let update = matches!(
            std::env::var("UPDATE_GOLDEN").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );
        let snapshot_path = Path::new(path);

        if update {
            if let Some(parent) = snapshot_path.parent() {
                fs::create_dir_all(parent).expect("failed to create snapshot directory");
            }
            fs::write(snapshot_path, actual).expect("failed to write golden snapshot");
            return;
        }

        let expected = fs::read_to_string(snapshot_path).unwrap_or_else(|_| {
            panic!("missing golden snapshot at {path}; run with UPDATE_GOLDEN=1 to generate")
        });
        assert_eq!(
            actual, expected,
            "snapshot mismatch for {path}; run with UPDATE_GOLDEN=1 to refresh if expected"
        );
    }

    #[test]
    fn indian_grouping_uses_lakh_and_crore() {
        assert_eq!(
            format_amount(126_825.03, DigitGrouping::Indian).expect("format"),
            "1,26,825"
        );
        assert_eq!(
            format_amount(10_000_000.0, DigitGrouping::Indian).expect("format"),
            "1,00,00,000"
        );
        assert_eq!(
            format_amount(999.0, DigitGrouping::Indian).expect("format"),
            "999"
        );
    }

    #[test]
    fn standard_grouping_uses_thousands() {
        assert_eq!(
            format_amount(2_300_386.89, DigitGrouping::Standard).expect("format"),
            "2,300,387"
        );
        assert_eq!(
            format_amount(0.4, DigitGrouping::Standard).expect("format"),
            "0"
        );
    }

    #[test]
    fn every_grouping_builds_a_number_format() {
        for grouping in [DigitGrouping::Indian, DigitGrouping::Standard] {
            assert!(number_format(grouping).is_ok(), "{grouping:?}");
        }
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(
            format_amount(-1_234_567.0, DigitGrouping::Standard).expect("format"),
            "-1,234,567"
        );
    }

    #[test]
    fn csv_has_header_and_one_row_per_year() {
        let years = project(&InvestmentPlan {
            initial_investment: 100_000.0,
            monthly_investment: 0.0,
            expected_return: 0.0,
            tenure: 2.0,
            step_up: 0.0,
        });
        assert_eq!(
            breakdown_to_csv(&years),
            "Year,Invested,Value,Profit\n1,100000,100000,0\n2,100000,100000,0"
        );
    }

    #[test]
    fn csv_of_empty_breakdown_is_header_only() {
        assert_eq!(breakdown_to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn table_lists_every_year_and_summary() {
        let years = project(&InvestmentPlan::DEFAULT);
        let summary = summarize(&years);
        let table = render_table(&years, summary.as_ref(), DigitGrouping::Indian).expect("table");

        let lines = table.lines().collect::<Vec<_>>();
        assert!(lines[0].contains("Year") && lines[0].contains("Profit"));
        assert!(lines[2].trim_start().starts_with("1 "));
        assert!(table.contains("12,00,000"));
        assert!(table.contains("Final value:    23,00,387"));
        assert!(table.contains("(+91.7%)"));
    }

    #[test]
    fn table_summary_shows_a_loss_with_a_single_minus_sign() {
        let row = YearlyBreakdown {
            year: 1,
            invested: 100_000.0,
            value: 87_500.0,
            profit: -12_500.0,
        };
        let summary = ProjectionSummary {
            final_value: 87_500.0,
            total_invested: 100_000.0,
            total_profit: -12_500.0,
            profit_percentage: -12.5,
        };
        let table = render_table(&[row], Some(&summary), DigitGrouping::Standard).expect("table");
        assert!(table.contains("Total profit:   -12,500 (-12.5%)"), "{table}");
        assert!(!table.contains("+-"));
    }

    #[test]
    fn table_without_summary_has_no_totals() {
        let years = project(&InvestmentPlan::DEFAULT);
        let table = render_table(&years, None, DigitGrouping::Standard).expect("table");
        assert_eq!(table.lines().count(), years.len() + 2);
        assert!(!table.contains("Final value"));
    }

    #[test]
    fn golden_snapshot_default_plan_csv() {
        let years = project(&InvestmentPlan::DEFAULT);
        assert_golden_snapshot("tests/golden/default_plan.csv", &breakdown_to_csv(&years));
    }

    #[test]
    fn golden_snapshot_step_up_plan_csv() {
        let years = project(&InvestmentPlan {
            initial_investment: 50_000.0,
            monthly_investment: 5_000.0,
            expected_return: 12.0,
            tenure: 10.0,
            step_up: 10.0,
        });
        assert_golden_snapshot("tests/golden/step_up_plan.csv", &breakdown_to_csv(&years));
    }
}
