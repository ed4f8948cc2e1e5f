//! Summary tables.
//!
//! Terminal (ASCII) and Markdown renderings of the tables the jobs print:
//! factor-model alphas per portfolio, time-series statistics per portfolio,
//! and the cross-sectional distribution of estimated measures.

use hobart_portfolio::{AlphaRow, DecileSummary};
use hobart_stats::Describe;
use serde::{Deserialize, Serialize};
use std::fmt;

const RULE_WIDTH: usize = 80;

fn ascii_header(output: &mut String, title: &str) {
    output.push_str(&format!("\n{title}\n"));
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push('\n');
}

fn rule(output: &mut String) {
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');
}

fn opt(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:>width$.precision$}"),
        None => format!("{:>width$}", "-"),
    }
}

/// Alpha table for one factor model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlphaTable {
    /// Table title.
    pub title: String,

    /// One row per portfolio.
    pub rows: Vec<AlphaRow>,
}

impl AlphaTable {
    /// Create a new alpha table.
    pub const fn new(title: String, rows: Vec<AlphaRow>) -> Self {
        Self { title, rows }
    }

    /// Format as an ASCII table for terminal output.
    ///
    /// Returns are shown in percent per month.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        ascii_header(&mut output, &self.title);
        output.push_str(&format!(
            "{:<10} {:>9} {:>9} {:>8} {:>8} {:>8} {:>8} {:>6} {:>6}\n",
            "Portfolio", "Mean (%)", "Alpha (%)", "t(a)", "b(mkt)", "b(smb)", "b(hml)", "R2", "N"
        ));
        rule(&mut output);

        for row in &self.rows {
            output.push_str(&format!(
                "{:<10} {:>9.3} {:>9.3} {:>8.2} {:>8.3} {} {} {:>6.3} {:>6}\n",
                row.portfolio,
                row.mean_ret * 100.0,
                row.alpha * 100.0,
                row.alpha_t,
                row.beta_mkt,
                opt(row.beta_smb, 8, 3),
                opt(row.beta_hml, 8, 3),
                row.r_squared,
                row.n_months,
            ));
        }

        if let Some(extra) = self.extra_factor() {
            output.push('\n');
            output.push_str(&format!("Loadings on {extra}:\n"));
            for row in &self.rows {
                let (b, t) = match extra {
                    "umd" => (row.beta_umd, row.t_umd),
                    _ => (row.beta_liq, row.t_liq),
                };
                output.push_str(&format!(
                    "  {:<10} {} (t = {})\n",
                    row.portfolio,
                    opt(b, 8, 3),
                    opt(t, 6, 2)
                ));
            }
        }
        rule(&mut output);
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("## {}\n\n", self.title));
        output.push_str("| Portfolio | Mean (%) | Alpha (%) | t(alpha) | b(mkt) | t(mkt) | b(smb) | b(hml) | b(umd) | b(liq) | R² | Months |\n");
        output.push_str("|-----------|----------|-----------|----------|--------|--------|--------|--------|--------|--------|----|--------|\n");

        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {:.3} | {:.3} | {:.2} | {:.3} | {:.2} | {} | {} | {} | {} | {:.3} | {} |\n",
                row.portfolio,
                row.mean_ret * 100.0,
                row.alpha * 100.0,
                row.alpha_t,
                row.beta_mkt,
                row.t_mkt,
                opt(row.beta_smb, 0, 3).trim(),
                opt(row.beta_hml, 0, 3).trim(),
                opt(row.beta_umd, 0, 3).trim(),
                opt(row.beta_liq, 0, 3).trim(),
                row.r_squared,
                row.n_months,
            ));
        }
        output
    }

    /// Factor beyond market/size/value carried by the rows, if any.
    fn extra_factor(&self) -> Option<&'static str> {
        if self.rows.iter().any(|r| r.beta_umd.is_some()) {
            Some("umd")
        } else if self.rows.iter().any(|r| r.beta_liq.is_some()) {
            Some("liq")
        } else {
            None
        }
    }
}

impl fmt::Display for AlphaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii_table())
    }
}

/// Time-series statistics of each portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecileTable {
    /// Table title.
    pub title: String,

    /// One row per portfolio.
    pub rows: Vec<DecileSummary>,
}

impl DecileTable {
    /// Create a new decile table.
    pub const fn new(title: String, rows: Vec<DecileSummary>) -> Self {
        Self { title, rows }
    }

    /// Format as an ASCII table for terminal output.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        ascii_header(&mut output, &self.title);
        output.push_str(&format!(
            "{:<10} {:>8} {:>10} {:>10} {:>8} {:>10}\n",
            "Portfolio", "Months", "Mean (%)", "Std (%)", "t", "Stocks"
        ));
        rule(&mut output);
        for row in &self.rows {
            output.push_str(&format!(
                "{:<10} {:>8} {:>10.3} {:>10.3} {:>8.2} {:>10.1}\n",
                row.portfolio,
                row.n_months,
                row.mean_ret * 100.0,
                row.std_ret * 100.0,
                row.t_stat,
                row.mean_n_stocks,
            ));
        }
        rule(&mut output);
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("## {}\n\n", self.title));
        output.push_str("| Portfolio | Months | Mean (%) | Std (%) | t | Stocks |\n");
        output.push_str("|-----------|--------|----------|---------|---|--------|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {:.3} | {:.3} | {:.2} | {:.1} |\n",
                row.portfolio,
                row.n_months,
                row.mean_ret * 100.0,
                row.std_ret * 100.0,
                row.t_stat,
                row.mean_n_stocks,
            ));
        }
        output
    }
}

impl fmt::Display for DecileTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii_table())
    }
}

/// Distribution of one estimated quantity across all stock-periods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasureSummary {
    /// Quantity name.
    pub name: String,

    /// Descriptive statistics.
    pub stats: Describe,
}

impl MeasureSummary {
    /// Summarize `values`, ignoring non-finite entries. `None` when nothing
    /// finite remains.
    pub fn from_values(name: &str, values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        Describe::of(&finite).map(|stats| Self {
            name: name.to_string(),
            stats,
        })
    }
}

/// Table of measure distributions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryTable {
    /// Table title.
    pub title: String,

    /// One row per quantity.
    pub rows: Vec<MeasureSummary>,
}

impl SummaryTable {
    /// Create a new summary table.
    pub const fn new(title: String, rows: Vec<MeasureSummary>) -> Self {
        Self { title, rows }
    }

    /// Format as an ASCII table for terminal output.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        ascii_header(&mut output, &self.title);
        output.push_str(&format!(
            "{:<14} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "Measure", "N", "Mean", "Std", "Min", "Median", "Max"
        ));
        rule(&mut output);
        for row in &self.rows {
            let s = &row.stats;
            output.push_str(&format!(
                "{:<14} {:>10} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}\n",
                row.name, s.n, s.mean, s.std, s.min, s.median, s.max
            ));
        }
        rule(&mut output);
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("## {}\n\n", self.title));
        output.push_str("| Measure | N | Mean | Std | Min | Median | Max |\n");
        output.push_str("|---------|---|------|-----|-----|--------|-----|\n");
        for row in &self.rows {
            let s = &row.stats;
            output.push_str(&format!(
                "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
                row.name, s.n, s.mean, s.std, s.min, s.median, s.max
            ));
        }
        output
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hobart_portfolio::FactorModel;

    fn alpha_row(portfolio: &str, umd: Option<f64>) -> AlphaRow {
        AlphaRow {
            portfolio: portfolio.to_string(),
            model: if umd.is_some() {
                FactorModel::Carhart4
            } else {
                FactorModel::Capm
            },
            mean_ret: 0.0081,
            alpha: 0.0042,
            alpha_t: 2.51,
            beta_mkt: 1.05,
            t_mkt: 20.0,
            beta_smb: None,
            t_smb: None,
            beta_hml: None,
            t_hml: None,
            beta_umd: umd,
            t_umd: umd.map(|_| 1.5),
            beta_liq: None,
            t_liq: None,
            r_squared: 0.85,
            n_months: 360,
        }
    }

    #[test]
    fn test_alpha_table_ascii() {
        let table = AlphaTable::new(
            "CAPM alphas".to_string(),
            vec![alpha_row("1", None), alpha_row("H-L", None)],
        );
        let ascii = table.to_ascii_table();
        assert!(ascii.contains("CAPM alphas"));
        assert!(ascii.contains("H-L"));
        assert!(ascii.contains("0.420"));
        assert!(ascii.contains("2.51"));
        assert!(!ascii.contains("Loadings on"));
        assert_eq!(ascii, table.to_string());
    }

    #[test]
    fn test_alpha_table_shows_momentum_loadings() {
        let table = AlphaTable::new("Carhart".to_string(), vec![alpha_row("10", Some(-0.3))]);
        let ascii = table.to_ascii_table();
        assert!(ascii.contains("Loadings on umd"));
        assert!(ascii.contains("-0.300"));
    }

    #[test]
    fn test_alpha_table_markdown() {
        let table = AlphaTable::new("Alphas".to_string(), vec![alpha_row("1", None)]);
        let md = table.to_markdown();
        assert!(md.starts_with("## Alphas"));
        assert!(md.contains("| Portfolio |"));
        assert!(md.contains("| 1 | 0.810 | 0.420 | 2.51 |"));
        assert!(md.contains("| - |"));
    }

    #[test]
    fn test_decile_table() {
        let table = DecileTable::new(
            "Liquidity deciles".to_string(),
            vec![DecileSummary {
                portfolio: "1".to_string(),
                n_months: 120,
                mean_ret: 0.01,
                std_ret: 0.05,
                t_stat: 2.19,
                mean_n_stocks: 150.4,
            }],
        );
        let ascii = table.to_ascii_table();
        assert!(ascii.contains("Liquidity deciles"));
        assert!(ascii.contains("150.4"));
        assert!(table.to_markdown().contains("| 1 | 120 | 1.000 | 5.000 | 2.19 | 150.4 |"));
    }

    #[test]
    fn test_measure_summary() {
        let summary = MeasureSummary::from_values("beta", &[0.5, 1.0, f64::NAN, 1.5]).unwrap();
        assert_eq!(summary.stats.n, 3);
        assert_relative_eq!(summary.stats.mean, 1.0);
        assert!(MeasureSummary::from_values("empty", &[f64::NAN]).is_none());

        let table = SummaryTable::new("Rolling beta".to_string(), vec![summary]);
        assert!(table.to_ascii_table().contains("beta"));
        assert!(table.to_markdown().contains("| beta | 3 | 1.0000 |"));
    }
}
