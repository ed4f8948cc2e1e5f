//! Time-series summary of portfolio returns.

use crate::formation::PortfolioReturn;
use hobart_stats::{mean, std_dev};
use serde::{Deserialize, Serialize};

/// Summary statistics of one portfolio's monthly returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecileSummary {
    /// Portfolio label
    pub portfolio: String,
    /// Months observed
    pub n_months: usize,
    /// Mean monthly return
    pub mean_ret: f64,
    /// Standard deviation of monthly returns
    pub std_ret: f64,
    /// t-statistic of the mean, `mean / (std / sqrt(n))`
    pub t_stat: f64,
    /// Average number of stocks held
    pub mean_n_stocks: f64,
}

/// Summarize each portfolio, in order of first appearance.
pub fn summarize(returns: &[PortfolioReturn]) -> Vec<DecileSummary> {
    let mut labels: Vec<&str> = Vec::new();
    for r in returns {
        if !labels.contains(&r.portfolio.as_str()) {
            labels.push(r.portfolio.as_str());
        }
    }

    labels
        .into_iter()
        .filter_map(|label| {
            let rows: Vec<&PortfolioReturn> =
                returns.iter().filter(|r| r.portfolio == label).collect();
            let rets: Vec<f64> = rows.iter().map(|r| r.ret).collect();
            let counts: Vec<f64> = rows.iter().map(|r| r.n_stocks as f64).collect();
            let mean_ret = mean(&rets)?;
            let std_ret = std_dev(&rets).unwrap_or(f64::NAN);
            Some(DecileSummary {
                portfolio: label.to_string(),
                n_months: rets.len(),
                mean_ret,
                std_ret,
                t_stat: mean_ret / (std_ret / (rets.len() as f64).sqrt()),
                mean_n_stocks: mean(&counts).unwrap_or(0.0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn row(month: u32, portfolio: &str, ret: f64, n_stocks: usize) -> PortfolioReturn {
        PortfolioReturn {
            date: NaiveDate::from_ymd_opt(2020, month, 28).unwrap(),
            portfolio: portfolio.to_string(),
            ret,
            n_stocks,
        }
    }

    #[test]
    fn test_summary_per_portfolio() {
        let returns = vec![
            row(1, "1", 0.01, 10),
            row(1, "2", 0.02, 12),
            row(2, "1", 0.03, 14),
            row(2, "2", 0.02, 12),
        ];
        let summary = summarize(&returns);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].portfolio, "1");
        assert_eq!(summary[0].n_months, 2);
        assert_relative_eq!(summary[0].mean_ret, 0.02, epsilon = 1e-12);
        assert_relative_eq!(summary[0].std_ret, 0.02_f64.sqrt() / 10.0, epsilon = 1e-12);
        assert_relative_eq!(summary[0].mean_n_stocks, 12.0);
        assert_relative_eq!(summary[0].t_stat, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert!(summarize(&[]).is_empty());
    }
}
