//! Measure Registry
//!
//! Metadata for every measure the crate provides, listed by the `measures`
//! subcommand of the CLI.

/// Measure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureCategory {
    /// Market risk (beta, residual volatility)
    Market,
    /// Liquidity level and liquidity risk
    Liquidity,
    /// Analyst forecast aggregates
    Analyst,
}

/// Measure metadata
#[derive(Debug, Clone)]
pub struct MeasureInfo {
    /// Measure name (unique identifier)
    pub name: &'static str,
    /// Measure category
    pub category: MeasureCategory,
    /// Brief description of what the measure captures
    pub description: &'static str,
    /// Required column names in input data
    pub required_columns: &'static [&'static str],
}

/// Get all available measure info
pub fn available_measures() -> Vec<MeasureInfo> {
    vec![
        MeasureInfo {
            name: "beta",
            category: MeasureCategory::Market,
            description: "Rolling OLS slope of stock returns on market returns",
            required_columns: &["symbol", "date", "returns", "market_return"],
        },
        MeasureInfo {
            name: "resid_std",
            category: MeasureCategory::Market,
            description: "Residual standard deviation of the rolling market regression",
            required_columns: &["symbol", "date", "returns", "market_return"],
        },
        MeasureInfo {
            name: "amihud",
            category: MeasureCategory::Liquidity,
            description: "Amihud illiquidity - price impact per dollar traded",
            required_columns: &["symbol", "date", "returns", "price", "volume"],
        },
        MeasureInfo {
            name: "turnover",
            category: MeasureCategory::Liquidity,
            description: "Trading volume relative to shares outstanding",
            required_columns: &["symbol", "date", "volume", "shares_outstanding"],
        },
        MeasureInfo {
            name: "liquidity_beta",
            category: MeasureCategory::Liquidity,
            description: "Loading on aggregate liquidity innovations, controlling for the market",
            required_columns: &["symbol", "date", "returns", "mkt_rf", "liq", "rf"],
        },
        MeasureInfo {
            name: "consensus",
            category: MeasureCategory::Analyst,
            description: "Monthly consensus of live analyst forecasts",
            required_columns: &["ticker", "analyst", "fiscal_period_end", "announce_date", "value"],
        },
    ]
}

/// Get measures by category
pub fn measures_by_category(category: MeasureCategory) -> Vec<MeasureInfo> {
    available_measures()
        .into_iter()
        .filter(|m| m.category == category)
        .collect()
}

/// Get measure info by name
pub fn get_measure_info(name: &str) -> Option<MeasureInfo> {
    available_measures().into_iter().find(|m| m.name == name)
}
