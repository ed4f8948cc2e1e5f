//! Batch jobs.
//!
//! Each job takes fully loaded inputs, filters them to the configured date
//! range, computes its results and returns them together with the summary
//! tables the binary prints. Reading and writing files is left to the caller.

use crate::config::{JobConfig, LiquidityMeasure};
use crate::error::{JobError, Result};
use chrono::NaiveDate;
use hobart_data::frame::stocks_to_frame;
use hobart_data::{
    AnalystEstimate, DataError, FactorObs, MarketObs, MeasureValue, PortfolioObs, StockObs,
    filter_dates, merge_market, sort_panel,
};
use hobart_measures::{
    AmihudIlliquidity, BetaEstimate, Consensus, ConsensusRow, LiquidityBeta,
    LiquidityBetaEstimate, Measure, RollingBeta, Turnover, collect_values, standardize_by_month,
};
use hobart_output::{AlphaTable, DecileTable, MeasureSummary, SummaryTable};
use hobart_portfolio::{PortfolioReturn, estimate_alphas, form_portfolios, summarize};
use polars::prelude::{IntoLazy, LazyFrame, col, lit};
use std::fmt;
use tracing::{debug, info, warn};

/// Results of the rolling beta job
#[derive(Debug, Clone)]
pub struct BetaJobOutput {
    /// One estimate per stock-period with a full enough window
    pub estimates: Vec<BetaEstimate>,
    /// Distribution of beta, residual volatility and R²
    pub summary: SummaryTable,
    /// Stock rows kept after date filtering
    pub input_rows: usize,
    /// Stock rows matched with a market return
    pub merged_rows: usize,
}

/// Results of the consensus job
#[derive(Debug, Clone)]
pub struct ConsensusJobOutput {
    /// One row per ticker, fiscal period and statistics date
    pub rows: Vec<ConsensusRow>,
    /// Distribution of coverage, dispersion and surprise
    pub summary: SummaryTable,
}

/// Where the liquidity job gets its ranking variable from.
#[derive(Debug, Clone, Default)]
pub enum MeasureSource {
    /// Compute the measure named in the configuration
    #[default]
    Configured,
    /// Rank on values supplied by the caller
    Precomputed(Vec<MeasureValue>),
}

/// Daily stock panel for the Amihud and turnover measures.
#[derive(Clone)]
pub enum DailyPanel {
    /// Typed rows
    Records(Vec<StockObs>),
    /// A scanned frame with the columns `symbol`, `date`, `returns`, `price`,
    /// `volume` and `shares_outstanding` (see [`read_frame`](hobart_data::read_frame))
    Frame(LazyFrame),
}

impl fmt::Debug for DailyPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Records(rows) => f.debug_tuple("Records").field(&rows.len()).finish(),
            Self::Frame(_) => f.write_str("Frame(..)"),
        }
    }
}

/// Inputs of the liquidity job.
#[derive(Debug, Clone, Default)]
pub struct LiquidityInputs {
    /// Monthly stock panel: returns for portfolio formation, market cap for
    /// value weights
    pub stocks: Vec<StockObs>,
    /// Daily stock panel for Amihud and turnover. Without one the measures
    /// are computed from the monthly panel, one observation per month.
    pub daily: Option<DailyPanel>,
    /// Monthly factor returns
    pub factors: Vec<FactorObs>,
}

/// Results of the liquidity portfolio job
#[derive(Debug, Clone)]
pub struct LiquidityJobOutput {
    /// Name of the ranking variable
    pub measure: String,
    /// Ranking variable per stock-month
    pub measures: Vec<MeasureValue>,
    /// Full liquidity beta estimates, when that measure was computed
    pub liquidity_betas: Vec<LiquidityBetaEstimate>,
    /// Monthly portfolio returns, spread included
    pub returns: Vec<PortfolioReturn>,
    /// Time-series statistics per portfolio
    pub deciles: DecileTable,
    /// Factor-model alphas per portfolio
    pub alphas: AlphaTable,
}

fn in_range(date: NaiveDate, (start, end): (NaiveDate, NaiveDate)) -> bool {
    date >= start && date <= end
}

fn prepare_panel(stocks: Vec<StockObs>, config: &JobConfig, name: &str) -> Result<Vec<StockObs>> {
    let (start, end) = config.date_range();
    let mut stocks = filter_dates(stocks, start, end)?;
    if stocks.is_empty() {
        return Err(DataError::EmptyPanel(format!("{name} after date filter")).into());
    }
    sort_panel(&mut stocks);
    Ok(stocks)
}

fn filter_frame_dates(frame: LazyFrame, config: &JobConfig) -> LazyFrame {
    let frame = match config.start {
        Some(start) => frame.filter(col("date").gt_eq(lit(start))),
        None => frame,
    };
    match config.end {
        Some(end) => frame.filter(col("date").lt_eq(lit(end))),
        None => frame,
    }
}

fn summary_table(title: &str, columns: &[(&str, Vec<f64>)]) -> SummaryTable {
    let rows = columns
        .iter()
        .filter_map(|(name, values)| MeasureSummary::from_values(name, values))
        .collect();
    SummaryTable::new(title.to_string(), rows)
}

/// Estimate rolling betas and residual volatility.
pub fn run_beta_job(
    stocks: Vec<StockObs>,
    market: &[MarketObs],
    config: &JobConfig,
) -> Result<BetaJobOutput> {
    run_beta_job_with_progress(stocks, market, config, |_, _| {})
}

/// Like [`run_beta_job`], calling `on_entity(done, total)` after each stock.
pub fn run_beta_job_with_progress<F>(
    stocks: Vec<StockObs>,
    market: &[MarketObs],
    config: &JobConfig,
    on_entity: F,
) -> Result<BetaJobOutput>
where
    F: FnMut(usize, usize),
{
    config.validate()?;
    let stocks = prepare_panel(stocks, config, "stock panel")?;
    let range = config.date_range();
    let market: Vec<MarketObs> = market
        .iter()
        .filter(|m| in_range(m.date, range))
        .cloned()
        .collect();

    let merged = merge_market(&stocks, &market, config.beta.frequency)?;
    info!(
        stocks = stocks.len(),
        merged = merged.len(),
        window = config.beta.window,
        min_periods = config.beta.min_periods,
        "estimating rolling betas"
    );

    let estimator = RollingBeta::new(config.beta)?;
    let estimates = estimator.estimate_with_progress(&merged, on_entity)?;
    info!(estimates = estimates.len(), "rolling beta job finished");

    let summary = summary_table(
        "Rolling beta estimates",
        &[
            ("beta", estimates.iter().map(|e| e.beta).collect()),
            ("resid_std", estimates.iter().map(|e| e.resid_std).collect()),
            ("r_squared", estimates.iter().map(|e| e.r_squared).collect()),
        ],
    );

    Ok(BetaJobOutput {
        estimates,
        summary,
        input_rows: stocks.len(),
        merged_rows: merged.len(),
    })
}

/// Aggregate analyst estimates into monthly consensus rows.
///
/// The date range applies to the statistics dates of the output.
pub fn run_consensus_job(
    estimates: &[AnalystEstimate],
    config: &JobConfig,
) -> Result<ConsensusJobOutput> {
    config.validate()?;
    if estimates.is_empty() {
        return Err(DataError::EmptyPanel("analyst estimates".to_string()).into());
    }
    info!(
        estimates = estimates.len(),
        max_age_days = config.consensus.max_age_days,
        "computing analyst consensus"
    );

    let range = config.date_range();
    let rows: Vec<ConsensusRow> = Consensus::new(config.consensus)?
        .compute(estimates)?
        .into_iter()
        .filter(|r| in_range(r.stat_date, range))
        .collect();
    info!(rows = rows.len(), "consensus job finished");

    let summary = summary_table(
        "Analyst consensus",
        &[
            ("n_analysts", rows.iter().map(|r| r.n_analysts as f64).collect()),
            ("dispersion", rows.iter().filter_map(|r| r.dispersion).collect()),
            ("revision", rows.iter().filter_map(|r| r.revision).collect()),
            ("surprise", rows.iter().filter_map(|r| r.surprise).collect()),
        ],
    );

    Ok(ConsensusJobOutput { rows, summary })
}

/// Rank stocks on a liquidity measure, form portfolios and estimate alphas.
pub fn run_liquidity_job(
    inputs: LiquidityInputs,
    source: MeasureSource,
    config: &JobConfig,
) -> Result<LiquidityJobOutput> {
    run_liquidity_job_with_progress(inputs, source, config, |_, _| {})
}

/// Like [`run_liquidity_job`], calling `on_entity(done, total)` after each
/// stock while liquidity betas are estimated.
pub fn run_liquidity_job_with_progress<F>(
    inputs: LiquidityInputs,
    source: MeasureSource,
    config: &JobConfig,
    on_entity: F,
) -> Result<LiquidityJobOutput>
where
    F: FnMut(usize, usize),
{
    config.validate()?;
    let range = config.date_range();
    let stocks = prepare_panel(inputs.stocks, config, "monthly stock panel")?;
    let factors: Vec<FactorObs> = inputs
        .factors
        .into_iter()
        .filter(|f| in_range(f.date, range))
        .collect();
    if factors.is_empty() {
        return Err(DataError::EmptyPanel("factor returns after date filter".to_string()).into());
    }

    let liquidity = &config.liquidity;
    let mut liquidity_betas = Vec::new();
    let (measure, mut measures) = match source {
        MeasureSource::Precomputed(values) => {
            let values: Vec<MeasureValue> = values
                .into_iter()
                .filter(|v| in_range(v.date, range) && v.value.is_finite())
                .collect();
            ("precomputed".to_string(), values)
        }
        MeasureSource::Configured => {
            let values = match liquidity.measure {
                LiquidityMeasure::LiquidityBeta => {
                    let estimator = LiquidityBeta::new(liquidity.liquidity_beta)?;
                    liquidity_betas =
                        estimator.estimate_with_progress(&stocks, &factors, on_entity)?;
                    liquidity_betas.iter().map(LiquidityBetaEstimate::value).collect()
                }
                LiquidityMeasure::Amihud | LiquidityMeasure::Turnover => {
                    let mut amihud = liquidity.amihud.clone();
                    let mut turnover = liquidity.turnover.clone();
                    let frame = match inputs.daily {
                        Some(DailyPanel::Records(daily)) => {
                            stocks_to_frame(&prepare_panel(daily, config, "daily stock panel")?)?
                                .lazy()
                        }
                        Some(DailyPanel::Frame(frame)) => filter_frame_dates(frame, config),
                        None => {
                            // A monthly panel has a single observation per month
                            debug!(measure = %liquidity.measure, "no daily panel, using monthly rows");
                            amihud.min_days = 1;
                            turnover.min_days = 1;
                            stocks_to_frame(&stocks)?.lazy()
                        }
                    };
                    let computed = if liquidity.measure == LiquidityMeasure::Amihud {
                        AmihudIlliquidity::with_config(amihud).compute_checked(frame)?
                    } else {
                        Turnover::with_config(turnover).compute_checked(frame)?
                    };
                    collect_values(computed, &liquidity.measure.to_string())?
                }
            };
            (liquidity.measure.to_string(), values)
        }
    };

    if measures.is_empty() {
        return Err(JobError::Config(format!(
            "measure {measure} produced no values in the selected date range"
        )));
    }
    debug!(measure = %measure, values = measures.len(), "ranking variable ready");

    if liquidity.standardize {
        let before = measures.len();
        measures = standardize_by_month(&measures);
        if measures.len() < before {
            warn!(
                dropped = before - measures.len(),
                "months without cross-sectional dispersion dropped by standardization"
            );
        }
    }

    info!(
        measure = %measure,
        groups = config.portfolio.groups,
        weighting = %config.portfolio.weighting,
        "forming liquidity portfolios"
    );
    let returns = form_portfolios(&stocks, &measures, &config.portfolio)?;
    let deciles = DecileTable::new(
        format!("Portfolios sorted on {measure}"),
        summarize(&returns),
    );

    let obs: Vec<PortfolioObs> = returns.iter().map(PortfolioReturn::to_obs).collect();
    let alphas = estimate_alphas(&obs, &factors, &config.alpha)?;
    info!(
        months = returns.len(),
        portfolios = alphas.len(),
        model = %config.alpha.model,
        "liquidity job finished"
    );

    Ok(LiquidityJobOutput {
        alphas: AlphaTable::new(
            format!("{} alphas of {measure} portfolios", config.alpha.model),
            alphas,
        ),
        measure,
        measures,
        liquidity_betas,
        returns,
        deciles,
    })
}

/// Estimate factor-model alphas of existing portfolio return series.
pub fn run_alpha_job(
    portfolios: &[PortfolioObs],
    factors: &[FactorObs],
    config: &JobConfig,
) -> Result<AlphaTable> {
    config.validate()?;
    let range = config.date_range();
    let portfolios: Vec<PortfolioObs> = portfolios
        .iter()
        .filter(|p| in_range(p.date, range))
        .cloned()
        .collect();
    if portfolios.is_empty() {
        return Err(DataError::EmptyPanel("portfolio returns after date filter".to_string()).into());
    }
    info!(
        rows = portfolios.len(),
        model = %config.alpha.model,
        "estimating portfolio alphas"
    );

    let rows = estimate_alphas(&portfolios, factors, &config.alpha)?;
    info!(portfolios = rows.len(), "alpha job finished");
    Ok(AlphaTable::new(format!("{} alphas", config.alpha.model), rows))
}
