//! Hobart CLI binary.
//!
//! Runs the batch jobs on local CSV files and prints their summary tables.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hobart::data::{
    AnalystEstimate, FactorObs, Frequency, MarketObs, MeasureValue, PortfolioObs, StockObs,
    read_frame, read_records, require_columns,
};
use hobart::measures::{MeasureCategory, get_measure_info, measures_by_category};
use hobart::output::{ExportFormat, Exporter, RunReportBuilder};
use hobart::portfolio::{FactorModel, Weighting};
use hobart::stats::BucketMethod;
use hobart::{
    DailyPanel, JobConfig, LiquidityInputs, LiquidityMeasure, MeasureSource, run_alpha_job,
    run_beta_job_with_progress, run_consensus_job, run_liquidity_job_with_progress,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hobart")]
#[command(about = "Hobart: rolling betas, analyst consensus and liquidity portfolios", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// JSON job configuration; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: csv, json or pretty-json (default: from the output
    /// file extension, then the configuration)
    #[arg(long, global = true)]
    format: Option<ExportFormat>,

    /// First date to keep (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Last date to keep (YYYY-MM-DD)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Write a JSON run report to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rolling betas and residual volatility of stock returns
    Beta {
        /// Stock panel (permno, date, ret)
        #[arg(long)]
        stocks: PathBuf,

        /// Market returns (date, market_return, optional risk_free)
        #[arg(long)]
        market: PathBuf,

        /// Output file for the estimates
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Window length in periods
        #[arg(long)]
        window: Option<usize>,

        /// Minimum observations per window
        #[arg(long)]
        min_periods: Option<usize>,

        /// Treat the panels as daily data
        #[arg(long)]
        daily: bool,

        /// Regress excess returns
        #[arg(long)]
        excess: bool,
    },

    /// Monthly consensus of analyst forecasts
    Consensus {
        /// Analyst estimates (ticker, analyst, fiscal_period_end,
        /// announce_date, value, actual, actual_date)
        #[arg(long)]
        estimates: PathBuf,

        /// Output file for the consensus rows
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Maximum age of a forecast in days
        #[arg(long)]
        max_age_days: Option<i64>,

        /// Minimum number of analysts per row
        #[arg(long)]
        min_analysts: Option<usize>,
    },

    /// Portfolios sorted on a liquidity measure and their alphas
    Liquidity {
        /// Monthly stock panel (permno, date, ret, price, volume,
        /// shares_outstanding)
        #[arg(long)]
        stocks: PathBuf,

        /// Monthly factor returns (date, mkt_rf, smb, hml, umd, liq, rf)
        #[arg(long)]
        factors: PathBuf,

        /// Daily stock panel for Amihud illiquidity and turnover (symbol,
        /// date, returns, price, volume, shares_outstanding)
        #[arg(long)]
        daily: Option<PathBuf>,

        /// Rank on precomputed values (permno, date, value) instead
        #[arg(long)]
        measures: Option<PathBuf>,

        /// Measure to compute: liquidity-beta, amihud or turnover
        #[arg(long)]
        measure: Option<LiquidityMeasure>,

        /// Number of portfolios
        #[arg(long)]
        groups: Option<usize>,

        /// Portfolio weighting: equal or value
        #[arg(long)]
        weighting: Option<Weighting>,

        /// Months each portfolio is held
        #[arg(long)]
        holding_months: Option<usize>,

        /// Bucket assignment: rank or breakpoints
        #[arg(long)]
        method: Option<BucketMethod>,

        /// Factor model: capm, ff3, carhart4 or liquidity
        #[arg(long)]
        model: Option<FactorModel>,

        /// Newey-West lags (default: automatic)
        #[arg(long)]
        nw_lags: Option<usize>,

        /// Report measures as monthly z-scores
        #[arg(long)]
        standardize: bool,

        /// Directory for measures, returns, deciles and alphas
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Factor-model alphas of portfolio return series
    Alpha {
        /// Portfolio returns (date, portfolio, ret)
        #[arg(long)]
        portfolios: PathBuf,

        /// Monthly factor returns
        #[arg(long)]
        factors: PathBuf,

        /// Output file for the alpha table
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Factor model: capm, ff3, carhart4 or liquidity
        #[arg(long)]
        model: Option<FactorModel>,

        /// Newey-West lags (default: automatic)
        #[arg(long)]
        nw_lags: Option<usize>,

        /// Use plain OLS standard errors
        #[arg(long)]
        ols: bool,
    },

    /// List available measures
    Measures {
        /// Show the input columns of one measure
        name: Option<String>,
    },
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.common.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::default(),
    };
    if cli.common.start.is_some() {
        config.start = cli.common.start;
    }
    if cli.common.end.is_some() {
        config.end = cli.common.end;
    }
    config.validate()?;

    match cli.command {
        Commands::Beta {
            stocks,
            market,
            output,
            window,
            min_periods,
            daily,
            excess,
        } => {
            if let Some(window) = window {
                config.beta.window = window;
            }
            if let Some(min_periods) = min_periods {
                config.beta.min_periods = min_periods;
            }
            if daily {
                config.beta.frequency = Frequency::Daily;
            }
            config.beta.excess |= excess;
            beta(&cli.common, &config, &stocks, &market, output.as_deref())?;
        }
        Commands::Consensus {
            estimates,
            output,
            max_age_days,
            min_analysts,
        } => {
            if let Some(days) = max_age_days {
                config.consensus.max_age_days = days;
            }
            if let Some(n) = min_analysts {
                config.consensus.min_analysts = n;
            }
            consensus(&cli.common, &config, &estimates, output.as_deref())?;
        }
        Commands::Liquidity {
            stocks,
            factors,
            daily,
            measures,
            measure,
            groups,
            weighting,
            holding_months,
            method,
            model,
            nw_lags,
            standardize,
            output_dir,
        } => {
            if let Some(measure) = measure {
                config.liquidity.measure = measure;
            }
            if let Some(groups) = groups {
                config.portfolio.groups = groups;
            }
            if let Some(weighting) = weighting {
                config.portfolio.weighting = weighting;
            }
            if let Some(months) = holding_months {
                config.portfolio.holding_months = months;
            }
            if let Some(method) = method {
                config.portfolio.method = method;
            }
            if let Some(model) = model {
                config.alpha.model = model;
            }
            if nw_lags.is_some() {
                config.alpha.nw_lags = nw_lags;
            }
            config.liquidity.standardize |= standardize;
            let paths = LiquidityPaths {
                stocks,
                factors,
                daily,
                measures,
                output_dir,
            };
            liquidity(&cli.common, &config, &paths)?;
        }
        Commands::Alpha {
            portfolios,
            factors,
            output,
            model,
            nw_lags,
            ols,
        } => {
            if let Some(model) = model {
                config.alpha.model = model;
            }
            if nw_lags.is_some() {
                config.alpha.nw_lags = nw_lags;
            }
            if ols {
                config.alpha.newey_west = false;
            }
            alpha(&cli.common, &config, &portfolios, &factors, output.as_deref())?;
        }
        Commands::Measures { name } => list_measures(name.as_deref())?,
    }

    Ok(())
}

/// Format for `path`: the flag, then the file extension, then the config.
fn output_format(common: &CommonArgs, config: &JobConfig, path: &Path) -> ExportFormat {
    common
        .format
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or(config.format)
}

fn progress_bar(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

fn write_report(
    common: &CommonArgs,
    job: &str,
    config: &JobConfig,
    rows: &[(&str, usize)],
    outputs: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &common.report else {
        return Ok(());
    };
    let mut builder = RunReportBuilder::new().job(job).parameters(config)?;
    for (name, count) in rows {
        builder = builder.rows(*name, *count);
    }
    for output in outputs {
        builder = builder.output(output.clone());
    }
    builder.build()?.write_to(path)?;
    info!(path = %path.display(), "run report written");
    Ok(())
}

fn beta(
    common: &CommonArgs,
    config: &JobConfig,
    stocks: &Path,
    market: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stocks: Vec<StockObs> = read_records(stocks)?;
    let market: Vec<MarketObs> = read_records(market)?;
    let read_rows = stocks.len();

    let pb = progress_bar("Estimating rolling betas...")?;
    let result = run_beta_job_with_progress(stocks, &market, config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })?;
    pb.finish_with_message(format!("{} estimates", result.estimates.len()));

    println!("{}", result.summary);

    let mut outputs = Vec::new();
    if let Some(path) = output {
        result
            .estimates
            .export_to_file(path, output_format(common, config, path))?;
        outputs.push(path.to_path_buf());
    }
    write_report(
        common,
        "beta",
        config,
        &[
            ("stocks", read_rows),
            ("merged", result.merged_rows),
            ("estimates", result.estimates.len()),
        ],
        &outputs,
    )
}

fn consensus(
    common: &CommonArgs,
    config: &JobConfig,
    estimates: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let estimates: Vec<AnalystEstimate> = read_records(estimates)?;
    let result = run_consensus_job(&estimates, config)?;

    println!("{}", result.summary);

    let mut outputs = Vec::new();
    if let Some(path) = output {
        result
            .rows
            .export_to_file(path, output_format(common, config, path))?;
        outputs.push(path.to_path_buf());
    }
    write_report(
        common,
        "consensus",
        config,
        &[("estimates", estimates.len()), ("consensus", result.rows.len())],
        &outputs,
    )
}

struct LiquidityPaths {
    stocks: PathBuf,
    factors: PathBuf,
    daily: Option<PathBuf>,
    measures: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

fn liquidity(
    common: &CommonArgs,
    config: &JobConfig,
    paths: &LiquidityPaths,
) -> Result<(), Box<dyn std::error::Error>> {
    let stocks: Vec<StockObs> = read_records(&paths.stocks)?;
    let factors: Vec<FactorObs> = read_records(&paths.factors)?;
    let daily = match &paths.daily {
        Some(path) => {
            let mut frame = read_frame(path)?;
            require_columns(&mut frame, &["symbol", "date"], &path.display().to_string())?;
            Some(DailyPanel::Frame(frame))
        }
        None => None,
    };
    let source = match &paths.measures {
        Some(path) => MeasureSource::Precomputed(read_records::<MeasureValue>(path)?),
        None => MeasureSource::Configured,
    };
    let read_rows = stocks.len();

    let pb = progress_bar("Computing liquidity measure...")?;
    let result = run_liquidity_job_with_progress(
        LiquidityInputs {
            stocks,
            daily,
            factors,
        },
        source,
        config,
        |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        },
    )?;
    pb.finish_with_message(format!("{} {} values", result.measures.len(), result.measure));

    println!("{}", result.deciles);
    println!("{}", result.alphas);

    let mut outputs = Vec::new();
    if let Some(dir) = &paths.output_dir {
        std::fs::create_dir_all(dir)?;
        let format = common.format.unwrap_or(config.format);
        let path = |name: &str| dir.join(format!("{name}.{}", format.extension()));

        let measures_path = path(&result.measure);
        if result.liquidity_betas.is_empty() {
            result.measures.export_to_file(&measures_path, format)?;
        } else {
            result.liquidity_betas.export_to_file(&measures_path, format)?;
        }
        let returns_path = path("portfolio_returns");
        result.returns.export_to_file(&returns_path, format)?;
        let deciles_path = path("deciles");
        result.deciles.rows.export_to_file(&deciles_path, format)?;
        let alphas_path = path("alphas");
        result.alphas.rows.export_to_file(&alphas_path, format)?;

        outputs.extend([measures_path, returns_path, deciles_path, alphas_path]);
        info!(dir = %dir.display(), files = outputs.len(), "liquidity results written");
    }
    write_report(
        common,
        "liquidity",
        config,
        &[
            ("stocks", read_rows),
            ("measures", result.measures.len()),
            ("portfolio_returns", result.returns.len()),
            ("alphas", result.alphas.rows.len()),
        ],
        &outputs,
    )
}

fn alpha(
    common: &CommonArgs,
    config: &JobConfig,
    portfolios: &Path,
    factors: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let portfolios: Vec<PortfolioObs> = read_records(portfolios)?;
    let factors: Vec<FactorObs> = read_records(factors)?;
    let table = run_alpha_job(&portfolios, &factors, config)?;

    println!("{}", table);

    let mut outputs = Vec::new();
    if let Some(path) = output {
        table
            .rows
            .export_to_file(path, output_format(common, config, path))?;
        outputs.push(path.to_path_buf());
    }
    write_report(
        common,
        "alpha",
        config,
        &[("portfolio_returns", portfolios.len()), ("alphas", table.rows.len())],
        &outputs,
    )
}

fn list_measures(name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = name {
        let info = get_measure_info(name).ok_or_else(|| format!("unknown measure: {name}"))?;
        println!("{} ({:?})", info.name, info.category);
        println!("  {}", info.description);
        println!("  columns: {}", info.required_columns.join(", "));
        return Ok(());
    }

    println!("\n{:<16} {:<10} Description", "Measure", "Category");
    println!("{}", "-".repeat(80));
    for category in [
        MeasureCategory::Market,
        MeasureCategory::Liquidity,
        MeasureCategory::Analyst,
    ] {
        for m in measures_by_category(category) {
            println!("{:<16} {:<10} {}", m.name, format!("{:?}", m.category), m.description);
        }
    }
    Ok(())
}
