//! Integration tests for exporting and rendering portfolio results.

use hobart_data::{FactorObs, MeasureValue, PortfolioObs, StockObs, YearMonth};
use hobart_output::{
    AlphaTable, DecileTable, ExportFormat, Exporter, MeasureSummary, RunReportBuilder,
    SummaryTable,
};
use hobart_portfolio::{
    AlphaConfig, FactorModel, PortfolioConfig, estimate_alphas, form_portfolios, summarize,
};

/// 30 stocks over 40 months. The measure is the stock index; returns load on
/// the market with a small index-dependent premium.
fn synthetic_panel() -> (Vec<StockObs>, Vec<MeasureValue>, Vec<FactorObs>) {
    let start = YearMonth::new(2010, 1).unwrap();
    let mut stocks = Vec::new();
    let mut measures = Vec::new();
    let mut factors = Vec::new();

    for t in 0..40 {
        let date = start.offset(t).last_day();
        let mkt = ((t * 7 % 11) as f64 - 5.0) / 100.0;
        factors.push(FactorObs {
            date,
            mkt_rf: mkt,
            smb: Some(((t * 3 % 7) as f64 - 3.0) / 200.0),
            hml: Some(((t * 5 % 9) as f64 - 4.0) / 200.0),
            umd: None,
            liq: None,
            rf: 0.001,
        });
        for i in 0..30 {
            let permno = format!("{}", 20_000 + i);
            let ret = 0.001 + 0.0001 * i as f64 + (0.8 + 0.02 * i as f64) * mkt;
            stocks.push(
                StockObs::new(&permno, date, Some(ret)).with_trading(
                    Some(20.0),
                    Some(5_000.0),
                    Some(1_000.0 + i as f64),
                ),
            );
            measures.push(MeasureValue::new(&permno, date, i as f64));
        }
    }
    (stocks, measures, factors)
}

#[test]
fn test_portfolio_results_render_and_export() {
    let (stocks, measures, factors) = synthetic_panel();

    let returns = form_portfolios(&stocks, &measures, &PortfolioConfig::default()).unwrap();
    let summary = summarize(&returns);
    assert_eq!(summary.len(), 11);

    let obs: Vec<PortfolioObs> = returns.iter().map(|r| r.to_obs()).collect();
    let alphas = estimate_alphas(
        &obs,
        &factors,
        &AlphaConfig {
            model: FactorModel::FamaFrench3,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(alphas.len(), 11);

    let alpha_table = AlphaTable::new("FF3 alphas".to_string(), alphas.clone());
    let ascii = alpha_table.to_ascii_table();
    assert!(ascii.contains("FF3 alphas"));
    assert!(ascii.contains("H-L"));
    assert!(alpha_table.to_markdown().contains("| Portfolio |"));

    let decile_table = DecileTable::new("Deciles".to_string(), summary);
    assert!(decile_table.to_ascii_table().contains("Stocks"));

    let csv = alphas.export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 12);
    assert!(csv.starts_with("portfolio,model,mean_ret,alpha,alpha_t"));

    let json = returns.export_to_string(ExportFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), returns.len());

    let report = RunReportBuilder::new()
        .job("liquidity")
        .parameters(&PortfolioConfig::default())
        .unwrap()
        .rows("portfolio_returns", returns.len())
        .rows("alphas", alphas.len())
        .build()
        .unwrap();
    let report_json = report.to_json().unwrap();
    assert!(report_json.contains("\"groups\": 10"));
    assert!(report_json.contains("\"alphas\": 11"));
}

#[test]
fn test_measure_summary_table_from_values() {
    let (_, measures, _) = synthetic_panel();
    let values: Vec<f64> = measures.iter().map(|m| m.value).collect();
    let summary = MeasureSummary::from_values("signal", &values).unwrap();
    assert_eq!(summary.stats.n, 1_200);
    assert_eq!(summary.stats.min, 0.0);
    assert_eq!(summary.stats.max, 29.0);

    let table = SummaryTable::new("Signal".to_string(), vec![summary]);
    assert!(table.to_string().contains("signal"));
}
