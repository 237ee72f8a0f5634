use analytics::{AnalysisReport, AnalyticsEngine, ForecastSeries, ReportRow, derive_metrics};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use configuration::{ChartFormat, Config, load_config};
use core_types::{FinancialTable, reference_dataset};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// The main entry point for the shoplens analysis tool.
fn main() -> Result<()> {
    // Load RUST_LOG and SHOPLENS__* overrides from an optional .env file.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let table = build_table(&config)?;
    let engine = AnalyticsEngine::new(config.forecast.clone(), config.clustering.clone());

    // Execute the appropriate command; no subcommand runs the whole pipeline.
    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => handle_run(&engine, &table, config, args, cli.json),
        Commands::Table => handle_table(&table, cli.json),
        Commands::Forecast => handle_forecast(&engine, &table, cli.json),
        Commands::Cluster => handle_cluster(&engine, &table, cli.json),
        Commands::Charts(args) => handle_charts(&engine, &table, config, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Growth, margin, forecast and clustering analysis of a multi-unit retailer's
/// annual figures.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (optional).
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis: tables, forecasts, clusters and charts (default).
    Run(RunArgs),
    /// Print the figures with their derived growth rates and margins.
    Table,
    /// Print the revenue and revenue-growth forecasts.
    Forecast,
    /// Print the cluster assigned to each period.
    Cluster,
    /// Render the charts only.
    Charts(ChartArgs),
}

#[derive(Parser, Default)]
struct RunArgs {
    /// Skip chart rendering.
    #[arg(long)]
    no_charts: bool,

    #[command(flatten)]
    chart: ChartArgs,
}

#[derive(Parser, Default)]
struct ChartArgs {
    /// Directory the charts are written to (overrides the configuration).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Image format of the charts (overrides the configuration).
    #[arg(long, value_enum)]
    format: Option<ChartFormat>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn build_table(config: &Config) -> Result<FinancialTable> {
    match &config.records {
        Some(records) => {
            tracing::info!(rows = records.len(), "Using financial records from configuration.");
            FinancialTable::new(records.clone()).context("Invalid records in configuration")
        }
        None => Ok(reference_dataset()),
    }
}

fn handle_run(
    engine: &AnalyticsEngine,
    table: &FinancialTable,
    config: Config,
    args: RunArgs,
    json: bool,
) -> Result<()> {
    let report = engine.analyze(table).context("Analysis failed")?;
    println!("{}", run_output(&report, json)?);

    if args.no_charts {
        tracing::info!("Chart rendering skipped.");
        return Ok(());
    }
    let status = render_charts(&report, config, args.chart)?;
    // Keep stdout a single JSON document when --json is set.
    if json {
        tracing::info!("{}", status);
    } else {
        println!("{}", status);
    }
    Ok(())
}

fn handle_table(table: &FinancialTable, json: bool) -> Result<()> {
    if json {
        println!("{}", table_json(table)?);
        return Ok(());
    }

    let metrics = derive_metrics(table);
    let mut table_out = new_table(&[
        "Year", "Revenues", "Rev. Growth %", "Shops", "Shop Growth %", "AUV", "SSS Growth %",
        "Cost %", "SG&A %", "Net Margin %",
    ]);
    for (record, m) in table.records().iter().zip(&metrics) {
        table_out.add_row(vec![
            Cell::new(record.period),
            number_cell(Some(record.total_revenues)),
            number_cell(m.revenue_growth),
            Cell::new(record.shop_count).set_alignment(CellAlignment::Right),
            number_cell(m.shop_count_growth),
            number_cell(Some(record.systemwide_auv)),
            number_cell(Some(record.same_shop_sales_growth)),
            number_cell(m.cost_of_sales_pct),
            number_cell(m.sga_pct),
            number_cell(m.net_income_margin),
        ]);
    }
    println!("{}", table_out);
    Ok(())
}

fn handle_forecast(engine: &AnalyticsEngine, table: &FinancialTable, json: bool) -> Result<()> {
    let metrics = derive_metrics(table);
    let revenue = engine.forecast_revenue(table).context("Revenue forecast failed")?;
    let growth = engine
        .forecast_growth(table, &metrics)
        .context("Revenue growth forecast failed")?;

    if json {
        let forecasts = serde_json::json!({
            "revenue_forecast": revenue,
            "growth_forecast": growth,
        });
        println!("{}", serde_json::to_string_pretty(&forecasts)?);
    } else {
        println!("{}", forecast_lines(&revenue, &growth).join("\n"));
    }
    Ok(())
}

fn handle_cluster(engine: &AnalyticsEngine, table: &FinancialTable, json: bool) -> Result<()> {
    let clusters = engine.cluster(table).context("Clustering failed")?;

    if json {
        let rows: Vec<serde_json::Value> = table
            .records()
            .iter()
            .zip(&clusters)
            .map(|(r, cluster)| serde_json::json!({ "period": r.period, "cluster": cluster }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut out = new_table(&["Year", "Systemwide AUV", "SSS Growth %", "Cluster"]);
    for (record, cluster) in table.records().iter().zip(&clusters) {
        out.add_row(vec![
            Cell::new(record.period),
            number_cell(Some(record.systemwide_auv)),
            number_cell(Some(record.same_shop_sales_growth)),
            Cell::new(cluster).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", out);
    Ok(())
}

fn handle_charts(
    engine: &AnalyticsEngine,
    table: &FinancialTable,
    config: Config,
    args: ChartArgs,
) -> Result<()> {
    // The charts do not show cluster labels, so k-means is not run.
    let report = engine.analyze_unclustered(table).context("Analysis failed")?;
    println!("{}", render_charts(&report, config, args)?);
    Ok(())
}

/// Renders every chart and returns a one-line summary of what was written.
fn render_charts(report: &AnalysisReport, config: Config, args: ChartArgs) -> Result<String> {
    let mut settings = config.charts;
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }

    let written = charts::render_all(report, &settings).context("Chart rendering failed")?;
    Ok(format!(
        "Wrote {} charts to {}",
        written.len(),
        settings.output_dir.display()
    ))
}

// ==============================================================================
// Output Helpers
// ==============================================================================

/// Everything `run` prints to stdout before the charts are rendered.
fn run_output(report: &AnalysisReport, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let forecasts = forecast_lines(&report.revenue_forecast, &report.growth_forecast);
    Ok(format!("{}\n{}", report_table(report), forecasts.join("\n")))
}

/// The derived-metrics rows in the same flattened shape as the report's rows.
fn table_json(table: &FinancialTable) -> Result<String> {
    let rows: Vec<ReportRow> = table
        .records()
        .iter()
        .cloned()
        .zip(derive_metrics(table))
        .map(|(record, metrics)| ReportRow {
            record,
            metrics,
            cluster: None,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn report_table(report: &AnalysisReport) -> Table {
    let mut table = new_table(&[
        "Year", "Revenues", "Rev. Growth %", "Shops", "Shop Growth %", "AUV", "SSS Growth %",
        "Cost %", "SG&A %", "Net Margin %", "Cluster",
    ]);
    for row in &report.rows {
        let (r, m) = (&row.record, &row.metrics);
        let cluster = row.cluster.map_or_else(|| "n/a".to_string(), |c| c.to_string());
        table.add_row(vec![
            Cell::new(r.period),
            number_cell(Some(r.total_revenues)),
            number_cell(m.revenue_growth),
            Cell::new(r.shop_count).set_alignment(CellAlignment::Right),
            number_cell(m.shop_count_growth),
            number_cell(Some(r.systemwide_auv)),
            number_cell(Some(r.same_shop_sales_growth)),
            number_cell(m.cost_of_sales_pct),
            number_cell(m.sga_pct),
            number_cell(m.net_income_margin),
            Cell::new(cluster).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn forecast_lines(revenue: &ForecastSeries, growth: &ForecastSeries) -> Vec<String> {
    let mut lines = series_lines("Revenue forecast for", revenue, "");
    lines.extend(series_lines("Forecasted revenue growth for", growth, "%"));
    lines
}

fn series_lines(prefix: &str, series: &ForecastSeries, unit: &str) -> Vec<String> {
    tracing::debug!(method = %series.method, params = ?series.params, "Forecast series.");
    series
        .points
        .iter()
        .map(|point| format!("{} {}: {:.2}{}", prefix, point.period, point.value, unit))
        .collect()
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

fn number_cell(value: Option<Decimal>) -> Cell {
    let text = match value {
        Some(v) => v.round_dp(2).to_string(),
        None => "n/a".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_report() -> AnalysisReport {
        AnalyticsEngine::default().analyze(&reference_dataset()).unwrap()
    }

    #[test]
    fn json_run_output_is_a_single_document() {
        let report = reference_report();
        let output = run_output(&report, true).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["rows"].as_array().map(Vec::len), Some(4));
        assert_eq!(parsed["revenue_forecast"]["points"][0]["period"], "2024");
        assert!(!output.contains("Wrote"));
    }

    #[test]
    fn text_run_output_ends_with_forecast_lines() {
        let report = reference_report();
        let output = run_output(&report, false).unwrap();

        let tail: Vec<&str> = output.lines().rev().take(3).collect();
        assert!(tail[2].starts_with("Revenue forecast for 2024: "));
        assert!(tail[1].starts_with("Forecasted revenue growth for 2024: "));
        assert!(tail[0].starts_with("Forecasted revenue growth for 2025: "));
        assert!(tail[0].ends_with('%'));
    }

    #[test]
    fn forecast_lines_use_two_decimals() {
        let report = reference_report();
        let lines = forecast_lines(&report.revenue_forecast, &report.growth_forecast);
        assert_eq!(lines.len(), 3);

        let value = lines[0].rsplit(": ").next().unwrap();
        let decimals = value.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 2);
    }

    #[test]
    fn table_json_matches_report_row_shape() {
        let table = reference_dataset();
        let rows: serde_json::Value = serde_json::from_str(&table_json(&table).unwrap()).unwrap();
        let report = serde_json::to_value(reference_report()).unwrap();

        let row = &rows[1];
        assert!(row.get("record").is_none());
        assert!(row.get("metrics").is_none());
        assert!(row.get("cluster").is_none());
        assert_eq!(row["period"], "2021");
        for key in ["total_revenues", "revenue_growth", "net_income_margin"] {
            assert_eq!(row[key], report["rows"][1][key], "{}", key);
        }
    }
}
