//! Plain-text report: summary cards, charts as text bars, and detail tables.

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};

use portfolio_analyzer_core::format::{
    format_money, format_percent, format_quantity, format_signed_percent,
};
use portfolio_analyzer_core::models::analytics::{HoldingRow, PortfolioReport};
use portfolio_analyzer_core::models::chart::{
    AllocationSlice, HistoricalChart, HistoricalPeriod, PerformanceBar, RiskReturnPoint,
};
use portfolio_analyzer_core::models::holding::AssetCategory;
use portfolio_analyzer_core::PortfolioAnalyzer;

const BAR_WIDTH: usize = 30;

pub struct ReportOptions {
    pub categories: Vec<AssetCategory>,
    pub risk: bool,
    pub history: Vec<String>,
    pub period: HistoricalPeriod,
    pub json: bool,
}

pub async fn run(analyzer: &PortfolioAnalyzer, options: &ReportOptions) -> Result<()> {
    let filter = (!options.categories.is_empty()).then_some(options.categories.as_slice());
    let report = analyzer.evaluate(filter).await;

    if options.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    let symbol = analyzer.settings().currency_symbol.as_str();

    if report.is_sample {
        println!("Showing the sample portfolio. Use --file to analyze your own holdings.\n");
    }
    if report.rows.is_empty() {
        println!("No holdings to analyze.");
        return Ok(());
    }

    println!("{}\n", summary_table(&report, symbol));
    println!(
        "Portfolio Allocation by Category\n{}\n",
        allocation_table(&analyzer.allocation_chart(&report), symbol)
    );
    println!(
        "Asset Performance\n{}\n",
        performance_table(&analyzer.performance_chart(&report))
    );
    println!("Portfolio Details\n{}", details_table(&report.rows, symbol));

    if report.metrics.missing_prices > 0 {
        println!(
            "\n{} holding(s) had no price available and are valued at {}.",
            report.metrics.missing_prices,
            format_money(0.0, symbol)
        );
    }

    if options.risk {
        let points = analyzer.risk_return(&report.rows).await;
        println!("\nRisk vs. Return\n{}", risk_table(&points, symbol));
    }

    if !options.history.is_empty() {
        let chart = analyzer.historical_chart(&options.history, options.period).await;
        println!("\nHistorical Performance ({})", chart.period);
        if chart.is_empty() {
            println!("Historical data not available for the selected assets.");
        } else {
            println!("{}", history_table(&chart));
        }
        if !chart.skipped.is_empty() {
            println!("No data for: {}", chart.skipped.join(", "));
        }
    }

    Ok(())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, columns: &[usize]) {
    for &idx in columns {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn sign_color(value: f64) -> Color {
    if value < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

/// `width` block characters scaled by `fraction` (clamped to 0..=1).
pub fn text_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    "█".repeat((fraction * width as f64).round() as usize)
}

pub fn summary_table(report: &PortfolioReport, symbol: &str) -> Table {
    let m = &report.metrics;
    let mut table = new_table();
    table.set_header(vec!["Total Value", "Gain/Loss", "Diversification", "Holdings"]);
    table.add_row(vec![
        Cell::new(format_money(m.total_value, symbol)),
        Cell::new(format!(
            "{} ({})",
            format_money(m.total_gain_loss, symbol),
            format_signed_percent(m.total_gain_loss_pct)
        ))
        .fg(sign_color(m.total_gain_loss)),
        Cell::new(format!("{:.1}/100", m.diversification_score)),
        Cell::new(m.holding_count),
    ]);
    table.add_row(vec![
        Cell::new(format!("Cost {}", format_money(m.total_cost, symbol))),
        Cell::new(format!("Weighted return {}", format_signed_percent(m.weighted_return))),
        Cell::new(format!("Categories {:.1}/100", m.category_diversification_score)),
        Cell::new(format!("Volatility {}", format_percent(m.volatility))),
    ]);
    table
}

pub fn allocation_table(slices: &[AllocationSlice], symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Category", "Value", "Share", ""]);
    for slice in slices {
        table.add_row(vec![
            Cell::new(slice.category),
            Cell::new(format_money(slice.value, symbol)),
            Cell::new(format_percent(slice.percent)),
            Cell::new(text_bar(slice.percent / 100.0, BAR_WIDTH)).fg(Color::Cyan),
        ]);
    }
    right_align(&mut table, &[1, 2]);
    table
}

/// Bars are scaled to the largest absolute return.
pub fn performance_table(bars: &[PerformanceBar]) -> Table {
    let scale = bars
        .iter()
        .map(|b| b.return_pct.abs())
        .fold(0.0_f64, f64::max);

    let mut table = new_table();
    table.set_header(vec!["Asset", "Return", ""]);
    for bar in bars {
        let fraction = if scale > 0.0 { bar.return_pct.abs() / scale } else { 0.0 };
        let color = sign_color(bar.return_pct);
        table.add_row(vec![
            Cell::new(&bar.symbol),
            Cell::new(format_signed_percent(bar.return_pct)).fg(color),
            Cell::new(text_bar(fraction, BAR_WIDTH)).fg(color),
        ]);
    }
    right_align(&mut table, &[1]);
    table
}

/// Rows sorted by current value, largest first.
pub fn details_table(rows: &[HoldingRow], symbol: &str) -> Table {
    let mut sorted: Vec<&HoldingRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        b.current_value
            .partial_cmp(&a.current_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = new_table();
    table.set_header(vec![
        "Asset",
        "Category",
        "Quantity",
        "Purchase Price",
        "Current Price",
        "Source",
        "Value",
        "Gain/Loss",
        "Return",
        "Weight",
    ]);
    for row in sorted {
        let color = sign_color(row.gain_loss);
        table.add_row(vec![
            Cell::new(&row.symbol),
            Cell::new(row.category),
            Cell::new(format_quantity(row.quantity)),
            Cell::new(format_money(row.purchase_price, symbol)),
            Cell::new(format_money(row.current_price, symbol)),
            Cell::new(&row.price_source),
            Cell::new(format_money(row.current_value, symbol)),
            Cell::new(format_money(row.gain_loss, symbol)).fg(color),
            Cell::new(format_signed_percent(row.return_pct)).fg(color),
            Cell::new(format_percent(row.weight_pct)),
        ]);
    }
    right_align(&mut table, &[2, 3, 4, 6, 7, 8, 9]);
    table
}

pub fn risk_table(points: &[RiskReturnPoint], symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Asset", "Category", "Risk (volatility)", "Return", "Value"]);
    for point in points {
        let risk = if point.estimated {
            format!("~{}", format_percent(point.risk_pct))
        } else {
            format_percent(point.risk_pct)
        };
        table.add_row(vec![
            Cell::new(&point.symbol),
            Cell::new(point.category),
            Cell::new(risk),
            Cell::new(format_signed_percent(point.return_pct)).fg(sign_color(point.return_pct)),
            Cell::new(format_money(point.value, symbol)),
        ]);
    }
    right_align(&mut table, &[2, 3, 4]);
    table
}

pub fn history_table(chart: &HistoricalChart) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Asset", "From", "To", "Points", "Change"]);
    for series in &chart.series {
        let (Some((start, _)), Some((end, _))) = (series.points.first(), series.points.last()) else {
            continue;
        };
        let change = series.total_change();
        table.add_row(vec![
            Cell::new(&series.symbol),
            Cell::new(start.format("%Y-%m-%d")),
            Cell::new(end.format("%Y-%m-%d")),
            Cell::new(series.points.len()),
            Cell::new(format_signed_percent(change)).fg(sign_color(change)),
        ]);
    }
    right_align(&mut table, &[3, 4]);
    table
}
