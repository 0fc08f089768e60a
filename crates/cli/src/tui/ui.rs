use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Cell, Chart, Dataset, GraphType, Paragraph, Row,
        Table, Tabs, Wrap,
    },
    Frame,
};

use portfolio_analyzer_core::format::{
    format_money, format_percent, format_quantity, format_signed_percent,
};
use portfolio_analyzer_core::models::analytics::{HoldingRow, PortfolioReport};
use portfolio_analyzer_core::models::holding::AssetCategory;
use portfolio_analyzer_core::models::price::PriceSource;

use super::app::{App, Tab};
use super::form::Field;

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::LightGreen,
    Color::LightBlue,
    Color::LightRed,
    Color::White,
    Color::Gray,
];

fn palette(idx: usize) -> Color {
    PALETTE[idx % PALETTE.len()]
}

fn sign_style(value: f64) -> Style {
    if value < 0.0 {
        Style::new().fg(Color::Red)
    } else {
        Style::new().fg(Color::Green)
    }
}

fn header_style() -> Style {
    Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub fn render(frame: &mut Frame, app: &App) {
    let [tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    let tabs = Tabs::new(Tab::all().iter().map(|t| t.title()))
        .block(Block::bordered().title("Investment Portfolio Analyzer"))
        .highlight_style(header_style())
        .select(app.tab.index());
    frame.render_widget(tabs, tabs_area);

    match app.tab {
        Tab::Analysis => render_analysis(frame, body_area, app),
        Tab::AddInvestments => render_add_investments(frame, body_area, app),
        Tab::Advanced => render_advanced(frame, body_area, app),
    }

    render_footer(frame, footer_area, app);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help = match app.tab {
        Tab::Analysis => "↑/↓ category  Space toggle  a show all  r refresh  Tab/1-3 switch  q quit",
        Tab::AddInvestments => {
            "↑/↓ field  ←/→ category  Enter add  Esc reset form  Ctrl-L clear portfolio  Ctrl-S sample data  Tab switch  Ctrl-C quit"
        }
        Tab::Advanced => "↑/↓ asset  Space select  p period  r refresh  Tab/1-3 switch  q quit",
    };

    let status = if app.is_loading() {
        Line::styled("Fetching market data...", Style::new().fg(Color::Cyan))
    } else {
        match &app.status {
            Some(status) if status.is_error => {
                Line::styled(status.message.clone(), Style::new().fg(Color::Red))
            }
            Some(status) => Line::styled(status.message.clone(), Style::new().fg(Color::Green)),
            None => Line::default(),
        }
    };

    let footer = Paragraph::new(vec![Line::styled(help, Style::new().fg(Color::Gray)), status])
        .block(Block::bordered());
    frame.render_widget(footer, area);
}

fn placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title(title.to_string()));
    frame.render_widget(p, area);
}

// ── Portfolio Analysis ──────────────────────────────────────────────

fn render_analysis(frame: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.report else {
        placeholder(frame, area, "Portfolio Analysis", "Loading...");
        return;
    };
    let symbol = app.analyzer.settings().currency_symbol.as_str();

    let notice_height = if report.is_sample { 1 } else { 0 };
    let [notice_area, cards_area, main_area] = Layout::vertical([
        Constraint::Length(notice_height),
        Constraint::Length(4),
        Constraint::Fill(1),
    ])
    .areas(area);

    if report.is_sample {
        let notice = Line::styled(
            "Showing sample data. Add your own investments in the 'Add Investments' tab.",
            Style::new().fg(Color::Cyan),
        );
        frame.render_widget(Paragraph::new(notice), notice_area);
    }

    render_metric_cards(frame, cards_area, report, symbol);

    let [filter_area, charts_area] =
        Layout::horizontal([Constraint::Length(26), Constraint::Fill(1)]).areas(main_area);
    render_category_filter(frame, filter_area, app);

    if report.rows.is_empty() {
        let message = if app.analyzer.is_empty() {
            "Your portfolio is empty. Add investments in the 'Add Investments' tab or press Ctrl-S there to load sample data."
        } else {
            "No holdings match the selected categories."
        };
        placeholder(frame, charts_area, "Portfolio", message);
        return;
    }

    let [top_area, details_area] =
        Layout::vertical([Constraint::Percentage(45), Constraint::Fill(1)]).areas(charts_area);
    let [allocation_area, performance_area] =
        Layout::horizontal([Constraint::Percentage(50); 2]).areas(top_area);

    render_allocation(frame, allocation_area, app, report);
    render_performance(frame, performance_area, app, report);
    render_details(frame, details_area, &report.rows, symbol);
}

fn metric_card<'a>(title: &'a str, value: Span<'a>, detail: Span<'a>) -> Paragraph<'a> {
    Paragraph::new(vec![Line::from(value), Line::from(detail)]).block(Block::bordered().title(title))
}

fn render_metric_cards(frame: &mut Frame, area: Rect, report: &PortfolioReport, symbol: &str) {
    let m = &report.metrics;
    let areas: [Rect; 5] = Layout::horizontal([Constraint::Fill(1); 5]).areas(area);
    let bold = Style::new().add_modifier(Modifier::BOLD);

    let holdings_detail = if m.missing_prices > 0 {
        Span::styled(
            format!("{} without price", m.missing_prices),
            Style::new().fg(Color::Red),
        )
    } else {
        Span::raw("all priced")
    };

    let cards = [
        metric_card(
            "Total Value",
            Span::styled(format_money(m.total_value, symbol), bold),
            Span::raw(format!("Cost {}", format_money(m.total_cost, symbol))),
        ),
        metric_card(
            "Total Gain/Loss",
            Span::styled(
                format_money(m.total_gain_loss, symbol),
                sign_style(m.total_gain_loss).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format_signed_percent(m.total_gain_loss_pct),
                sign_style(m.total_gain_loss_pct),
            ),
        ),
        metric_card(
            "Weighted Return",
            Span::styled(
                format_signed_percent(m.weighted_return),
                sign_style(m.weighted_return).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("Volatility {}", format_percent(m.volatility))),
        ),
        metric_card(
            "Diversification Score",
            Span::styled(format!("{:.1}/100", m.diversification_score), bold),
            Span::raw(format!("Categories {:.1}/100", m.category_diversification_score)),
        ),
        metric_card(
            "Holdings",
            Span::styled(m.holding_count.to_string(), bold),
            holdings_detail,
        ),
    ];

    for (card, area) in cards.into_iter().zip(areas) {
        frame.render_widget(card, area);
    }
}

fn render_category_filter(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .categories
        .iter()
        .enumerate()
        .map(|(idx, category)| {
            let cursor = if idx == app.category_cursor { ">" } else { " " };
            let check = if app.hidden_categories.contains(category) { "[ ]" } else { "[x]" };
            let style = if idx == app.category_cursor && app.tab == Tab::Analysis {
                Style::new().fg(Color::Yellow)
            } else {
                Style::new()
            };
            Line::styled(format!("{cursor} {check} {category}"), style)
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title("Filter by Category")),
        area,
    );
}

fn render_allocation(frame: &mut Frame, area: Rect, app: &App, report: &PortfolioReport) {
    let slices = app.analyzer.allocation_chart(report);
    let bars: Vec<Bar> = slices
        .iter()
        .enumerate()
        .map(|(idx, slice)| {
            Bar::default()
                .label(Line::from(short_category(slice.category)))
                .value((slice.percent * 10.0).round() as u64)
                .text_value(format_percent(slice.percent))
                .style(Style::new().fg(palette(idx)))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::bordered().title("Allocation by Category"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(1000)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_performance(frame: &mut Frame, area: Rect, app: &App, report: &PortfolioReport) {
    let performance = app.analyzer.performance_chart(report);
    let bars: Vec<Bar> = performance
        .iter()
        .map(|bar| {
            Bar::default()
                .label(Line::from(bar.symbol.clone()))
                .value((bar.return_pct.abs() * 10.0).round() as u64)
                .text_value(format_signed_percent(bar.return_pct))
                .style(sign_style(bar.return_pct))
        })
        .collect();
    let max = performance
        .iter()
        .map(|bar| (bar.return_pct.abs() * 10.0).round() as u64)
        .max()
        .unwrap_or(0)
        .max(1);

    let chart = BarChart::default()
        .block(Block::bordered().title("Asset Performance (Return %)"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(max)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_details(frame: &mut Frame, area: Rect, rows: &[HoldingRow], symbol: &str) {
    let mut sorted: Vec<&HoldingRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        b.current_value
            .partial_cmp(&a.current_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let header = Row::new([
        "Asset", "Category", "Qty", "Price", "Value", "Gain/Loss", "Return", "Weight",
    ])
    .style(header_style());

    let table_rows = sorted.into_iter().map(|row| {
        let style = sign_style(row.gain_loss);
        let price = if row.price_source == PriceSource::Missing {
            Cell::from("n/a").style(Style::new().fg(Color::Red))
        } else {
            Cell::from(format_money(row.current_price, symbol))
        };
        Row::new(vec![
            Cell::from(row.symbol.clone()),
            Cell::from(row.category.to_string()),
            Cell::from(format_quantity(row.quantity)),
            price,
            Cell::from(format_money(row.current_value, symbol)),
            Cell::from(format_money(row.gain_loss, symbol)).style(style),
            Cell::from(format_signed_percent(row.return_pct)).style(style),
            Cell::from(format_percent(row.weight_pct)),
        ])
    });

    let table = Table::new(
        table_rows,
        [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .block(Block::bordered().title("Portfolio Details"));
    frame.render_widget(table, area);
}

// ── Add Investments ─────────────────────────────────────────────────

fn render_add_investments(frame: &mut Frame, area: Rect, app: &App) {
    let [form_area, holdings_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Fill(1)]).areas(area);

    let mut lines = Vec::new();
    for field in Field::all() {
        let focused = app.form.focus == *field;
        let label_style = if focused { header_style() } else { Style::new() };
        let value = match field {
            Field::Category => format!("< {} >", app.form.category),
            _ if focused => format!("{}_", app.form.value(*field)),
            _ => app.form.value(*field),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} {:<28}", if focused { ">" } else { " " }, field.label()), label_style),
            Span::raw(value),
        ]));
        lines.push(Line::default());
    }
    lines.push(Line::styled(
        "Enter adds the investment. Leave Current Price empty to fetch a market quote.",
        Style::new().fg(Color::Gray),
    ));
    lines.push(Line::styled(
        "Ctrl-L clears the portfolio. Ctrl-S loads the sample data.",
        Style::new().fg(Color::Gray),
    ));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title("Add New Investment")),
        form_area,
    );

    let symbol = app.analyzer.settings().currency_symbol.as_str();
    let holdings = app.analyzer.holdings();
    let rows = holdings.iter().map(|h| {
        Row::new(vec![
            Cell::from(h.symbol.clone()),
            Cell::from(h.category.to_string()),
            Cell::from(format_quantity(h.quantity)),
            Cell::from(format_money(h.purchase_price, symbol)),
            Cell::from(
                h.current_price
                    .map(|p| format_money(p, symbol))
                    .unwrap_or_else(|| "market".to_string()),
            ),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Fill(2),
        ],
    )
    .header(Row::new(["Asset", "Category", "Qty", "Purchase", "Current"]).style(header_style()))
    .block(Block::bordered().title(format!("Current Holdings ({})", holdings.len())));
    frame.render_widget(table, holdings_area);
}

// ── Advanced Analytics ──────────────────────────────────────────────

fn render_advanced(frame: &mut Frame, area: Rect, app: &App) {
    let [risk_area, history_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Fill(1)]).areas(area);
    render_risk_scatter(frame, risk_area, app);

    let [picker_area, chart_area] =
        Layout::horizontal([Constraint::Length(26), Constraint::Fill(1)]).areas(history_area);
    render_asset_picker(frame, picker_area, app);
    render_history(frame, chart_area, app);
}

fn render_risk_scatter(frame: &mut Frame, area: Rect, app: &App) {
    if app.risk.is_empty() {
        placeholder(frame, area, "Risk vs. Return", "No holdings to plot.");
        return;
    }

    // One dataset per category so the legend doubles as a color key.
    let mut groups: Vec<(AssetCategory, Vec<(f64, f64)>)> = Vec::new();
    for point in &app.risk {
        let xy = (point.risk_pct, point.return_pct);
        match groups.iter_mut().find(|(c, _)| *c == point.category) {
            Some((_, points)) => points.push(xy),
            None => groups.push((point.category, vec![xy])),
        }
    }

    let datasets: Vec<Dataset> = groups
        .iter()
        .enumerate()
        .map(|(idx, (category, points))| {
            Dataset::default()
                .name(category.to_string())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::new().fg(palette(idx)))
                .data(points)
        })
        .collect();

    let x = padded_bounds(app.risk.iter().map(|p| p.risk_pct), true);
    let y = padded_bounds(app.risk.iter().map(|p| p.return_pct), false);

    let title = if app.risk.iter().any(|p| p.estimated) {
        "Risk vs. Return (some risk values estimated from return)"
    } else {
        "Risk vs. Return"
    };

    let chart = Chart::new(datasets)
        .block(Block::bordered().title(title))
        .x_axis(
            Axis::default()
                .title("Risk (volatility %)")
                .bounds(x)
                .labels(axis_labels(x)),
        )
        .y_axis(
            Axis::default()
                .title("Return %")
                .bounds(y)
                .labels(axis_labels(y)),
        );
    frame.render_widget(chart, area);
}

fn render_asset_picker(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .asset_symbols()
        .into_iter()
        .enumerate()
        .map(|(idx, symbol)| {
            let cursor = if idx == app.asset_cursor { ">" } else { " " };
            let check = if app.history_selection.contains(&symbol) { "[x]" } else { "[ ]" };
            let style = if idx == app.asset_cursor {
                Style::new().fg(Color::Yellow)
            } else {
                Style::new()
            };
            Line::styled(format!("{cursor} {check} {symbol}"), style)
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(format!("Assets, period {}", app.period))),
        area,
    );
}

fn render_history(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!("Historical Performance ({}), % change from start", app.period);
    let Some(chart) = &app.history else {
        placeholder(frame, area, &title, "Loading...");
        return;
    };
    let origin = chart
        .series
        .iter()
        .filter_map(|s| s.points.first().map(|(date, _)| *date))
        .min();
    let (Some(origin), false) = (origin, chart.is_empty()) else {
        placeholder(
            frame,
            area,
            &title,
            "Historical data not available for the selected assets.",
        );
        return;
    };

    let data: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .map(|(date, pct)| ((*date - origin).num_days() as f64, *pct))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(&data)
        .enumerate()
        .map(|(idx, (series, points))| {
            Dataset::default()
                .name(series.symbol.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::new().fg(palette(idx)))
                .data(points)
        })
        .collect();

    let last_day = data
        .iter()
        .flat_map(|points| points.iter().map(|(x, _)| *x))
        .fold(1.0_f64, f64::max);
    let end = origin + chrono::Duration::days(last_day as i64);
    let y = padded_bounds(data.iter().flatten().map(|(_, pct)| *pct), false);

    let mut block = Block::bordered().title(title);
    if !chart.skipped.is_empty() {
        block = block.title_bottom(Line::styled(
            format!(" no data: {} ", chart.skipped.join(", ")),
            Style::new().fg(Color::Red),
        ));
    }

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, last_day])
                .labels(vec![
                    origin.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string(),
                ]),
        )
        .y_axis(Axis::default().bounds(y).labels(axis_labels(y)));
    frame.render_widget(widget, area);
}

// ── Helpers ─────────────────────────────────────────────────────────

fn short_category(category: AssetCategory) -> &'static str {
    match category {
        AssetCategory::Stocks => "Stocks",
        AssetCategory::Etfs => "ETFs",
        AssetCategory::Bonds => "Bonds",
        AssetCategory::Crypto => "Crypto",
        AssetCategory::RealEstate => "RealEst",
        AssetCategory::Commodities => "Commod",
        AssetCategory::Cash => "Cash",
        AssetCategory::Other => "Other",
    }
}

/// Axis bounds around `values` with 10% headroom. Risk axes start at zero.
fn padded_bounds(values: impl Iterator<Item = f64>, from_zero: bool) -> [f64; 2] {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if from_zero {
        lo = lo.min(0.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.1;
    [if from_zero && lo >= 0.0 { lo } else { lo - pad }, hi + pad]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{v:.1}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_analyzer_core::models::holding::Holding;
    use portfolio_analyzer_core::models::settings::Settings;
    use portfolio_analyzer_core::providers::registry::PriceProviderRegistry;
    use portfolio_analyzer_core::PortfolioAnalyzer;
    use ratatui::{backend::TestBackend, Terminal};

    fn offline_app() -> App {
        App::new(PortfolioAnalyzer::with_registry(
            Settings::default(),
            PriceProviderRegistry::new(),
        ))
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(180, 50)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn cards_show_weighted_return_and_volatility() {
        let mut app = offline_app();
        app.analyzer.load_sample();
        app.refresh().await;

        let text = screen_text(&app);
        assert!(text.contains("Weighted Return"));
        assert!(text.contains("Volatility"));
        assert!(text.contains("all priced"));
    }

    #[tokio::test]
    async fn volatility_stays_visible_with_missing_prices() {
        let mut app = offline_app();
        app.analyzer
            .add_holding(Holding::new("AAPL", AssetCategory::Stocks, 10.0, 150.0))
            .unwrap();
        app.analyzer
            .add_holding(
                Holding::new("VTI", AssetCategory::Etfs, 5.0, 200.0).with_current_price(220.0),
            )
            .unwrap();
        app.refresh().await;

        let text = screen_text(&app);
        assert!(text.contains("1 without price"));
        assert!(text.contains("Volatility"));
        assert!(text.contains("Weighted Return"));
    }
}
