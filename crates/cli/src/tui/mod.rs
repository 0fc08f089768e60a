//! Full-screen dashboard with three tabs: analysis, manual entry, and
//! risk/history charts.

mod app;
mod form;
mod ui;

use std::time::Duration;

use anyhow::Result;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;

use portfolio_analyzer_core::PortfolioAnalyzer;

use app::App;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub async fn run(analyzer: PortfolioAnalyzer) -> Result<()> {
    tracing::info!(holdings = analyzer.holdings().len(), "dashboard started");
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, App::new(analyzer)).await;
    ratatui::restore();
    if let Err(e) = &result {
        tracing::error!(error = %e, "dashboard exited with an error");
    }
    result
}

async fn run_app(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Draw the loading state first, then block on the fetch.
        if app.is_loading() {
            app.refresh().await;
            continue;
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
