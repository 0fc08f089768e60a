use std::collections::BTreeSet;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use portfolio_analyzer_core::models::analytics::PortfolioReport;
use portfolio_analyzer_core::models::chart::{HistoricalChart, HistoricalPeriod, RiskReturnPoint};
use portfolio_analyzer_core::models::holding::AssetCategory;
use portfolio_analyzer_core::PortfolioAnalyzer;

use super::form::{EntryForm, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Analysis,
    AddInvestments,
    Advanced,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Analysis => "Portfolio Analysis",
            Tab::AddInvestments => "Add Investments",
            Tab::Advanced => "Advanced Analytics",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[Tab::Analysis, Tab::AddInvestments, Tab::Advanced]
    }

    pub fn index(self) -> usize {
        Self::all().iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        let tabs = Self::all();
        tabs[(self.index() + 1) % tabs.len()]
    }

    fn prev(self) -> Self {
        let tabs = Self::all();
        tabs[(self.index() + tabs.len() - 1) % tabs.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

/// Dashboard state. Keys mutate it synchronously; anything that needs
/// prices is deferred to [`App::refresh`].
pub struct App {
    pub analyzer: PortfolioAnalyzer,
    pub tab: Tab,
    pub should_quit: bool,
    pub report: Option<PortfolioReport>,

    /// Categories present in the portfolio
    pub categories: Vec<AssetCategory>,
    /// Categories unticked in the filter; everything else is shown
    pub hidden_categories: BTreeSet<AssetCategory>,
    pub category_cursor: usize,

    pub form: EntryForm,
    pub status: Option<Status>,

    pub risk: Vec<RiskReturnPoint>,
    pub history: Option<HistoricalChart>,
    pub history_selection: Vec<String>,
    pub asset_cursor: usize,
    pub period: HistoricalPeriod,

    report_stale: bool,
    risk_stale: bool,
    history_stale: bool,
}

impl App {
    pub fn new(analyzer: PortfolioAnalyzer) -> Self {
        let period = analyzer.settings().default_period;
        Self {
            analyzer,
            tab: Tab::Analysis,
            should_quit: false,
            report: None,
            categories: Vec::new(),
            hidden_categories: BTreeSet::new(),
            category_cursor: 0,
            form: EntryForm::default(),
            status: None,
            risk: Vec::new(),
            history: None,
            history_selection: Vec::new(),
            asset_cursor: 0,
            period,
            report_stale: true,
            risk_stale: true,
            history_stale: true,
        }
    }

    /// True when the next [`App::refresh`] will evaluate or hit the network.
    pub fn is_loading(&self) -> bool {
        self.report_stale || (self.tab == Tab::Advanced && (self.risk_stale || self.history_stale))
    }

    /// Symbols in entry order, for the history picker.
    pub fn asset_symbols(&self) -> Vec<String> {
        self.analyzer
            .holdings()
            .iter()
            .map(|h| h.symbol.clone())
            .collect()
    }

    /// `None` when every category is shown.
    pub fn category_filter(&self) -> Option<Vec<AssetCategory>> {
        if self.hidden_categories.is_empty() {
            return None;
        }
        Some(
            self.categories
                .iter()
                .filter(|c| !self.hidden_categories.contains(c))
                .copied()
                .collect(),
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match (key.code, self.tab) {
            (KeyCode::Tab, _) => self.tab = self.tab.next(),
            (KeyCode::BackTab, _) => self.tab = self.tab.prev(),
            (_, Tab::Analysis) => self.handle_analysis_key(key),
            (_, Tab::AddInvestments) => self.handle_form_key(key),
            (_, Tab::Advanced) => self.handle_advanced_key(key),
        }
    }

    /// Keys shared by the read-only tabs. Returns `true` when consumed.
    fn handle_navigation_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.tab = Tab::Analysis,
            KeyCode::Char('2') => self.tab = Tab::AddInvestments,
            KeyCode::Char('3') => self.tab = Tab::Advanced,
            KeyCode::Char('r') => self.mark_portfolio_changed(),
            _ => return false,
        }
        true
    }

    fn handle_analysis_key(&mut self, key: KeyEvent) {
        if self.handle_navigation_key(key) {
            return;
        }
        match key.code {
            KeyCode::Up => self.category_cursor = self.category_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.category_cursor + 1 < self.categories.len() {
                    self.category_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(category) = self.categories.get(self.category_cursor).copied() {
                    if !self.hidden_categories.remove(&category) {
                        self.hidden_categories.insert(category);
                    }
                    self.report_stale = true;
                }
            }
            KeyCode::Char('a') => {
                self.hidden_categories.clear();
                self.report_stale = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => self.clear_portfolio(),
                KeyCode::Char('s') => self.load_sample(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Up => self.form.prev_field(),
            KeyCode::Down => self.form.next_field(),
            KeyCode::Left if self.form.focus == Field::Category => self.form.cycle_category(false),
            KeyCode::Right if self.form.focus == Field::Category => self.form.cycle_category(true),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Esc => self.form.reset(),
            KeyCode::Char(c) => self.form.input(c),
            _ => {}
        }
    }

    fn handle_advanced_key(&mut self, key: KeyEvent) {
        if self.handle_navigation_key(key) {
            return;
        }
        let symbols = self.asset_symbols();
        match key.code {
            KeyCode::Up => self.asset_cursor = self.asset_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.asset_cursor + 1 < symbols.len() {
                    self.asset_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(symbol) = symbols.get(self.asset_cursor) {
                    match self.history_selection.iter().position(|s| s == symbol) {
                        Some(idx) => {
                            self.history_selection.remove(idx);
                        }
                        None => self.history_selection.push(symbol.clone()),
                    }
                    self.history_stale = true;
                }
            }
            KeyCode::Char('p') => {
                self.period = self.period.next();
                self.history_stale = true;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let holding = match self.form.to_holding() {
            Ok(holding) => holding,
            Err(message) => {
                self.set_error(message);
                return;
            }
        };
        let symbol = holding.symbol.clone();
        match self.analyzer.add_holding(holding) {
            Ok(merged) => {
                let verb = if merged { "Merged into existing" } else { "Added" };
                self.set_info(format!("{verb} {symbol}"));
                self.form.reset();
                self.mark_portfolio_changed();
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn clear_portfolio(&mut self) {
        self.analyzer.clear_holdings();
        self.history_selection.clear();
        self.hidden_categories.clear();
        self.set_info("Portfolio cleared".to_string());
        self.mark_portfolio_changed();
    }

    fn load_sample(&mut self) {
        self.analyzer.load_sample();
        self.history_selection.clear();
        self.hidden_categories.clear();
        self.set_info("Sample data loaded".to_string());
        self.mark_portfolio_changed();
    }

    fn mark_portfolio_changed(&mut self) {
        self.report_stale = true;
        self.risk_stale = true;
        self.history_stale = true;
    }

    fn set_info(&mut self, message: String) {
        self.status = Some(Status {
            message,
            is_error: false,
        });
    }

    fn set_error(&mut self, message: String) {
        self.status = Some(Status {
            message,
            is_error: true,
        });
    }

    /// Re-evaluate whatever is stale. Risk and history are only fetched
    /// while the Advanced tab is open.
    pub async fn refresh(&mut self) {
        if self.report_stale {
            self.report_stale = false;
            self.categories = self.analyzer.categories();
            self.hidden_categories
                .retain(|c| self.categories.contains(c));
            self.category_cursor = self
                .category_cursor
                .min(self.categories.len().saturating_sub(1));

            let filter = self.category_filter();
            let report = self.analyzer.evaluate(filter.as_deref()).await;

            let symbols = self.asset_symbols();
            self.history_selection.retain(|s| symbols.contains(s));
            if self.history_selection.is_empty() {
                self.history_selection = self.analyzer.default_history_selection(&report);
            }
            self.asset_cursor = self.asset_cursor.min(symbols.len().saturating_sub(1));

            tracing::debug!(
                rows = report.rows.len(),
                missing = report.metrics.missing_prices,
                "report refreshed"
            );
            self.report = Some(report);
            self.risk_stale = true;
        }

        if self.tab != Tab::Advanced {
            return;
        }
        if self.risk_stale {
            self.risk_stale = false;
            self.risk = match &self.report {
                Some(report) => self.analyzer.risk_return(&report.rows).await,
                None => Vec::new(),
            };
        }
        if self.history_stale {
            self.history_stale = false;
            let chart = self
                .analyzer
                .historical_chart(&self.history_selection, self.period)
                .await;
            self.history = Some(chart);
        }
    }
}
