use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::holding::{AssetCategory, Holding, HoldingTable};

/// Header aliases, matched after normalization (lowercase, `_` → space).
const ASSET_HEADERS: &[&str] = &["asset", "ticker", "symbol"];
const CATEGORY_HEADERS: &[&str] = &["category", "asset category", "type"];
const QUANTITY_HEADERS: &[&str] = &["quantity", "qty", "shares", "units"];
const PURCHASE_HEADERS: &[&str] = &["purchase price", "buy price", "unit cost"];
const COST_BASIS_HEADERS: &[&str] = &["cost basis", "total cost"];
const CURRENT_HEADERS: &[&str] = &["current price", "price"];

/// A CSV row that was ignored, with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// Result of importing a holdings CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Parsed holdings, duplicates merged, in first-seen order
    pub holdings: Vec<Holding>,

    /// Malformed rows that were skipped
    pub skipped: Vec<SkippedRow>,

    /// Number of rows merged into an earlier row with the same symbol
    pub merged: usize,
}

/// Column positions resolved from the header row.
struct Columns {
    asset: usize,
    quantity: usize,
    purchase: Option<usize>,
    cost_basis: Option<usize>,
    category: Option<usize>,
    current: Option<usize>,
}

/// Parses and writes the holdings CSV format.
///
/// Columns: `Asset, Category, Quantity, Purchase Price, Current Price`.
/// `Category` and `Current Price` are optional; `Cost Basis` (total) may
/// replace `Purchase Price` (per unit).
pub struct ImportService;

impl ImportService {
    pub fn new() -> Self {
        Self
    }

    /// Parse holdings from CSV text.
    ///
    /// Fails only when the header lacks required columns. Bad data rows are
    /// skipped and listed in the report; blank lines are ignored. Any of
    /// `\n`, `\r\n` or a bare `\r` ends a record.
    pub fn parse_holdings_csv(&self, text: &str) -> Result<ImportReport, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if is_blank(&header) {
            return Err(CoreError::Csv("file is empty".to_string()));
        }
        let columns = resolve_columns(&header)?;

        let mut table = HoldingTable::new();
        let mut skipped = Vec::new();
        let mut merged = 0;

        for result in reader.records() {
            let (line, parsed) = match result {
                Ok(record) => {
                    let fields: Vec<String> = record.iter().map(str::to_string).collect();
                    if is_blank(&fields) {
                        continue;
                    }
                    (record_line(record.position()), parse_row(&columns, &fields))
                }
                Err(e) => (record_line(e.position()), Err(e.to_string())),
            };

            match parsed {
                Ok(holding) => {
                    if table.upsert(holding) {
                        merged += 1;
                    }
                }
                Err(reason) => {
                    tracing::debug!(line, %reason, "skipping CSV row");
                    skipped.push(SkippedRow { line, reason });
                }
            }
        }

        tracing::info!(
            holdings = table.len(),
            skipped = skipped.len(),
            merged,
            "imported holdings CSV"
        );

        Ok(ImportReport {
            holdings: table.as_slice().to_vec(),
            skipped,
            merged,
        })
    }

    /// Write holdings in the import format. Empty `Current Price` means "fetch".
    pub fn holdings_to_csv(&self, holdings: &[Holding]) -> Result<String, CoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Asset", "Category", "Quantity", "Purchase Price", "Current Price"])?;
        for h in holdings {
            writer.write_record([
                h.symbol.clone(),
                h.category.to_string(),
                h.quantity.to_string(),
                h.purchase_price.to_string(),
                h.current_price.map(|p| p.to_string()).unwrap_or_default(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Csv(e.error().to_string()))?;
        String::from_utf8(bytes).map_err(|e| CoreError::Csv(e.to_string()))
    }

    /// Downloadable starter file.
    pub fn template_csv(&self) -> Result<String, CoreError> {
        self.holdings_to_csv(&[
            Holding::new("AAPL", AssetCategory::Stocks, 10.0, 150.0).with_current_price(180.0),
            Holding::new("VTI", AssetCategory::Etfs, 5.0, 200.0).with_current_price(220.0),
        ])
    }
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based line a record starts on; 0 when the reader reports no position.
fn record_line(position: Option<&csv::Position>) -> usize {
    position.map(|p| p.line() as usize).unwrap_or(0)
}

fn is_blank(fields: &[String]) -> bool {
    fields.iter().all(|f| f.trim().is_empty())
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn find_column(header: &[String], aliases: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|h| aliases.contains(&normalize_header(h).as_str()))
}

fn resolve_columns(header: &[String]) -> Result<Columns, CoreError> {
    let asset = find_column(header, ASSET_HEADERS);
    let quantity = find_column(header, QUANTITY_HEADERS);
    let purchase = find_column(header, PURCHASE_HEADERS);
    let cost_basis = find_column(header, COST_BASIS_HEADERS);

    let mut missing = Vec::new();
    if asset.is_none() {
        missing.push("Asset".to_string());
    }
    if quantity.is_none() {
        missing.push("Quantity".to_string());
    }
    if purchase.is_none() && cost_basis.is_none() {
        missing.push("Purchase Price".to_string());
    }

    match (asset, quantity) {
        (Some(asset), Some(quantity)) if missing.is_empty() => Ok(Columns {
            asset,
            quantity,
            purchase,
            cost_basis,
            category: find_column(header, CATEGORY_HEADERS),
            current: find_column(header, CURRENT_HEADERS),
        }),
        _ => Err(CoreError::MissingColumns(missing)),
    }
}

fn cell<'a>(fields: &'a [String], idx: usize) -> &'a str {
    fields.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Parse a money/quantity cell: strips `$`, thousands separators and spaces.
/// `Ok(None)` for an empty cell.
fn parse_number(raw: &str, column: &str) -> Result<Option<f64>, String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("{column} '{}' is not a number", raw.trim()))?;
    if !value.is_finite() {
        return Err(format!("{column} '{}' is not finite", raw.trim()));
    }
    if value < 0.0 {
        return Err(format!("{column} must not be negative, got {value}"));
    }
    Ok(Some(value))
}

fn parse_row(columns: &Columns, fields: &[String]) -> Result<Holding, String> {
    let symbol = cell(fields, columns.asset);
    if symbol.is_empty() {
        return Err("empty asset name".to_string());
    }

    let quantity = parse_number(cell(fields, columns.quantity), "Quantity")?
        .ok_or_else(|| format!("missing quantity for {symbol}"))?;

    let purchase = match columns.purchase {
        Some(idx) => parse_number(cell(fields, idx), "Purchase Price")?,
        None => None,
    };
    let purchase_price = match purchase {
        Some(price) => price,
        None => {
            let cost = match columns.cost_basis {
                Some(idx) => parse_number(cell(fields, idx), "Cost Basis")?,
                None => None,
            }
            .ok_or_else(|| format!("missing purchase price for {symbol}"))?;
            if quantity > 0.0 { cost / quantity } else { 0.0 }
        }
    };

    let category = columns
        .category
        .map(|idx| AssetCategory::from_label(cell(fields, idx)))
        .unwrap_or(AssetCategory::Other);

    let current_price = match columns.current {
        Some(idx) => parse_number(cell(fields, idx), "Current Price")?,
        None => None,
    };

    let mut holding = Holding::new(symbol, category, quantity, purchase_price);
    holding.current_price = current_price.filter(|p| *p > 0.0);
    Ok(holding)
}
