use portfolio_analyzer_core::models::holding::{AssetCategory, Holding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Asset,
    Category,
    Quantity,
    PurchasePrice,
    CurrentPrice,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[
            Field::Asset,
            Field::Category,
            Field::Quantity,
            Field::PurchasePrice,
            Field::CurrentPrice,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Asset => "Asset Name/Ticker",
            Field::Category => "Category",
            Field::Quantity => "Quantity",
            Field::PurchasePrice => "Purchase Price ($)",
            Field::CurrentPrice => "Current Price ($, optional)",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Field::Quantity | Field::PurchasePrice | Field::CurrentPrice)
    }
}

/// State of the "Add Investments" entry form.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub asset: String,
    pub category: AssetCategory,
    pub quantity: String,
    pub purchase_price: String,
    pub current_price: String,
    pub focus: Field,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            asset: String::new(),
            category: AssetCategory::Stocks,
            quantity: String::new(),
            purchase_price: String::new(),
            current_price: String::new(),
            focus: Field::Asset,
        }
    }
}

impl EntryForm {
    pub fn next_field(&mut self) {
        let fields = Field::all();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = Field::all();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    /// Type a character into the focused field. Numeric fields only take
    /// digits and a decimal point; the category field ignores typing.
    pub fn input(&mut self, c: char) {
        let focus = self.focus;
        if focus.is_numeric() && !(c.is_ascii_digit() || c == '.') {
            return;
        }
        if let Some(text) = self.text_mut(focus) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut(self.focus) {
            text.pop();
        }
    }

    pub fn cycle_category(&mut self, forward: bool) {
        self.category = if forward {
            self.category.next()
        } else {
            self.category.prev()
        };
    }

    /// Display value of a field.
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Asset => self.asset.clone(),
            Field::Category => self.category.to_string(),
            Field::Quantity => self.quantity.clone(),
            Field::PurchasePrice => self.purchase_price.clone(),
            Field::CurrentPrice => self.current_price.clone(),
        }
    }

    /// Build a holding from the form. Range checks (positive values) are
    /// left to the portfolio; this only rejects text that is not a number.
    pub fn to_holding(&self) -> Result<Holding, String> {
        let quantity = parse_required(&self.quantity, "Quantity")?;
        let purchase_price = parse_required(&self.purchase_price, "Purchase price")?;

        let mut holding = Holding::new(self.asset.as_str(), self.category, quantity, purchase_price);
        if !self.current_price.trim().is_empty() {
            holding = holding.with_current_price(parse_required(&self.current_price, "Current price")?);
        }
        Ok(holding)
    }

    /// Clear the inputs after a successful add. The category is kept.
    pub fn reset(&mut self) {
        *self = Self {
            category: self.category,
            ..Self::default()
        };
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Asset => Some(&mut self.asset),
            Field::Category => None,
            Field::Quantity => Some(&mut self.quantity),
            Field::PurchasePrice => Some(&mut self.purchase_price),
            Field::CurrentPrice => Some(&mut self.current_price),
        }
    }
}

fn parse_required(text: &str, name: &str) -> Result<f64, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(format!("{name} is required"));
    }
    text.parse()
        .map_err(|_| format!("{name} '{text}' is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> EntryForm {
        EntryForm {
            asset: "AAPL".into(),
            quantity: "10".into(),
            purchase_price: "150.5".into(),
            ..EntryForm::default()
        }
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = EntryForm::default();
        form.prev_field();
        assert_eq!(form.focus, Field::CurrentPrice);
        form.next_field();
        assert_eq!(form.focus, Field::Asset);
        form.next_field();
        assert_eq!(form.focus, Field::Category);
    }

    #[test]
    fn numeric_fields_reject_letters() {
        let mut form = EntryForm {
            focus: Field::Quantity,
            ..EntryForm::default()
        };
        for c in "1a2.5x".chars() {
            form.input(c);
        }
        assert_eq!(form.quantity, "12.5");
        form.backspace();
        assert_eq!(form.quantity, "12.");
    }

    #[test]
    fn asset_accepts_any_text() {
        let mut form = EntryForm::default();
        for c in "Real Estate".chars() {
            form.input(c);
        }
        assert_eq!(form.asset, "Real Estate");
    }

    #[test]
    fn category_field_ignores_typing() {
        let mut form = EntryForm {
            focus: Field::Category,
            ..EntryForm::default()
        };
        form.input('x');
        form.backspace();
        assert_eq!(form.category, AssetCategory::Stocks);
        form.cycle_category(false);
        assert_eq!(form.category, AssetCategory::Other);
        form.cycle_category(true);
        form.cycle_category(true);
        assert_eq!(form.category, AssetCategory::Etfs);
    }

    #[test]
    fn builds_holding_without_current_price() {
        let holding = filled().to_holding().unwrap();
        assert_eq!(holding.symbol, "AAPL");
        assert_eq!(holding.quantity, 10.0);
        assert_eq!(holding.purchase_price, 150.5);
        assert!(holding.current_price.is_none());
    }

    #[test]
    fn builds_holding_with_current_price() {
        let form = EntryForm {
            current_price: "180".into(),
            ..filled()
        };
        assert_eq!(form.to_holding().unwrap().current_price, Some(180.0));
    }

    #[test]
    fn missing_or_bad_numbers_are_errors() {
        let form = EntryForm {
            quantity: String::new(),
            ..filled()
        };
        assert_eq!(form.to_holding().unwrap_err(), "Quantity is required");

        let form = EntryForm {
            purchase_price: "1.2.3".into(),
            ..filled()
        };
        assert!(form.to_holding().unwrap_err().contains("not a number"));
    }

    #[test]
    fn reset_keeps_category() {
        let mut form = EntryForm {
            category: AssetCategory::Crypto,
            focus: Field::PurchasePrice,
            ..filled()
        };
        form.reset();
        assert!(form.asset.is_empty());
        assert_eq!(form.category, AssetCategory::Crypto);
        assert_eq!(form.focus, Field::Asset);
    }
}
