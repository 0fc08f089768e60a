//! Display formatting for money and percentages.

/// `$1,234.56`; negatives as `-$1,234.56`.
pub fn format_currency(value: f64) -> String {
    format_money(value, "$")
}

/// Like [`format_currency`] with a custom symbol prefix.
pub fn format_money(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return format!("{symbol}—");
    }
    let cents = format!("{:.2}", value.abs());
    let sign = if value < 0.0 && !is_rounded_zero(&cents) { "-" } else { "" };
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    format!("{sign}{symbol}{}.{frac}", group_thousands(whole))
}

/// `12.34%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// `+12.34%` / `-3.10%`. Values that round to zero print as `+0.00%`.
pub fn format_signed_percent(value: f64) -> String {
    let magnitude = format!("{:.2}", value.abs());
    if value < 0.0 && !is_rounded_zero(&magnitude) {
        format!("-{magnitude}%")
    } else {
        format!("+{magnitude}%")
    }
}

/// Quantities without trailing zeros: `10`, `0.5`, `2.125`.
pub fn format_quantity(quantity: f64) -> String {
    let text = format!("{quantity:.6}");
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn is_rounded_zero(digits: &str) -> bool {
    digits.chars().all(|c| c == '0' || c == '.')
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn currency_negative_sign_before_symbol() {
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
        assert_eq!(format_currency(-0.02), "-$0.02");
    }

    #[test]
    fn money_custom_symbol() {
        assert_eq!(format_money(42.0, "€"), "€42.00");
    }

    #[test]
    fn quantity_trims_trailing_zeros() {
        assert_eq!(format_quantity(10.0), "10");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(2.125), "2.125");
    }

    #[test]
    fn percent_formats() {
        assert_eq!(format_percent(12.3456), "12.35%");
        assert_eq!(format_signed_percent(3.1), "+3.10%");
        assert_eq!(format_signed_percent(-3.1), "-3.10%");
    }

    #[test]
    fn tiny_negatives_round_to_unsigned_zero() {
        assert_eq!(format_money(-0.001, "$"), "$0.00");
        assert_eq!(format_currency(-0.0), "$0.00");
        assert_eq!(format_signed_percent(-0.001), "+0.00%");
        assert_eq!(format_signed_percent(0.0), "+0.00%");
    }
}
