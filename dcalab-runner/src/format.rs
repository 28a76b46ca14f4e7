//! Display formatting for summary tables and exports.
//!
//! Contracts:
//! - Currency: no decimals, thousands separators ("$12,345")
//! - Percentages: two decimals with a sign for the value ("-9.39%")
//! - Share counts: up to two decimals, trailing zeros trimmed ("3.02", "1")
//!
//! Non-finite inputs format as "n/a" so degenerate simulations stay visible
//! in tables instead of panicking or printing "NaN".

/// Currency amount: rounded to whole units, thousands-separated.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }
    let negative = amount < 0.0;
    let whole = amount.abs().round() as u64;
    let digits = whole.to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if negative {
        out.push('-');
    }
    out.push('$');
    let first_group = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - first_group) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Percentage-scaled rate with two decimals.
pub fn format_percent(rate: f64) -> String {
    if !rate.is_finite() {
        return "n/a".to_string();
    }
    format!("{rate:.2}%")
}

/// Share count with up to two decimals.
pub fn format_shares(shares: f64) -> String {
    if !shares.is_finite() {
        return "n/a".to_string();
    }
    let s = format!("{shares:.2}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
