//! Display formatting for amounts, dates, and HTML text.

use chrono::{DateTime, NaiveDate, Utc};

/// Escapes `text` for insertion into HTML text or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats an amount with Indian digit grouping (`12,34,567`).
///
/// Whole amounts print without decimals; otherwise up to two decimals are
/// shown with trailing zeros dropped, e.g. `1,200.5`.
#[must_use]
pub fn format_inr(amount: f64) -> String {
    // Cast safety: paise values of school fees are far below 2^53
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = (paise / 100).to_string();
    let fraction = paise % 100;

    let grouped = group_indian(&rupees);
    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };

    if fraction == 0 {
        format!("{sign}{grouped}")
    } else {
        let decimals = format!("{fraction:02}");
        format!("{sign}{grouped}.{}", decimals.trim_end_matches('0'))
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{last_three}", groups.join(","))
}

/// Formats an amount with the rupee sign, e.g. `₹ 1,200`.
#[must_use]
pub fn format_rupees(amount: f64) -> String {
    format!("₹ {}", format_inr(amount))
}

/// Formats an amount with exactly two decimals, as printed on receipts.
#[must_use]
pub fn format_fixed(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Formats a date the way `locale` writes short dates.
///
/// `en-IN` omits leading zeros (`31/8/2025`), `en-GB` keeps them
/// (`31/08/2025`), `en-US` puts the month first (`8/31/2025`). Unknown
/// locales fall back to `en-IN`.
#[must_use]
pub fn format_date(date: NaiveDate, locale: &str) -> String {
    let pattern = match locale {
        "en-GB" => "%d/%m/%Y",
        "en-US" => "%-m/%-d/%Y",
        _ => "%-d/%-m/%Y",
    };
    date.format(pattern).to_string()
}

/// Formats the calendar date of a UTC timestamp for `locale`.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>, locale: &str) -> String {
    format_date(timestamp.date_naive(), locale)
}
