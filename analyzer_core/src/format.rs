/// Scale a raw integer balance by `decimals` and render it for display.
///
/// Bands: zero is `"0"`, below 1e-6 uses exponential notation with three
/// decimals, below 1 uses six decimals, anything else four. Trailing zeros of
/// the fixed-point bands are trimmed.
pub fn format_token_balance(raw_balance: &str, decimals: u8) -> String {
    let raw: f64 = raw_balance.trim().parse().unwrap_or(0.0);
    let balance = raw / 10f64.powi(decimals as i32);

    if balance == 0.0 || !balance.is_finite() {
        return "0".to_string();
    }
    if balance < 0.000001 {
        return format!("{:.3e}", balance);
    }
    if balance < 1.0 {
        return trim_fraction(format!("{:.6}", balance));
    }
    trim_fraction(format!("{:.4}", balance))
}

fn trim_fraction(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Balance times price; malformed, negative or non-finite results count as zero
pub fn calculate_usd_value(balance: &str, price_usd: f64) -> f64 {
    if price_usd == 0.0 || !price_usd.is_finite() {
        return 0.0;
    }

    let Ok(balance) = balance.replace(',', "").trim().parse::<f64>() else {
        return 0.0;
    };

    let usd_value = balance * price_usd;
    if !usd_value.is_finite() || usd_value < 0.0 {
        0.0
    } else {
        usd_value
    }
}

/// `$1.23K` style rendering for summaries
pub fn format_usd_value(usd_value: f64) -> String {
    if usd_value == 0.0 || !usd_value.is_finite() {
        return "$0.00".to_string();
    }

    let value = usd_value.abs();
    if value < 0.000001 {
        "$0.00".to_string()
    } else if value < 0.01 {
        format!("${:.6}", value)
    } else if value < 1.0 {
        format!("${:.4}", value)
    } else if value < 1_000.0 {
        format!("${:.2}", value)
    } else if value < 1_000_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else if value < 1_000_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else {
        format!("${:.2}B", value / 1_000_000_000.0)
    }
}
