use std::collections::HashMap;

/// Currency code to rate against a common base.
pub type RateTable = HashMap<String, f64>;

/// Convert `amount` between currencies using a base-relative rate table.
/// Returns the amount unchanged when the currencies match or a rate is
/// missing or unusable.
pub fn convert_amount(amount: f64, from: &str, to: &str, rates: &RateTable) -> f64 {
    if from.eq_ignore_ascii_case(to) { return amount; }
    let rate = |code: &str| rates.get(&code.to_ascii_uppercase()).copied().filter(|r| r.is_finite() && *r > 0.0);
    match (rate(from), rate(to)) {
        (Some(f), Some(t)) => amount / f * t,
        _ => amount,
    }
}

/// Parse `USD=1,EUR=0.92` into a rate table. Malformed pairs are skipped.
pub fn parse_rates(pairs: &str) -> RateTable {
    let mut out = RateTable::new();
    for pair in pairs.split(',') {
        let Some((code, rate)) = pair.split_once('=') else { continue };
        let code = code.trim();
        if code.is_empty() { continue; }
        match rate.trim().parse::<f64>() {
            Ok(r) => { out.insert(code.to_ascii_uppercase(), r); }
            Err(_) => tracing::warn!(target: "expensedesk::config", "ignoring rate '{}'", pair.trim()),
        }
    }
    out
}
