use std::collections::HashMap;

/// Uppercase ticker → latest market price, as returned by one refresh call.
///
/// Ephemeral: a fresh map is built for every refresh cycle and dropped once merged.
pub type PriceMap = HashMap<String, f64>;

/// Normalize a raw gateway result into a `PriceMap`.
///
/// - Keys are trimmed and uppercased so they line up with merge-time lookups.
/// - Prices that are not finite or not strictly positive are dropped.
/// - Blank keys are dropped.
pub fn normalize_price_map<I, K>(raw: I) -> PriceMap
where
    I: IntoIterator<Item = (K, f64)>,
    K: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|(ticker, price)| {
            let key = ticker.as_ref().trim().to_uppercase();
            if key.is_empty() || !price.is_finite() || price <= 0.0 {
                return None;
            }
            Some((key, price))
        })
        .collect()
}

/// Parse a price the model may have written as a string ("₹3,550.20", "3550").
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_keys_and_drops_bad_prices() {
        let map = normalize_price_map(vec![
            (" tcs ", 3550.0),
            ("INFY", 0.0),
            ("WIPRO", f64::NAN),
            ("", 12.0),
            ("hdfcbank", 1650.5),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("TCS"), Some(&3550.0));
        assert_eq!(map.get("HDFCBANK"), Some(&1650.5));
    }

    #[test]
    fn parses_formatted_price_text() {
        assert_eq!(parse_price_text("₹3,550.20"), Some(3550.2));
        assert_eq!(parse_price_text("1650"), Some(1650.0));
        assert_eq!(parse_price_text("n/a"), None);
    }
}
