//! Currency detection.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Ordered: specific symbols and codes must come before the broad `$`
    // fallback, or "A$ 10.00" would read as USD.
    static ref CURRENCY_TABLE: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"A\$|\bAUD\b").unwrap(), "AUD"),
        (Regex::new(r"C\$|\bCAD\b").unwrap(), "CAD"),
        (Regex::new(r"NZ\$|\bNZD\b").unwrap(), "NZD"),
        (Regex::new(r"S\$|\bSGD\b").unwrap(), "SGD"),
        (Regex::new(r"R\$|\bBRL\b").unwrap(), "BRL"),
        (Regex::new(r"\u{20AC}|\bEUR\b").unwrap(), "EUR"),
        (Regex::new(r"\u{00A3}|\bGBP\b").unwrap(), "GBP"),
        (Regex::new(r"\u{20B9}|\bINR\b|\bRs\.?[ \t]*\d").unwrap(), "INR"),
        (Regex::new(r"\u{00A5}|\bJPY\b").unwrap(), "JPY"),
        (Regex::new(r"\bCHF\b").unwrap(), "CHF"),
        (Regex::new(r"\bMXN\b").unwrap(), "MXN"),
        (Regex::new(r"\$|\bUSD\b").unwrap(), "USD"),
    ];
}

/// Detect the document currency as an ISO-4217 code. Defaults to `USD`
/// when no symbol or code appears anywhere in the text.
pub fn detect_currency(text: &str) -> String {
    for (pattern, code) in CURRENCY_TABLE.iter() {
        if pattern.is_match(text) {
            return (*code).to_string();
        }
    }
    "USD".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_before_broad() {
        assert_eq!(detect_currency("Total A$ 45.00"), "AUD");
        assert_eq!(detect_currency("Total C$12.00"), "CAD");
        assert_eq!(detect_currency("Total $45.00"), "USD");
    }

    #[test]
    fn test_symbols_and_codes() {
        assert_eq!(detect_currency("Betrag: 12,50 \u{20AC}"), "EUR");
        assert_eq!(detect_currency("Amount GBP 9.99"), "GBP");
        assert_eq!(detect_currency("Rs. 1200"), "INR");
    }

    #[test]
    fn test_default_usd_when_absent() {
        assert_eq!(detect_currency("no money mentioned here"), "USD");
        assert_eq!(detect_currency(""), "USD");
    }
}
