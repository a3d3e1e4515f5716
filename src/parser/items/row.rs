//! Single-line line-item parsing.
//!
//! Turns one document line into a [`Part`], disambiguating quantity, unit
//! price, tax, and total from the bare numeric tokens on the line.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use crate::models::Part;
use crate::rules::patterns::{
    match_count, ALPHA_RUN, AU_CITY_STATE_POSTCODE, SKU_BARE, SKU_LABELED, SUMMARY_LINE,
    TABLE_HEADER_KEYWORD, TAX_PERCENT, US_CITY_STATE_ZIP,
};

/// Line totals above this are OCR noise, not money.
const MAX_TOTAL: i64 = 9_999_999;

/// Quantities at or above this are codes, not counts.
const MAX_QUANTITY: i64 = 10_000;

/// Largest numeric token that can plausibly be a tax percentage.
const MAX_TAX_PCT: i64 = 50;

/// Relative tolerance for `qty x unit_price` validation: 5%.
pub fn math_tolerance() -> Decimal {
    Decimal::new(5, 2)
}

lazy_static! {
    static ref NUMERIC_TOKEN: Regex = Regex::new(r"\$?\d[\d,]*(?:\.\d+)?%?").unwrap();
    static ref COLUMN_SPLIT: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref LEADING_ROW_NUMBER: Regex = Regex::new(r"^\d+[.)\s]+").unwrap();
    static ref TRAILING_NUMERIC_CLUSTER: Regex =
        Regex::new(r"[ \t]+[$(]?\d[\d,.%$()\t ]*$").unwrap();
    // Harmless trailing tokens after the total: currency codes and units.
    static ref TRAILING_UNIT: Regex = Regex::new(
        r"(?i)^(?:usd|eur|gbp|aud|cad|nzd|inr|jpy|ea|each|pc|pcs|kg|lb|hr|hrs)[.)]?$"
    ).unwrap();
}

/// Outcome of parsing one line.
#[derive(Debug, Clone)]
pub struct RowParse {
    pub part: Part,
    /// True when no quantity/unit-price pair passed math validation and
    /// positions decided the assignment instead.
    pub positional_fallback: bool,
}

#[derive(Debug, Clone, Copy)]
struct NumToken {
    value: Decimal,
    is_pct: bool,
    end: usize,
}

/// Parse a single line into a part.
///
/// Summary rows, header rows, and lines without a usable total yield
/// `None`. `default_tax_pct` supplies a document-level tax rate used when
/// the line itself names none.
pub fn parse_line_item(
    line: &str,
    line_number: usize,
    default_tax_pct: Option<Decimal>,
) -> Option<RowParse> {
    if SUMMARY_LINE.is_match(line) {
        return None;
    }
    let has_digits = line.chars().any(|c| c.is_ascii_digit());
    if !has_digits && match_count(&TABLE_HEADER_KEYWORD, line) >= 2 {
        return None;
    }
    // Address lines surface in whole-document sweeps; they are not items.
    if US_CITY_STATE_ZIP.is_match(line) || AU_CITY_STATE_POSTCODE.is_match(line) {
        return None;
    }

    let tokens = numeric_tokens(line);
    if tokens.is_empty() {
        return None;
    }

    // Tax percentage: a %-suffixed token, else a labeled rate on the line.
    let mut tax_pct = tokens
        .iter()
        .find(|t| t.is_pct)
        .map(|t| t.value)
        .or_else(|| {
            TAX_PERCENT
                .captures(line)
                .and_then(|caps| caps[1].parse::<Decimal>().ok())
        });

    let sku = extract_sku(line);

    // The rightmost non-percentage token is the line total.
    let total_idx = tokens.iter().rposition(|t| !t.is_pct)?;
    let total = tokens[total_idx].value;
    if total <= Decimal::ZERO || total > Decimal::from(MAX_TOTAL) {
        return None;
    }
    if !total_ends_line(line, &tokens, total_idx) {
        return None;
    }

    let name = candidate_name(line, sku.as_ref())?;

    // Everything numeric before the total, minus percentages, competes for
    // quantity / unit price / tax amount.
    let candidates: Vec<Decimal> = tokens
        .iter()
        .take(total_idx)
        .filter(|t| !t.is_pct)
        .map(|t| t.value)
        .collect();

    let mut quantity: Option<Decimal> = None;
    let mut unit_price: Option<Decimal> = None;
    let mut tax_amount: Option<Decimal> = None;
    let mut positional_fallback = false;

    match candidates.len() {
        0 => {}
        1 => {
            let n = candidates[0];
            let derived = checked_unit_price(total, n);
            if is_plausible_quantity(n) && derived.is_some() {
                quantity = Some(n);
                unit_price = derived;
            } else {
                unit_price = Some(n);
            }
        }
        _ => {
            if let Some((qi, pi)) = best_validating_pair(&candidates, total) {
                quantity = Some(candidates[qi]);
                unit_price = Some(candidates[pi]);
                let leftovers: Vec<Decimal> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != qi && *i != pi)
                    .map(|(_, v)| *v)
                    .collect();
                if leftovers.len() == 1 {
                    tax_amount = Some(leftovers[0]);
                }
            } else if let Some((qi, pi, ti)) = best_tax_inclusive_triple(&candidates, total) {
                quantity = Some(candidates[qi]);
                unit_price = Some(candidates[pi]);
                if tax_pct.is_none() {
                    tax_pct = Some(candidates[ti]);
                }
                let expected_tax =
                    candidates[qi] * candidates[pi] * candidates[ti] / Decimal::ONE_HUNDRED;
                tax_amount = candidates
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != qi && *i != pi && *i != ti)
                    .map(|(_, v)| *v)
                    .find(|v| ratio((*v - expected_tax).abs(), expected_tax) <= math_tolerance());
            } else {
                positional_fallback = true;
                let qty_idx = candidates.iter().position(|c| is_plausible_quantity(*c));
                quantity = qty_idx.map(|i| candidates[i]);
                unit_price = candidates
                    .iter()
                    .enumerate()
                    .rev()
                    .find(|(i, _)| Some(*i) != qty_idx)
                    .map(|(_, v)| *v);
            }
        }
    }

    let quantity = quantity.unwrap_or(Decimal::ONE);
    if unit_price.is_none() && quantity > Decimal::ZERO {
        unit_price = checked_unit_price(total, quantity);
    }

    let effective_pct = tax_pct.or(default_tax_pct);
    if tax_amount.is_none() {
        if let (Some(pct), Some(price)) = (effective_pct, unit_price) {
            tax_amount = Some(quantity * price * pct / Decimal::ONE_HUNDRED);
        }
    }

    trace!(line_number, name = %name, %total, "parsed line item");

    let mut part = Part::new(name, total.round_dp(4));
    part.quantity = quantity;
    part.unit_price = unit_price.map(|p| p.round_dp(4));
    part.tax_percentage = effective_pct;
    part.tax_amount = tax_amount.map(|t| t.round_dp(4));
    part.sku = sku.map(|s| s.code);

    Some(RowParse {
        part,
        positional_fallback,
    })
}

/// Numeric tokens on the line, with `%` flags, in left-to-right order.
///
/// A token only counts when it stands alone: the characters around it must
/// be whitespace, `$`, parentheses, or a comma. Digits glued to letters
/// ("M12", "75mm"), dates ("01/15/2024"), and times ("09:45") never
/// tokenize.
fn numeric_tokens(line: &str) -> Vec<NumToken> {
    let bytes = line.as_bytes();
    NUMERIC_TOKEN
        .find_iter(line)
        .filter(|m| {
            let before_ok = m.start() == 0 || matches!(bytes[m.start() - 1], b' ' | b'\t' | b'(');
            let after_ok =
                m.end() == bytes.len() || matches!(bytes[m.end()], b' ' | b'\t' | b')' | b',');
            before_ok && after_ok
        })
        .filter_map(|m| {
            let raw = m.as_str();
            let is_pct = raw.ends_with('%');
            let value = crate::rules::parse_amount(raw)?;
            Some(NumToken {
                value,
                is_pct,
                end: m.end(),
            })
        })
        .collect()
}

/// Real line items carry the total at the end of the line. Text after the
/// total token means the number was embedded in prose or an address; a
/// percentage token, single letters (receipt tax flags), or a unit word
/// are the allowed exceptions.
fn total_ends_line(line: &str, tokens: &[NumToken], total_idx: usize) -> bool {
    let after = line[tokens[total_idx].end..].trim();
    if after.is_empty() {
        return true;
    }
    !ALPHA_RUN.is_match(after) || TRAILING_UNIT.is_match(after)
}

struct SkuMatch {
    code: String,
    /// Text to scrub from the item name, label included.
    matched: String,
}

fn extract_sku(line: &str) -> Option<SkuMatch> {
    if let Some(caps) = SKU_LABELED.captures(line) {
        return Some(SkuMatch {
            code: caps[1].to_string(),
            matched: caps[0].to_string(),
        });
    }
    SKU_BARE.find(line).map(|m| SkuMatch {
        code: m.as_str().to_string(),
        matched: m.as_str().to_string(),
    })
}

/// Candidate item name: the first 2+-space-separated segment with a real
/// alphabetic run, stripped of row numbers, embedded SKU text, and any
/// trailing numeric cluster.
fn candidate_name(line: &str, sku: Option<&SkuMatch>) -> Option<String> {
    let segment = COLUMN_SPLIT
        .split(line.trim())
        .find(|s| ALPHA_RUN.is_match(s))
        .map(|s| s.to_string())
        .unwrap_or_else(|| line.trim().to_string());

    let mut name = LEADING_ROW_NUMBER.replace(&segment, "").into_owned();
    if let Some(sku) = sku {
        name = name.replace(&sku.matched, " ");
    }
    name = TRAILING_NUMERIC_CLUSTER.replace(&name, "").into_owned();
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    if ALPHA_RUN.is_match(&name) {
        Some(name)
    } else {
        None
    }
}

fn is_plausible_quantity(n: Decimal) -> bool {
    n > Decimal::ZERO && n.fract().is_zero() && n < Decimal::from(MAX_QUANTITY)
}

fn checked_unit_price(total: Decimal, quantity: Decimal) -> Option<Decimal> {
    total
        .checked_div(quantity)
        .filter(|p| *p >= Decimal::new(1, 2))
}

/// `diff / max(denom, 1)`, saturating instead of failing.
fn ratio(diff: Decimal, denom: Decimal) -> Decimal {
    diff.abs()
        .checked_div(denom.abs().max(Decimal::ONE))
        .unwrap_or(Decimal::MAX)
}

/// Lowest-error ordered pair `(q, p)` with `q*p` within tolerance of the
/// total. Earlier tokens are tried as the quantity first, matching column
/// order on real documents.
fn best_validating_pair(candidates: &[Decimal], total: Decimal) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, Decimal)> = None;
    for qi in 0..candidates.len() {
        for pi in 0..candidates.len() {
            if qi == pi {
                continue;
            }
            let err = ratio(candidates[qi] * candidates[pi] - total, total);
            if err < math_tolerance() && best.map_or(true, |(_, _, b)| err < b) {
                best = Some((qi, pi, err));
            }
        }
    }
    best.map(|(qi, pi, _)| (qi, pi))
}

/// Retry the pair search with a third token read as a tax percentage:
/// `q*p*(1 + t/100)` within tolerance of the total. Catches rows like
/// `200  0.85  10  17.00  187.00` where the total is tax-inclusive.
fn best_tax_inclusive_triple(
    candidates: &[Decimal],
    total: Decimal,
) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize, Decimal)> = None;
    for qi in 0..candidates.len() {
        for pi in 0..candidates.len() {
            if qi == pi {
                continue;
            }
            for ti in 0..candidates.len() {
                if ti == qi || ti == pi {
                    continue;
                }
                let t = candidates[ti];
                if t <= Decimal::ZERO || t > Decimal::from(MAX_TAX_PCT) {
                    continue;
                }
                let gross = candidates[qi]
                    * candidates[pi]
                    * (Decimal::ONE + t / Decimal::ONE_HUNDRED);
                let err = ratio(gross - total, total);
                if err < math_tolerance() && best.map_or(true, |(_, _, _, b)| err < b) {
                    best = Some((qi, pi, ti, err));
                }
            }
        }
    }
    best.map(|(qi, pi, ti, _)| (qi, pi, ti))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_simple_table_row() {
        let row = parse_line_item("Widget A  5  $12.50  $62.50", 0, None).unwrap();
        assert_eq!(row.part.item_name, "Widget A");
        assert_eq!(row.part.quantity, dec("5"));
        assert_eq!(row.part.unit_price, Some(dec("12.50")));
        assert_eq!(row.part.total_amount, dec("62.50"));
        assert!(!row.positional_fallback);
    }

    #[test]
    fn test_summary_lines_rejected() {
        assert!(parse_line_item("Subtotal  $96.65", 0, None).is_none());
        assert!(parse_line_item("Grand Total  $104.38", 0, None).is_none());
        assert!(parse_line_item("Cash Tendered 25.00", 0, None).is_none());
        assert!(parse_line_item("Change 3.12", 0, None).is_none());
    }

    #[test]
    fn test_header_row_rejected() {
        assert!(parse_line_item("Description  Qty  Unit Price  Total", 0, None).is_none());
    }

    #[test]
    fn test_tax_inclusive_row() {
        let row =
            parse_line_item("Hex Bolt M12 x 75mm  200  0.85  10  17.00  187.00", 0, None).unwrap();
        assert_eq!(row.part.item_name, "Hex Bolt M12 x 75mm");
        assert_eq!(row.part.quantity, dec("200"));
        assert_eq!(row.part.unit_price, Some(dec("0.85")));
        assert_eq!(row.part.tax_percentage, Some(dec("10")));
        assert_eq!(row.part.tax_amount, Some(dec("17.00")));
        assert_eq!(row.part.total_amount, dec("187.00"));
        assert!(!row.positional_fallback);
    }

    #[test]
    fn test_single_amount_line() {
        let row = parse_line_item("GREAT VALUE MILK 3.48", 0, None).unwrap();
        assert_eq!(row.part.item_name, "GREAT VALUE MILK");
        assert_eq!(row.part.quantity, Decimal::ONE);
        assert_eq!(row.part.unit_price, Some(dec("3.48")));
        assert_eq!(row.part.total_amount, dec("3.48"));
    }

    #[test]
    fn test_single_candidate_as_quantity() {
        // "2" is a plausible quantity; the unit price derives from the total.
        let row = parse_line_item("Oil Filter  2  19.98", 0, None).unwrap();
        assert_eq!(row.part.quantity, dec("2"));
        assert_eq!(row.part.unit_price, Some(dec("9.99")));
    }

    #[test]
    fn test_percent_token_sets_tax_percentage() {
        let row = parse_line_item("Service Fee  1  50.00  8%  50.00", 0, None).unwrap();
        assert_eq!(row.part.tax_percentage, Some(dec("8")));
        // Tax amount derives from the known rate.
        assert_eq!(row.part.tax_amount, Some(dec("4.00")));
    }

    #[test]
    fn test_positional_fallback_flagged() {
        // No pair validates: 3 * 7.00 is nowhere near 99.00.
        let row = parse_line_item("Mystery Item  3  7.00  99.00", 0, None).unwrap();
        assert!(row.positional_fallback);
        assert_eq!(row.part.quantity, dec("3"));
        assert_eq!(row.part.unit_price, Some(dec("7.00")));
        assert_eq!(row.part.total_amount, dec("99.00"));
    }

    #[test]
    fn test_default_tax_rate_applies() {
        let row = parse_line_item("Widget A  5  $12.50  $62.50", 0, Some(dec("8"))).unwrap();
        assert_eq!(row.part.tax_percentage, Some(dec("8")));
        assert_eq!(row.part.tax_amount, Some(dec("5.00")));
    }

    #[test]
    fn test_sku_extracted_and_removed_from_name() {
        let row = parse_line_item("Brake Pad Set SKU: BRK-PD-2214  1  89.99", 0, None).unwrap();
        assert_eq!(row.part.sku.as_deref(), Some("BRK-PD-2214"));
        assert_eq!(row.part.item_name, "Brake Pad Set");
    }

    #[test]
    fn test_rejects_huge_and_nonpositive_totals() {
        assert!(parse_line_item("Thing  55555555", 0, None).is_none());
        assert!(parse_line_item("Thing  0", 0, None).is_none());
    }

    #[test]
    fn test_dates_and_times_do_not_tokenize() {
        assert!(parse_line_item("01/20/2024 09:45 AM", 0, None).is_none());
    }

    #[test]
    fn test_address_lines_rejected() {
        assert!(parse_line_item("Anytown, CA 90210", 0, None).is_none());
        assert!(parse_line_item("123 Main Street", 0, None).is_none());
        assert!(parse_line_item("Newcastle NSW 2300", 0, None).is_none());
    }

    #[test]
    fn test_trailing_tax_flag_and_unit_allowed() {
        assert!(parse_line_item("GREAT VALUE MILK 3.48 F", 0, None).is_some());
        assert!(parse_line_item("Consulting  3  80.00  240.00 USD", 0, None).is_some());
    }

    #[test]
    fn test_row_number_stripped() {
        let row = parse_line_item("1. Widget A  5  12.50  62.50", 0, None).unwrap();
        assert_eq!(row.part.item_name, "Widget A");
    }
}
