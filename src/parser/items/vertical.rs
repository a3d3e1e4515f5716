//! Vertical form extraction for POS and thermal-receipt layouts.
//!
//! On these documents every field sits on its own line: a label line
//! ("Part Number", "Price", "Total") followed by the value line. The
//! extractor collects the first occurrence of each known label, then emits
//! at most two parts: the main item and an optional core deposit.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::Part;
use crate::rules::parse_amount;
use crate::rules::patterns::{ALPHA_RUN, AMOUNT_LINE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    PartNumber,
    Description,
    Price,
    Net,
    Total,
    CoreDeposit,
    Quantity,
}

lazy_static! {
    static ref LABELS: Vec<(Regex, FormField)> = vec![
        (
            Regex::new(r"(?i)^[ \t]*part[ \t]*(?:no\.?|number|#)[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::PartNumber
        ),
        (
            Regex::new(r"(?i)^[ \t]*(?:description|item)[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::Description
        ),
        (
            Regex::new(r"(?i)^[ \t]*(?:unit[ \t]+)?price[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::Price
        ),
        (
            Regex::new(r"(?i)^[ \t]*net(?:[ \t]+amount)?[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::Net
        ),
        (
            Regex::new(r"(?i)^[ \t]*total[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::Total
        ),
        (
            Regex::new(r"(?i)^[ \t]*core[ \t]+(?:deposit|charge)[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::CoreDeposit
        ),
        (
            Regex::new(r"(?i)^[ \t]*(?:qty|quantity)[ \t]*[:.]?[ \t]*$").unwrap(),
            FormField::Quantity
        ),
    ];

    static ref INLINE_QTY: Regex = Regex::new(r"(?i)\bqty[ \t]*[:.][ \t]*(\d+)\b").unwrap();
}

/// Minimum distinct labels before the layout counts as a vertical form.
const MIN_LABELS: usize = 2;

/// Core-deposit values at or below this read as a quantity, not money.
fn core_quantity_ceiling() -> Decimal {
    Decimal::TWO
}

#[derive(Debug)]
struct Captured {
    field: FormField,
    value: String,
    value_idx: usize,
}

/// Extract parts from a vertical form layout. Returns an empty list unless
/// at least two labels were found along with a description or part number.
pub fn extract(lines: &[String]) -> Vec<Part> {
    let captured = collect_pairs(lines);
    let inline_qty = lines
        .iter()
        .find_map(|l| INLINE_QTY.captures(l))
        .and_then(|caps| caps[1].parse::<Decimal>().ok());

    let label_count = captured.len() + usize::from(inline_qty.is_some());

    let get = |field: FormField| captured.iter().find(|c| c.field == field);

    let part_number = get(FormField::PartNumber).map(|c| c.value.trim().to_string());
    let mut description = get(FormField::Description).map(|c| c.value.trim().to_string());

    if label_count < MIN_LABELS || (description.is_none() && part_number.is_none()) {
        return Vec::new();
    }

    // Description may have been missed by label pairing; take the first
    // substantive alphabetic line inside the label region instead.
    if description.is_none() {
        description = fallback_description(lines, &captured, part_number.as_deref());
    }

    let price = get(FormField::Price).and_then(|c| parse_amount(&c.value));
    let net = get(FormField::Net).and_then(|c| parse_amount(&c.value));
    let total_capture = get(FormField::Total);
    let total = total_capture.and_then(|c| parse_amount(&c.value));

    let Some(total_amount) = total.or(net).or(price) else {
        return Vec::new();
    };

    let quantity = get(FormField::Quantity)
        .and_then(|c| parse_amount(&c.value))
        .or(inline_qty)
        .filter(|q| *q > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);

    let name = description
        .clone()
        .or_else(|| part_number.clone())
        .unwrap_or_default();

    debug!(name = %name, %total_amount, "vertical form item");

    let mut main = Part::new(name, total_amount.round_dp(4));
    main.description = description;
    main.part_number = part_number;
    main.quantity = quantity;
    main.unit_price = price.or(net).map(|p| p.round_dp(4));

    let mut parts = vec![main];

    if let Some(deposit) = core_deposit_amount(lines, &captured, total_capture) {
        let mut core = Part::new("Core Deposit", deposit.round_dp(4));
        core.unit_price = Some(deposit.round_dp(4));
        parts.push(core);
    }

    parts
}

/// First occurrence of each label, paired with its value on the next line.
/// A label directly followed by another label captures nothing.
fn collect_pairs(lines: &[String]) -> Vec<Captured> {
    let mut captured: Vec<Captured> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        for (pattern, field) in LABELS.iter() {
            if !pattern.is_match(line) {
                continue;
            }
            if captured.iter().any(|c| c.field == *field) {
                break;
            }
            if let Some(value) = lines.get(i + 1) {
                if !is_label_line(value) {
                    captured.push(Captured {
                        field: *field,
                        value: value.clone(),
                        value_idx: i + 1,
                    });
                }
            }
            break;
        }
    }

    captured
}

fn is_label_line(line: &str) -> bool {
    LABELS.iter().any(|(pattern, _)| pattern.is_match(line))
}

fn fallback_description(
    lines: &[String],
    captured: &[Captured],
    part_number: Option<&str>,
) -> Option<String> {
    let first = captured.iter().map(|c| c.value_idx.saturating_sub(1)).min()?;
    let last = captured.iter().map(|c| c.value_idx).max()?;

    lines[first..=last.min(lines.len() - 1)]
        .iter()
        .map(|l| l.trim())
        .filter(|l| ALPHA_RUN.is_match(l))
        .filter(|l| !is_label_line(l))
        .filter(|l| !AMOUNT_LINE.is_match(l))
        .find(|l| part_number.map_or(true, |pn| *l != pn))
        .map(|l| l.to_string())
}

/// The deposit amount for the optional second part.
///
/// A label-captured core value at or below 2 is usually the deposit
/// quantity; when a Total value exists, the real amount is the first
/// standalone monetary line of at least 2 past it.
fn core_deposit_amount(
    lines: &[String],
    captured: &[Captured],
    total_capture: Option<&Captured>,
) -> Option<Decimal> {
    let core = captured.iter().find(|c| c.field == FormField::CoreDeposit)?;
    let core_value = parse_amount(&core.value)?;

    if core_value <= core_quantity_ceiling() {
        if let Some(total) = total_capture {
            let rescanned = lines
                .iter()
                .skip(total.value_idx + 1)
                .filter(|l| AMOUNT_LINE.is_match(l))
                .filter_map(|l| parse_amount(l))
                .find(|v| *v >= Decimal::TWO);
            return rescanned.or(Some(core_value)).filter(|v| *v > Decimal::ZERO);
        }
    }

    Some(core_value).filter(|v| *v > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parts_store_receipt() {
        let doc = lines(&[
            "AUTO PARTS STORE #4321",
            "Part Number",
            "90-27-3325",
            "Description",
            "Remanufactured Alternator",
            "Price",
            "189.99",
            "Core Deposit",
            "1",
            "Total",
            "211.98",
            "21.99",
        ]);
        let parts = extract(&doc);
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].item_name, "Remanufactured Alternator");
        assert_eq!(parts[0].part_number.as_deref(), Some("90-27-3325"));
        assert_eq!(parts[0].unit_price, Some(dec("189.99")));
        assert_eq!(parts[0].total_amount, dec("211.98"));

        // The "1" after Core Deposit was a quantity; the real deposit sits
        // past the Total value.
        assert_eq!(parts[1].item_name, "Core Deposit");
        assert_eq!(parts[1].total_amount, dec("21.99"));
    }

    #[test]
    fn test_description_fallback_line() {
        let doc = lines(&[
            "Part Number",
            "77-10-0042",
            "Heavy Duty Starter Motor",
            "Price",
            "149.50",
        ]);
        let parts = extract(&doc);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].item_name, "Heavy Duty Starter Motor");
        assert_eq!(parts[0].total_amount, dec("149.50"));
    }

    #[test]
    fn test_inline_qty() {
        let doc = lines(&[
            "Description",
            "Wiper Blade",
            "Qty: 2",
            "Total",
            "25.98",
        ]);
        let parts = extract(&doc);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].quantity, dec("2"));
    }

    #[test]
    fn test_requires_two_labels() {
        let doc = lines(&["Description", "Lone Item"]);
        assert!(extract(&doc).is_empty());
    }

    #[test]
    fn test_requires_identity_field() {
        let doc = lines(&["Price", "10.00", "Total", "10.00"]);
        assert!(extract(&doc).is_empty());
    }

    #[test]
    fn test_tabular_documents_do_not_match() {
        let doc = lines(&[
            "Description  Qty  Unit Price  Total",
            "Widget A  5  $12.50  $62.50",
        ]);
        assert!(extract(&doc).is_empty());
    }
}
