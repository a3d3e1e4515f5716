//! Totals block extraction.
//!
//! Labeled amounts are looked up in the footer first and the full text
//! second; the grand total follows a strict priority chain, where a bare
//! "total" label is honored only in the footer so a line item's Total
//! column can never become the document total.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Part, Totals};
use crate::rules::patterns::AMOUNT_LINE;
use crate::rules::{parse_amount, FieldExtractor, LabeledAmount};

lazy_static! {
    static ref SUBTOTAL: LabeledAmount = LabeledAmount::new(r"sub[ \t]?-?total");
    static ref TOTAL_TAX: LabeledAmount = LabeledAmount::new(r"total[ \t]+(?:gst|tax|vat|hst)");
    static ref ANY_TAX: LabeledAmount = LabeledAmount::new(r"gst|vat|hst|tax");
    static ref SHIPPING: LabeledAmount =
        LabeledAmount::new(r"shipping(?:[ \t]+(?:&|and)[ \t]+handling)?|freight|postage|delivery[ \t]+(?:fee|charge)");
    static ref DISCOUNT: LabeledAmount = LabeledAmount::new(r"discount|savings|coupon");
    static ref TIP: LabeledAmount = LabeledAmount::new(r"tip|gratuity");
    static ref SERVICE_CHARGE: LabeledAmount =
        LabeledAmount::new(r"service[ \t]+charge|svc[ \t]+chg");
    static ref AMOUNT_PAID: LabeledAmount =
        LabeledAmount::new(r"amount[ \t]+paid|cash[ \t]+tendered|tendered|paid");
    static ref BALANCE_DUE: LabeledAmount = LabeledAmount::new(r"balance[ \t]+due|balance");
    static ref GRAND_TOTAL: LabeledAmount =
        LabeledAmount::new(r"grand[ \t]+total|total[ \t]+amount[ \t]+due|total[ \t]+due");
    static ref AMOUNT_DUE: LabeledAmount = LabeledAmount::new(r"amount[ \t]+due|balance[ \t]+due");
    static ref BARE_TOTAL: LabeledAmount = LabeledAmount::new(r"total");

    // POS registers print "AMOUNT: 82.70"; the colon is part of the label
    // so this cannot go through LabeledAmount's word-bounded builder.
    static ref POS_AMOUNT: Regex = Regex::new(
        r"(?i)\bamount[ \t]*:[ \t]*\$?[ \t]*(-?[\d,]+(?:\.\d{1,4})?)"
    ).unwrap();

    // A POS tax-rate line: just a percentage, optionally labeled.
    static ref POS_TAX_RATE_LINE: Regex = Regex::new(
        r"(?i)^[ \t]*(?:tax|gst|hst|vat)?[ \t]*\(?\d{1,2}(?:\.\d+)?[ \t]*%\)?[ \t]*$"
    ).unwrap();
}

/// Extract the totals block. `footer` and `full` are the footer region and
/// the whole normalized text; `parts` backstops the subtotal.
pub fn extract_totals(footer: &str, full: &str, parts: &[Part]) -> (Totals, Vec<String>) {
    let mut totals = Totals::default();
    let mut warnings = Vec::new();

    totals.subtotal = pick(&SUBTOTAL, footer, full).or_else(|| {
        (!parts.is_empty()).then(|| parts.iter().map(|p| p.total_amount).sum())
    });

    if let Some((tax, implied_subtotal)) = pos_tax(footer).or_else(|| pos_tax(full)) {
        totals.total_tax = Some(tax);
        if totals.subtotal.is_none() {
            totals.subtotal = implied_subtotal;
        }
    } else {
        totals.total_tax = pick(&TOTAL_TAX, footer, full).or_else(|| pick(&ANY_TAX, footer, full));
    }

    totals.shipping_cost = pick(&SHIPPING, footer, full);
    totals.discount = pick(&DISCOUNT, footer, full);
    totals.tip = pick(&TIP, footer, full);
    totals.service_charge = pick(&SERVICE_CHARGE, footer, full);
    totals.amount_paid = pick(&AMOUNT_PAID, footer, full);
    totals.balance_due = pick(&BALANCE_DUE, footer, full);

    let grand = pick(&GRAND_TOTAL, footer, full)
        .or_else(|| pick(&AMOUNT_DUE, footer, full))
        .or_else(|| pos_amount(footer).or_else(|| pos_amount(full)))
        .or_else(|| BARE_TOTAL.extract(footer).map(|m| m.value))
        .or(totals.subtotal);

    match grand {
        Some(value) => totals.grand_total = value,
        None => {
            warnings.push("no grand total found".to_string());
        }
    }

    debug!(grand_total = %totals.grand_total, "totals extracted");

    (totals, warnings)
}

fn pick(label: &LabeledAmount, footer: &str, full: &str) -> Option<Decimal> {
    label
        .extract(footer)
        .or_else(|| label.extract(full))
        .map(|m| m.value)
}

fn pos_amount(text: &str) -> Option<Decimal> {
    POS_AMOUNT
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
        .map(|v| v.abs())
}

/// POS receipts print the tax rate on its own line with the subtotal and
/// tax amounts following as standalone lines. The smaller of the next two
/// standalone amounts is the tax.
fn pos_tax(text: &str) -> Option<(Decimal, Option<Decimal>)> {
    let lines: Vec<&str> = text.lines().collect();
    let rate_idx = lines.iter().position(|l| POS_TAX_RATE_LINE.is_match(l))?;

    let amounts: Vec<Decimal> = lines
        .iter()
        .skip(rate_idx + 1)
        .filter(|l| AMOUNT_LINE.is_match(l))
        .filter_map(|l| parse_amount(l))
        .take(2)
        .collect();

    match amounts.as_slice() {
        [a, b] => {
            let tax = (*a).min(*b);
            let subtotal = (*a).max(*b);
            Some((tax, Some(subtotal)))
        }
        _ => None,
    }
}
