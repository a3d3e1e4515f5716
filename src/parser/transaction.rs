//! Transaction metadata: document identifiers, dates, payment fields.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Transaction;
use crate::rules::dates::extract_dates;
use crate::rules::patterns::TIME_OF_DAY;

/// Lines below a lone identifier label searched for the value.
const LABEL_LOOKAHEAD: usize = 2;

lazy_static! {
    // Same-line identifier labels. Label and value never span a newline.
    static ref INVOICE_NO_INLINE: Regex = Regex::new(
        r"(?i)\b(?:(?:tax[ \t]+)?invoice[ \t]*(?:no\.?|number|#|:)|inv[ \t]*[#:]|e-?invoice[ \t]*[#:])[ \t]*[:#]?[ \t]*([A-Za-z0-9][A-Za-z0-9\-/]*)"
    ).unwrap();

    static ref INVOICE_NO_LABEL_ONLY: Regex = Regex::new(
        r"(?i)^[ \t]*(?:tax[ \t]+)?(?:invoice|inv)[ \t]*(?:no\.?|number|#)?[ \t]*[:#]?[ \t]*$"
    ).unwrap();

    // Bare "PO" with no qualifier or colon never captures; "PO Box 123"
    // is an address, not an order number.
    static ref PO_INLINE: Regex = Regex::new(
        r"(?i)\b(?:p\.?[ \t]?o\.?[ \t]*(?:no\.?|number|#|:)|purchase[ \t]+order[ \t]*(?:no\.?|number|#|:)?)[ \t]*[:#]?[ \t]*([A-Za-z0-9][A-Za-z0-9\-/]*)"
    ).unwrap();

    static ref PO_LABEL_ONLY: Regex = Regex::new(
        r"(?i)^[ \t]*(?:p\.?[ \t]?o\.?|purchase[ \t]+order)[ \t]*(?:no\.?|number|#)?[ \t]*[:#]?[ \t]*$"
    ).unwrap();

    static ref QUOTE_INLINE: Regex = Regex::new(
        r"(?i)\b(?:quote|quotation|estimate)[ \t]*(?:no\.?|number|#|:)[ \t]*[:#]?[ \t]*([A-Za-z0-9][A-Za-z0-9\-/]*)"
    ).unwrap();

    // A line that is nothing but an identifier value.
    static ref VALUE_LINE: Regex = Regex::new(
        r"^[ \t]*([A-Za-z0-9][A-Za-z0-9\-/]+)[ \t]*$"
    ).unwrap();

    // "Payment: Cash" / "Payment method: card". The bare label requires a
    // colon immediately after it, which keeps "Payment Terms" out without
    // lookaround.
    static ref PAYMENT_MODE: Regex = Regex::new(
        r"(?i)\bpayment(?:[ \t]+(?:method|mode|type))?[ \t]*[:.][ \t]*([A-Za-z][A-Za-z ]*)"
    ).unwrap();

    static ref PAID_BY: Regex = Regex::new(
        r"(?i)\bpaid[ \t]+by[ \t]+([A-Za-z]+)"
    ).unwrap();

    static ref PAYMENT_TERMS: Regex = Regex::new(
        r"(?i)\b(?:payment[ \t]+terms?[ \t]*[:.]?|terms[ \t]*[:.])[ \t]*([^\n]+)"
    ).unwrap();
}

/// Extract transaction metadata from the normalized text. Returns the
/// transaction and any fallback warnings.
pub fn extract_transaction(text: &str, lines: &[String]) -> (Transaction, Vec<String>) {
    let mut transaction = Transaction::default();
    let mut warnings = Vec::new();

    transaction.invoice_number = labeled_identifier(
        text,
        lines,
        &INVOICE_NO_INLINE,
        &INVOICE_NO_LABEL_ONLY,
        "invoice number",
        &mut warnings,
    );
    transaction.purchase_order_number = labeled_identifier(
        text,
        lines,
        &PO_INLINE,
        &PO_LABEL_ONLY,
        "purchase order number",
        &mut warnings,
    );
    transaction.quote_number = QUOTE_INLINE
        .captures(text)
        .map(|caps| caps[1].to_string())
        .filter(|v| !is_label_word(v));

    let dates = extract_dates(text);
    transaction.invoice_date = dates.invoice_date;
    transaction.due_date = dates.due_date;
    transaction.transaction_date = dates.transaction_date;

    transaction.transaction_time = TIME_OF_DAY
        .captures(text)
        .map(|caps| caps[1].trim().to_string());

    transaction.payment_mode = PAYMENT_MODE
        .captures(text)
        .or_else(|| PAID_BY.captures(text))
        .map(|caps| caps[1].trim().to_string())
        .filter(|v| !v.is_empty());

    transaction.payment_terms = PAYMENT_TERMS
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|v| !v.is_empty());

    (transaction, warnings)
}

/// Same-line label first; when the label sits alone on a line, the value
/// may follow within two lines. The captured value is never one of the
/// label's own words - "PO Number:" with the value elsewhere must not
/// yield "Number".
fn labeled_identifier(
    text: &str,
    lines: &[String],
    inline: &Regex,
    label_only: &Regex,
    what: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    if let Some(caps) = inline.captures(text) {
        let value = caps[1].to_string();
        if !is_label_word(&value) {
            return Some(value);
        }
    }

    for (i, line) in lines.iter().enumerate() {
        if !label_only.is_match(line) {
            continue;
        }
        for ahead in lines.iter().skip(i + 1).take(LABEL_LOOKAHEAD) {
            if let Some(caps) = VALUE_LINE.captures(ahead) {
                let value = caps[1].to_string();
                if !is_label_word(&value) {
                    warnings.push(format!("{what} found via multi-line fallback"));
                    return Some(value);
                }
            }
        }
    }

    None
}

fn is_label_word(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "number" | "no" | "num" | "invoice" | "order"
    )
}
