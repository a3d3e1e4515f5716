//! Five-factor extraction confidence.
//!
//! Each factor lands in [0, 1]; the overall score is a fixed-weight
//! combination. The engine reads the record and the raw text, mutates
//! nothing, and treats missing inputs as the neutral value of the factor
//! concerned, so scoring never fails.

use rust_decimal::Decimal;

use crate::models::{DocumentType, Record};
use crate::rules::doctype::{classify_document_type, keywords_for};

const WEIGHT_OCR: f32 = 0.15;
const WEIGHT_FIELDS: f32 = 0.35;
const WEIGHT_NUMERIC: f32 = 0.20;
const WEIGHT_DOC_TYPE: f32 = 0.15;
const WEIGHT_KEYWORD: f32 = 0.15;

/// Word count at which OCR text is considered substantial.
const FULL_TEXT_WORDS: f32 = 50.0;

/// Neutral stand-in when the OCR provider reports no confidence.
const NEUTRAL_OCR_CONFIDENCE: f32 = 0.5;

/// The five sub-scores and their weighted combination, each rounded to
/// four decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBreakdown {
    pub overall: f32,
    pub ocr: f32,
    pub fields: f32,
    pub numeric: f32,
    pub doc_type: f32,
    pub keyword: f32,
}

/// Deterministic confidence scorer.
pub struct ConfidenceEngine;

impl ConfidenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score `record` against the raw OCR text it was extracted from.
    pub fn score(
        &self,
        record: &Record,
        raw_text: &str,
        ocr_confidence: Option<f32>,
        claimed_type: DocumentType,
    ) -> ConfidenceBreakdown {
        let ocr = ocr_score(raw_text, ocr_confidence);
        let fields = field_score(record);
        let numeric = numeric_score(record);
        let doc_type = doc_type_score(raw_text, claimed_type);
        let keyword = keyword_score(raw_text, claimed_type);

        let overall = WEIGHT_OCR * ocr
            + WEIGHT_FIELDS * fields
            + WEIGHT_NUMERIC * numeric
            + WEIGHT_DOC_TYPE * doc_type
            + WEIGHT_KEYWORD * keyword;

        ConfidenceBreakdown {
            overall: round4(overall.clamp(0.0, 1.0)),
            ocr: round4(ocr),
            fields: round4(fields),
            numeric: round4(numeric),
            doc_type: round4(doc_type),
            keyword: round4(keyword),
        }
    }
}

impl Default for ConfidenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn ocr_score(raw_text: &str, ocr_confidence: Option<f32>) -> f32 {
    let provider = ocr_confidence.unwrap_or(NEUTRAL_OCR_CONFIDENCE).clamp(0.0, 1.0);
    let words = raw_text.split_whitespace().count() as f32;
    0.6 * provider + 0.4 * (words / FULL_TEXT_WORDS).min(1.0)
}

/// Ratio of populated required fields, with half-weight bonus fields.
fn field_score(record: &Record) -> f32 {
    let required = [
        !record.supplier.name.is_empty(),
        record.transaction.invoice_number.is_some(),
        record.transaction.invoice_date.is_some(),
        !record.transaction.currency.is_empty(),
        record.totals.grand_total > Decimal::ZERO,
        !record.parts.is_empty(),
    ];
    let bonus = [
        record.supplier.contact.email.is_some(),
        record.supplier.contact.phone.is_some(),
        record
            .buyer
            .as_ref()
            .and_then(|b| b.name.as_ref())
            .is_some(),
    ];

    let achieved = required.iter().filter(|v| **v).count() as f32
        + 0.5 * bonus.iter().filter(|v| **v).count() as f32;
    let possible = required.len() as f32 + 0.5 * bonus.len() as f32;

    (achieved / possible).min(1.0)
}

/// How well the totals arithmetic holds together.
fn numeric_score(record: &Record) -> f32 {
    let totals = &record.totals;

    // Neutral when there is no denominator to check against; this also
    // covers the nothing-extracted case, where the grand total stayed 0.
    if totals.grand_total == Decimal::ZERO {
        return 0.5;
    }

    let part_sum: Decimal = record.parts.iter().map(|p| p.total_amount).sum();
    let subtotal = totals.subtotal.unwrap_or(part_sum);
    let reconstructed = subtotal
        + totals.total_tax.unwrap_or(Decimal::ZERO)
        + totals.shipping_cost.unwrap_or(Decimal::ZERO)
        + totals.tip.unwrap_or(Decimal::ZERO)
        + totals.service_charge.unwrap_or(Decimal::ZERO)
        - totals.discount.unwrap_or(Decimal::ZERO);

    let delta = (reconstructed - totals.grand_total).abs() / totals.grand_total;

    if delta < Decimal::new(1, 2) {
        1.0
    } else if delta < Decimal::new(5, 2) {
        0.8
    } else if delta < Decimal::new(15, 2) {
        0.6
    } else {
        0.3
    }
}

/// Agreement between the claimed type and a fresh classification.
fn doc_type_score(raw_text: &str, claimed: DocumentType) -> f32 {
    let detected = classify_document_type(raw_text);
    if claimed == detected {
        return 1.0;
    }
    let a = claimed.as_str();
    let b = detected.as_str();
    if a.contains(b) || b.contains(a) {
        0.7
    } else {
        0.3
    }
}

/// Fraction of the claimed type's keyword list present in the text.
fn keyword_score(raw_text: &str, claimed: DocumentType) -> f32 {
    let keywords = keywords_for(claimed);
    if keywords.is_empty() {
        return 0.5;
    }
    let lower = raw_text.to_lowercase();
    let present = keywords.iter().filter(|k| lower.contains(*k)).count();
    present as f32 / keywords.len() as f32
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
