//! The rule-based document parser.
//!
//! `RuleParser` drives the whole pipeline: normalize, segment, classify,
//! then extract supplier, buyer, transaction, line items, and totals into
//! one immutable [`Record`]. Parsing is total - any UTF-8 input yields a
//! record, never an error - and deterministic apart from the extraction
//! timestamp.

pub mod buyer;
pub mod items;
pub mod segment;
pub mod supplier;
pub mod totals;
pub mod transaction;

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::confidence::ConfidenceEngine;
use crate::models::{DocumentType, Metadata, Record};
use crate::normalize::normalize;
use crate::rules::{classify_document_type, detect_currency, detect_language, extract_tax_information};

use items::Strategy;
use segment::segment;

/// Per-call options: caller-supplied hints that skip detection.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Document type hint; when set, classification is skipped.
    pub document_type: Option<DocumentType>,
    /// BCP-47 language hint; when set, detection is skipped.
    pub language: Option<String>,
}

/// A parse result: the record plus the warnings and timing that also land
/// in the record's metadata.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub record: Record,
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

/// Trait for document parsers, so the surrounding glue can slot in
/// alternative engines behind one seam.
pub trait DocumentParser {
    /// Parse OCR text into a document record. Total: never fails.
    fn parse(&self, raw_text: &str, options: &ParseOptions) -> ParsedDocument;
}

/// The rule-based parser. Stateless between calls; all patterns are
/// compiled once per process, so instances are free to construct.
pub struct RuleParser {
    include_raw_text: bool,
    default_ocr_confidence: f32,
}

impl RuleParser {
    pub fn new() -> Self {
        Self {
            include_raw_text: false,
            default_ocr_confidence: 0.5,
        }
    }

    /// Carry the raw OCR text on the record.
    pub fn with_raw_text(mut self, include: bool) -> Self {
        self.include_raw_text = include;
        self
    }

    /// OCR provider confidence assumed when none is supplied.
    pub fn with_default_ocr_confidence(mut self, confidence: f32) -> Self {
        self.default_ocr_confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

impl Default for RuleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for RuleParser {
    fn parse(&self, raw_text: &str, options: &ParseOptions) -> ParsedDocument {
        let start = Instant::now();

        info!(chars = raw_text.len(), "parsing document");

        let normalized = normalize(raw_text);
        let lines: Vec<String> = normalized
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect();

        let segments = segment(&lines);
        debug!(
            header = segments.header.len(),
            body = segments.body.len(),
            footer = segments.footer.len(),
            "document segmented"
        );

        let document_type = options
            .document_type
            .unwrap_or_else(|| classify_document_type(&normalized));
        let language = options
            .language
            .clone()
            .unwrap_or_else(|| detect_language(&normalized));
        let currency = detect_currency(&normalized);

        let mut supplier = supplier::build_supplier(segments.header, None);
        supplier.tax_information = extract_tax_information(&normalized);

        let buyer = buyer::build_buyer(&lines);

        let (mut transaction, mut warnings) = transaction::extract_transaction(&normalized, &lines);
        transaction.currency = currency;

        let extraction = items::extract_parts(&lines, segments.body, None);
        if extraction.strategy == Strategy::WholeDocument && !extraction.parts.is_empty() {
            warnings.push("line items recovered by whole-document scan".to_string());
        }
        if extraction.positional_fallback {
            warnings.push("line item quantity and price assigned by position".to_string());
        }

        let footer_text = segments.footer.join("\n");
        let (totals_block, totals_warnings) =
            totals::extract_totals(&footer_text, &normalized, &extraction.parts);
        warnings.extend(totals_warnings);

        let mut record = Record {
            supplier,
            buyer,
            transaction,
            parts: extraction.parts,
            totals: totals_block,
            metadata: Metadata {
                document_type,
                confidence_score: 0.0,
                extraction_timestamp: Utc::now(),
                language_detected: language,
                ocr_provider: None,
                ai_provider_used: None,
                processing_time_ms: None,
                warnings: warnings.clone(),
            },
            raw_text: self.include_raw_text.then(|| raw_text.to_string()),
        };

        let breakdown = ConfidenceEngine::new().score(
            &record,
            raw_text,
            Some(self.default_ocr_confidence),
            document_type,
        );
        record.metadata.confidence_score = breakdown.overall;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        record.metadata.processing_time_ms = Some(processing_time_ms);

        debug!(
            document_type = %record.metadata.document_type,
            parts = record.parts.len(),
            confidence = record.metadata.confidence_score,
            "document parsed"
        );

        ParsedDocument {
            record,
            warnings,
            processing_time_ms,
        }
    }
}

/// Parse OCR text with the default rule parser. The `parse()` entry point
/// of the crate.
pub fn parse(raw_text: &str, options: &ParseOptions) -> Record {
    RuleParser::new().parse(raw_text, options).record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const US_INVOICE: &str = "\
ACME Corporation
123 Business Ave, Chicago, IL 60601
Tel: (312) 555-0100
Tax ID: 12-3456789
INVOICE
Invoice No: INV-2024-0042
Invoice Date: 01/15/2024
Due Date: 02/15/2024
Payment Terms: Net 30
Bill To:
XYZ Supplies Inc.
Description   Qty   Unit Price   Total
Widget A      5     $12.50       $62.50
Bolt B        10    $1.99        $19.90
Subtotal                         $96.65
Tax (8%)                         $7.73
Shipping                         $5.00
Discount                        -$5.00
Grand Total                     $104.38
";

    #[test]
    fn test_us_invoice_end_to_end() {
        let record = parse(US_INVOICE, &ParseOptions::default());

        assert!(record.supplier.name.to_lowercase().contains("acme"));
        assert_eq!(
            record
                .supplier
                .tax_information
                .as_ref()
                .unwrap()
                .tax_id
                .as_deref(),
            Some("12-3456789")
        );
        assert_eq!(
            record.supplier.contact.phone.as_deref(),
            Some("(312) 555-0100")
        );

        assert_eq!(
            record.transaction.invoice_number.as_deref(),
            Some("INV-2024-0042")
        );
        assert_eq!(
            record.transaction.invoice_date,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            record.transaction.due_date,
            NaiveDate::from_ymd_opt(2024, 2, 15)
        );
        assert!(record
            .transaction
            .payment_terms
            .as_deref()
            .unwrap()
            .to_lowercase()
            .replace(' ', "")
            .contains("net30"));

        assert!(record.parts.len() >= 2);
        assert_eq!(record.parts[0].item_name, "Widget A");
        assert_eq!(record.parts[0].quantity, dec("5"));

        assert_eq!(record.totals.subtotal, Some(dec("96.65")));
        assert_eq!(record.totals.total_tax, Some(dec("7.73")));
        assert_eq!(record.totals.shipping_cost, Some(dec("5.00")));
        assert_eq!(record.totals.grand_total, dec("104.38"));

        assert_eq!(record.metadata.document_type, DocumentType::Invoice);
        assert_eq!(record.metadata.language_detected, "en");
        assert_eq!(record.transaction.currency, "USD");
    }

    const WALMART_RECEIPT: &str = "\
WALMART SUPERCENTER
123 Main Street
Anytown, CA 90210
01/20/2024 09:45 AM
GREAT VALUE MILK 3.48
BANANAS 1.32
WHEAT BREAD 2.50
LARGE EGGS 12.96
Subtotal 20.26
Tax (8%) 1.62
Total 21.88
Cash Tendered 25.00
Change 3.12
";

    #[test]
    fn test_walmart_receipt_end_to_end() {
        let record = parse(WALMART_RECEIPT, &ParseOptions::default());

        assert!(record.supplier.name.to_lowercase().contains("walmart"));
        assert_eq!(record.totals.grand_total, dec("21.88"));
        assert_eq!(record.totals.subtotal, Some(dec("20.26")));
        assert_eq!(record.totals.total_tax, Some(dec("1.62")));
        assert_eq!(record.totals.amount_paid, Some(dec("25.00")));
        assert!(!record.parts.is_empty());
        assert_eq!(record.transaction.transaction_time.as_deref(), Some("09:45 AM"));
        assert_eq!(record.transaction.currency, "USD");
    }

    const PURCHASE_ORDER: &str = "\
NORTHERN TOOL SUPPLY
PO#: PO-2024-007
Vendor: Acme Industrial
Ship To: Warehouse 3
Item   Qty   Price   Total
Drill Bit Set   2   45.00   90.00
Safety Gloves   10   12.50   125.00
Work Light   5   40.50   202.50
Total: $417.50
";

    #[test]
    fn test_purchase_order_end_to_end() {
        let record = parse(PURCHASE_ORDER, &ParseOptions::default());

        assert_eq!(
            record.transaction.purchase_order_number.as_deref(),
            Some("PO-2024-007")
        );
        assert!(!record.parts.is_empty());
        assert!(record.totals.grand_total > Decimal::ZERO);
        assert!(matches!(
            record.metadata.document_type,
            DocumentType::PurchaseOrder | DocumentType::Invoice | DocumentType::Generic
        ));
    }

    #[test]
    fn test_po_number_label_contract() {
        let record = parse("PO Number: ABC-42", &ParseOptions::default());
        assert_eq!(
            record.transaction.purchase_order_number.as_deref(),
            Some("ABC-42")
        );
    }

    #[test]
    fn test_empty_input() {
        let record = parse("", &ParseOptions::default());
        assert_eq!(record.metadata.document_type, DocumentType::Generic);
        assert_eq!(record.totals.grand_total, Decimal::ZERO);
        assert!(record.parts.is_empty());
    }

    #[test]
    fn test_document_type_hint_respected() {
        let options = ParseOptions {
            document_type: Some(DocumentType::Quote),
            ..Default::default()
        };
        let record = parse(US_INVOICE, &options);
        assert_eq!(record.metadata.document_type, DocumentType::Quote);
    }

    #[test]
    fn test_deterministic_apart_from_timestamp() {
        let options = ParseOptions::default();
        let mut a = parse(US_INVOICE, &options);
        let mut b = parse(US_INVOICE, &options);
        let ts = a.metadata.extraction_timestamp;
        b.metadata.extraction_timestamp = ts;
        a.metadata.processing_time_ms = None;
        b.metadata.processing_time_ms = None;
        assert_eq!(a, b);
    }

    #[test]
    fn test_currency_default_iff_no_symbol() {
        let with_symbol = parse("Total \u{20AC}50.00", &ParseOptions::default());
        assert_eq!(with_symbol.transaction.currency, "EUR");

        let without = parse("Total 50.00", &ParseOptions::default());
        assert_eq!(without.transaction.currency, "USD");
    }

    #[test]
    fn test_confidence_bounds() {
        for text in [US_INVOICE, WALMART_RECEIPT, PURCHASE_ORDER, "", "garbage"] {
            let record = parse(text, &ParseOptions::default());
            let c = record.metadata.confidence_score;
            assert!((0.0..=1.0).contains(&c), "confidence {c} out of bounds");
        }
    }

    #[test]
    fn test_line_item_math_property() {
        let record = parse(US_INVOICE, &ParseOptions::default());
        for part in &record.parts {
            let (Some(price), qty) = (part.unit_price, part.quantity) else {
                continue;
            };
            if qty <= Decimal::ZERO {
                continue;
            }
            let base = qty * price + part.tax_amount.unwrap_or(Decimal::ZERO);
            let denom = part.total_amount.max(Decimal::ONE);
            let err = (base - part.total_amount).abs() / denom;
            let flagged = record
                .metadata
                .warnings
                .iter()
                .any(|w| w.contains("position"));
            assert!(err <= dec("0.05") || flagged, "math off for {part:?}");
        }
    }

    #[test]
    fn test_raw_text_opt_in() {
        let parsed = RuleParser::new()
            .with_raw_text(true)
            .parse(US_INVOICE, &ParseOptions::default());
        assert!(parsed.record.raw_text.as_deref().unwrap().contains("ACME"));

        let without = parse(US_INVOICE, &ParseOptions::default());
        assert!(without.raw_text.is_none());
    }
}
