//! Rule-based extraction of structured records from OCR text.
//!
//! This crate turns the noisy text OCR produces from a business document
//! (invoice, receipt, purchase order, work order, quote, ...) into a
//! strongly-typed [`Record`]: supplier, buyer, transaction metadata, line
//! items, totals, and extraction metadata with a composite confidence
//! score.
//!
//! ```
//! use docsift::{parse, ParseOptions};
//!
//! let record = parse("Invoice No: INV-1\nWidget  2  5.00  10.00\nTotal 10.00", &ParseOptions::default());
//! assert_eq!(record.transaction.invoice_number.as_deref(), Some("INV-1"));
//! ```
//!
//! Parsing is total on UTF-8 input and deterministic apart from the
//! extraction timestamp. OCR engines, image handling, and AI providers are
//! outside this crate; the [`enhance`] module defines the seam they plug
//! into.

pub mod confidence;
pub mod enhance;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod rules;

pub use confidence::{ConfidenceBreakdown, ConfidenceEngine};
pub use enhance::{enhance_record, merge_preferring_existing, RecordEnhancer};
pub use error::{Result, SiftError};
pub use models::{
    Address, Buyer, Contact, Coordinates, DocumentType, Metadata, Part, Record, Supplier,
    TaxInformation, Totals, Transaction,
};
pub use normalize::normalize;
pub use parser::{parse, DocumentParser, ParseOptions, ParsedDocument, RuleParser};
pub use rules::{ExtractionMatch, FieldExtractor};
