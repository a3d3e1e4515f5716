//! Rule-based field extractors: the pattern library and the pure
//! functions built on top of it.
//!
//! Every extractor here is a pure function over text. "No value" is an
//! `Option::None`, never an error; nothing in this module can fail on any
//! UTF-8 input.

pub mod address;
pub mod amounts;
pub mod contact;
pub mod currency;
pub mod dates;
pub mod doctype;
pub mod language;
pub mod patterns;
pub mod tax;

pub use address::parse_address;
pub use amounts::{parse_amount, LabeledAmount};
pub use contact::{extract_email, extract_phone, extract_website, PhoneExtractor};
pub use currency::detect_currency;
pub use dates::{extract_dates, DateExtractor, DocumentDates};
pub use doctype::classify_document_type;
pub use language::detect_language;
pub use tax::extract_tax_information;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched field value with its provenance in the source text.
///
/// Match-level confidence is deliberately absent: scoring happens once,
/// over the whole record, in the confidence engine.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte offsets of the match in the scanned text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
