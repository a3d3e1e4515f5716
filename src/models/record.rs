//! Canonical record types produced by the extraction pipeline.
//!
//! Everything here is a value record: no hidden references, no shared
//! mutable state. Missing fields are `Option`, never empty strings or
//! zeros, with three documented exceptions: `Totals::grand_total` defaults
//! to 0, `Part::quantity` defaults to 1, and `Transaction::currency`
//! defaults to `USD`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A postal address with a flattened single-line form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Street name and number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    /// City or suburb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// State, province, or region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Postal or ZIP code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// ISO-3166 two-letter country code where derivable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Single-line form. Present whenever any component is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
}

impl Address {
    /// Check whether no component carries data.
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
            && self.full_address.is_none()
    }

    /// Rebuild `full_address` as the comma-joined non-empty components,
    /// keeping the invariant that it is present whenever any component is.
    pub fn flatten(&mut self) {
        let parts: Vec<&str> = [
            self.street.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.postal_code.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        if !parts.is_empty() {
            self.full_address = Some(parts.join(", "));
        }
    }
}

/// Contact details for a party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Phone number in the form it appeared on the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Website URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.website.is_none()
    }
}

/// Jurisdiction-specific tax and business identifiers.
///
/// At most one value per jurisdiction; unmatched identifiers stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxInformation {
    /// Generic labeled tax ID (e.g. a US federal tax ID on an invoice).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    /// GST registration (Australian GST or Indian GSTIN).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,

    /// EU-style VAT registration number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,

    /// US Employer Identification Number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ein: Option<String>,

    /// Australian Business Number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abn_number: Option<String>,

    /// Australian Company Number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acn_number: Option<String>,
}

impl TaxInformation {
    pub fn is_empty(&self) -> bool {
        self.tax_id.is_none()
            && self.gst_number.is_none()
            && self.vat_number.is_none()
            && self.ein.is_none()
            && self.abn_number.is_none()
            && self.acn_number.is_none()
    }
}

/// Geographic coordinates, when a provider supplies them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The party that issued the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    /// Supplier name. May be empty when nothing usable was found.
    pub name: String,

    /// Supplier address.
    pub address: Address,

    /// Supplier contact details.
    pub contact: Contact,

    /// Tax identifiers found on the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_information: Option<TaxInformation>,

    /// Geographic coordinates, when supplied by an outer provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// The party the document is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Buyer address. May carry only `full_address`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

impl Buyer {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.contact.is_none()
    }
}

/// Transaction-level metadata: identifiers, dates, payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_number: Option<String>,

    /// Issue date, ISO `YYYY-MM-DD` on the wire when derivable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,

    /// Time of sale in the original OCR-captured form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,

    /// ISO-4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            invoice_number: None,
            purchase_order_number: None,
            quote_number: None,
            invoice_date: None,
            due_date: None,
            transaction_date: None,
            transaction_time: None,
            payment_mode: None,
            payment_terms: None,
            currency: default_currency(),
        }
    }
}

/// A single line item on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Item name. Required.
    pub item_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_part_number: Option<String>,

    /// Unit of measure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Quantity, defaulting to 1.
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,

    /// Line total. Required, never negative.
    pub total_amount: Decimal,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

impl Part {
    /// Create a part with the two required fields; everything else absent.
    pub fn new(item_name: impl Into<String>, total_amount: Decimal) -> Self {
        Self {
            item_name: item_name.into(),
            description: None,
            sku: None,
            part_number: None,
            manufacturer_part_number: None,
            unit: None,
            quantity: Decimal::ONE,
            unit_price: None,
            discount: None,
            tax_percentage: None,
            tax_amount: None,
            total_amount,
        }
    }
}

/// Totals block for the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_charge: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_due: Option<Decimal>,

    /// Final amount owed or paid. Defaults to 0 when nothing was found.
    pub grand_total: Decimal,
}

/// Kind of business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Receipt,
    PurchaseOrder,
    WorkOrder,
    Bill,
    Statement,
    Quote,
    Cmms,
    SupplierDocument,
    Contract,
    Generic,
}

impl DocumentType {
    /// Wire name of the document type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Receipt => "receipt",
            DocumentType::PurchaseOrder => "purchase_order",
            DocumentType::WorkOrder => "work_order",
            DocumentType::Bill => "bill",
            DocumentType::Statement => "statement",
            DocumentType::Quote => "quote",
            DocumentType::Cmms => "cmms",
            DocumentType::SupplierDocument => "supplier_document",
            DocumentType::Contract => "contract",
            DocumentType::Generic => "generic",
        }
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        Self::Generic
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = ();

    /// Lenient parse of a caller-supplied hint. Unknown values map to
    /// `Generic` rather than failing, so hints can never abort a parse.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Ok(match normalized.as_str() {
            "invoice" => DocumentType::Invoice,
            "receipt" => DocumentType::Receipt,
            "purchase_order" | "po" => DocumentType::PurchaseOrder,
            "work_order" | "wo" => DocumentType::WorkOrder,
            "bill" => DocumentType::Bill,
            "statement" => DocumentType::Statement,
            "quote" | "quotation" | "estimate" => DocumentType::Quote,
            "cmms" => DocumentType::Cmms,
            "supplier_document" | "supplier" => DocumentType::SupplierDocument,
            "contract" => DocumentType::Contract,
            _ => DocumentType::Generic,
        })
    }
}

/// Metadata about the extraction itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Detected or caller-supplied document type.
    pub document_type: DocumentType,

    /// Composite confidence in [0, 1].
    pub confidence_score: f32,

    /// Instant the extraction completed, ISO-8601 on the wire.
    pub extraction_timestamp: DateTime<Utc>,

    /// BCP-47 language tag.
    pub language_detected: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider_used: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            document_type: DocumentType::Generic,
            confidence_score: 0.0,
            extraction_timestamp: Utc::now(),
            language_detected: "en".to_string(),
            ocr_provider: None,
            ai_provider_used: None,
            processing_time_ms: None,
            warnings: Vec::new(),
        }
    }
}

/// A complete extracted document record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub supplier: Supplier,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,

    pub transaction: Transaction,

    #[serde(default)]
    pub parts: Vec<Part>,

    pub totals: Totals,

    pub metadata: Metadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl Record {
    /// Serialize to the snake_case wire shape.
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::error::SiftError::Serialization(e.to_string()))
    }

    /// Deserialize from the snake_case wire shape.
    pub fn from_json(s: &str) -> crate::error::Result<Self> {
        serde_json::from_str(s).map_err(|e| crate::error::SiftError::Serialization(e.to_string()))
    }
}
