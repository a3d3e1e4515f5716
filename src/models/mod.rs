//! Canonical data model for extracted documents.

pub mod record;

pub use record::{
    Address, Buyer, Contact, Coordinates, DocumentType, Metadata, Part, Record, Supplier,
    TaxInformation, Totals, Transaction,
};
