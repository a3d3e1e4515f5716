//! Document type classification by keyword scoring.

use crate::models::DocumentType;

/// Curated keyword sets, one per document type, in insertion order.
/// Insertion order is the tie-break: the first type to reach the maximum
/// score wins. The same lists feed the confidence engine's keyword factor.
const TYPE_KEYWORDS: &[(DocumentType, &[&str])] = &[
    (
        DocumentType::Invoice,
        &[
            "invoice", "invoice no", "invoice number", "invoice date", "tax invoice",
            "bill to", "due date", "payment terms", "amount due", "remit to",
        ],
    ),
    (
        DocumentType::Receipt,
        &[
            "receipt", "cash", "change", "tendered", "cashier", "register",
            "thank you", "store", "refund policy",
        ],
    ),
    (
        DocumentType::PurchaseOrder,
        &[
            "purchase order", "po number", "po#", "p.o.", "vendor", "ship to",
            "ordered by", "delivery date", "requisition",
        ],
    ),
    (
        DocumentType::WorkOrder,
        &[
            "work order", "wo#", "job number", "technician", "labor",
            "service performed", "completed", "site",
        ],
    ),
    (
        DocumentType::Bill,
        &[
            "billing period", "account number", "payment due", "previous balance",
            "current charges", "bill",
        ],
    ),
    (
        DocumentType::Statement,
        &[
            "statement", "account summary", "opening balance", "closing balance",
            "statement period", "transactions",
        ],
    ),
    (
        DocumentType::Quote,
        &[
            "quote", "quotation", "estimate", "valid until", "proposal",
            "quoted by", "expiry",
        ],
    ),
    (
        DocumentType::Cmms,
        &[
            "maintenance", "asset", "preventive", "work request", "downtime",
            "meter reading", "scheduled", "inspection",
        ],
    ),
    (
        DocumentType::SupplierDocument,
        &[
            "supplier", "vendor id", "remittance", "packing slip",
            "delivery note", "consignment",
        ],
    ),
    (
        DocumentType::Contract,
        &[
            "contract", "agreement", "terms and conditions", "hereinafter",
            "effective date", "party of the first part", "witnesseth",
        ],
    ),
];

/// Classify the document type by keyword score over the lowercased text.
/// Returns `Generic` iff every type scores zero.
pub fn classify_document_type(text: &str) -> DocumentType {
    let lower = text.to_lowercase();

    let mut best = DocumentType::Generic;
    let mut best_score = 0usize;

    for (doc_type, keywords) in TYPE_KEYWORDS {
        let score = keywords.iter().filter(|k| lower.contains(*k)).count();
        if score > best_score {
            best = *doc_type;
            best_score = score;
        }
    }

    best
}

/// The curated keyword list for a document type; empty for `Generic`.
pub fn keywords_for(doc_type: DocumentType) -> &'static [&'static str] {
    TYPE_KEYWORDS
        .iter()
        .find(|(t, _)| *t == doc_type)
        .map(|(_, k)| *k)
        .unwrap_or(&[])
}
