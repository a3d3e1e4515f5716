//! Optional record enhancement.
//!
//! An enhancer (a remote model, a lookup service) may fill fields the rule
//! parser left empty. The contract is strict: an enhancer may only fill
//! absent fields, never overwrite populated ones, and its failure is
//! non-fatal - the rule-based record is returned unchanged.

use tracing::warn;

use crate::error::Result;
use crate::models::Record;

/// A provider that post-processes a parsed record.
pub trait RecordEnhancer {
    /// Identifier recorded in `metadata.ai_provider_used`.
    fn name(&self) -> &str;

    /// Produce a patch record. Only fields absent on the base record are
    /// taken from the result; see [`merge_preferring_existing`].
    fn enhance(&self, record: &Record, raw_text: &str) -> Result<Record>;
}

/// Run `enhancer` over `record`, merging fill-only. On failure the input
/// record comes back unchanged apart from a warning.
pub fn enhance_record(record: Record, raw_text: &str, enhancer: &dyn RecordEnhancer) -> Record {
    match enhancer.enhance(&record, raw_text) {
        Ok(patch) => {
            let mut merged = merge_preferring_existing(record, patch);
            merged.metadata.ai_provider_used = Some(enhancer.name().to_string());
            merged
        }
        Err(e) => {
            warn!(enhancer = enhancer.name(), error = %e, "enhancement failed");
            let mut record = record;
            record
                .metadata
                .warnings
                .push(format!("enhancement failed: {e}"));
            record
        }
    }
}

/// Merge `patch` into `base`, keeping every populated `base` field.
///
/// Scalars merge with `Option::or`; the supplier name merges only when the
/// base name is empty; parts and totals are taken from the patch only when
/// the base has none.
pub fn merge_preferring_existing(base: Record, patch: Record) -> Record {
    let mut merged = base;

    if merged.supplier.name.is_empty() {
        merged.supplier.name = patch.supplier.name;
    }
    if merged.supplier.address.is_empty() {
        merged.supplier.address = patch.supplier.address;
    }
    merged.supplier.contact.phone = merged.supplier.contact.phone.or(patch.supplier.contact.phone);
    merged.supplier.contact.email = merged.supplier.contact.email.or(patch.supplier.contact.email);
    merged.supplier.contact.website = merged
        .supplier
        .contact
        .website
        .or(patch.supplier.contact.website);
    merged.supplier.tax_information = merged
        .supplier
        .tax_information
        .or(patch.supplier.tax_information);
    merged.supplier.coordinates = merged.supplier.coordinates.or(patch.supplier.coordinates);

    merged.buyer = merged.buyer.or(patch.buyer);

    let t = &mut merged.transaction;
    let p = patch.transaction;
    t.invoice_number = t.invoice_number.take().or(p.invoice_number);
    t.purchase_order_number = t.purchase_order_number.take().or(p.purchase_order_number);
    t.quote_number = t.quote_number.take().or(p.quote_number);
    t.invoice_date = t.invoice_date.or(p.invoice_date);
    t.due_date = t.due_date.or(p.due_date);
    t.transaction_date = t.transaction_date.or(p.transaction_date);
    t.transaction_time = t.transaction_time.take().or(p.transaction_time);
    t.payment_mode = t.payment_mode.take().or(p.payment_mode);
    t.payment_terms = t.payment_terms.take().or(p.payment_terms);

    if merged.parts.is_empty() {
        merged.parts = patch.parts;
    }

    let totals = &mut merged.totals;
    let pt = patch.totals;
    totals.subtotal = totals.subtotal.or(pt.subtotal);
    totals.total_tax = totals.total_tax.or(pt.total_tax);
    totals.shipping_cost = totals.shipping_cost.or(pt.shipping_cost);
    totals.discount = totals.discount.or(pt.discount);
    totals.tip = totals.tip.or(pt.tip);
    totals.service_charge = totals.service_charge.or(pt.service_charge);
    totals.amount_paid = totals.amount_paid.or(pt.amount_paid);
    totals.balance_due = totals.balance_due.or(pt.balance_due);
    if totals.grand_total.is_zero() {
        totals.grand_total = pt.grand_total;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiftError;
    use crate::models::Part;
    use rust_decimal::Decimal;

    struct FillingEnhancer;

    impl RecordEnhancer for FillingEnhancer {
        fn name(&self) -> &str {
            "filling"
        }

        fn enhance(&self, _record: &Record, _raw_text: &str) -> Result<Record> {
            let mut patch = Record::default();
            patch.supplier.name = "Patched Supplier".to_string();
            patch.transaction.invoice_number = Some("PATCH-1".to_string());
            patch.parts = vec![Part::new("Patched Item", Decimal::TEN)];
            Ok(patch)
        }
    }

    struct FailingEnhancer;

    impl RecordEnhancer for FailingEnhancer {
        fn name(&self) -> &str {
            "failing"
        }

        fn enhance(&self, _record: &Record, _raw_text: &str) -> Result<Record> {
            Err(SiftError::Enhancement("model unavailable".to_string()))
        }
    }

    #[test]
    fn test_fills_absent_fields_only() {
        let mut base = Record::default();
        base.transaction.invoice_number = Some("INV-REAL".to_string());

        let merged = enhance_record(base, "", &FillingEnhancer);

        // Absent fields filled.
        assert_eq!(merged.supplier.name, "Patched Supplier");
        assert_eq!(merged.parts.len(), 1);
        // Populated fields never overwritten.
        assert_eq!(merged.transaction.invoice_number.as_deref(), Some("INV-REAL"));
        assert_eq!(merged.metadata.ai_provider_used.as_deref(), Some("filling"));
    }

    #[test]
    fn test_existing_parts_never_replaced() {
        let mut base = Record::default();
        base.parts = vec![Part::new("Real Item", Decimal::ONE)];

        let merged = enhance_record(base, "", &FillingEnhancer);
        assert_eq!(merged.parts[0].item_name, "Real Item");
    }

    #[test]
    fn test_failure_is_non_fatal() {
        let mut base = Record::default();
        base.supplier.name = "Kept".to_string();

        let merged = enhance_record(base, "", &FailingEnhancer);
        assert_eq!(merged.supplier.name, "Kept");
        assert!(merged.metadata.ai_provider_used.is_none());
        assert!(merged
            .metadata
            .warnings
            .iter()
            .any(|w| w.contains("enhancement failed")));
    }
}
