//! Tax and business identifier extraction.

use crate::models::TaxInformation;

use super::patterns::{ABN, ACN, EIN, GSTIN, GST_AU, TAX_ID_LABELED, VAT};

/// Apply the jurisdiction patterns in sequence and merge the results.
/// Returns `None` when nothing matched; at most one value per field.
pub fn extract_tax_information(text: &str) -> Option<TaxInformation> {
    let mut info = TaxInformation::default();

    if let Some(caps) = ABN.captures(text) {
        info.abn_number = Some(caps[1].to_string());
    }
    if let Some(caps) = ACN.captures(text) {
        info.acn_number = Some(caps[1].to_string());
    }
    if let Some(caps) = GST_AU.captures(text) {
        info.gst_number = Some(caps[1].to_string());
    }
    if info.gst_number.is_none() {
        if let Some(caps) = GSTIN.captures(text) {
            info.gst_number = Some(caps[1].to_string());
        }
    }
    if let Some(caps) = EIN.captures(text) {
        info.ein = Some(caps[1].to_string());
    }
    if let Some(caps) = VAT.captures(text) {
        info.vat_number = Some(caps[1].to_string());
    }
    if let Some(caps) = TAX_ID_LABELED.captures(text) {
        info.tax_id = Some(caps[1].to_string());
    }

    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}
