use crate::model::{FieldRecord, ReferenceDataset, SupplementalDataset};

/// Effective fields for `identifier`.
///
/// Reference data wins per field; supplemental values only fill keys the
/// reference record leaves absent or empty. Without reference data the
/// supplemental record is used as is. An empty result means no source
/// knows the identifier.
pub fn effective_record(
    identifier: &str,
    reference: &ReferenceDataset,
    supplemental: &SupplementalDataset,
) -> FieldRecord {
    match (reference.get(identifier), supplemental.get(identifier)) {
        (Some(base), Some(fallback)) => {
            let mut merged = base.clone();
            merged.fill_missing_from(fallback);
            merged
        }
        (Some(base), None) => base.clone(),
        (None, Some(fallback)) => fallback.clone(),
        (None, None) => FieldRecord::new(),
    }
}
