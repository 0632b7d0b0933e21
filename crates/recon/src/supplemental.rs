//! Loader for the `;`-delimited supplemental data file.
//!
//! One record per line, sixteen fields: the identifier followed by the
//! fifteen [`FieldKey`]s in declaration order. Blank lines and lines
//! starting with `#` are ignored.

use std::collections::HashMap;
use std::fmt;

use crate::error::ReconError;
use crate::model::{
    DuplicateGroup, FieldKey, FieldRecord, ReferenceDataset, SupplementalDataset,
    SupplementalStats, Universe,
};

pub const FIELD_COUNT: usize = 1 + FieldKey::ALL.len();

/// A line rejected for its shape. Recoverable: the line is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormatError {
    pub line: u64,
    pub fields: usize,
}

impl fmt::Display for LineFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: wrong field count ({} instead of {FIELD_COUNT})",
            self.line, self.fields
        )
    }
}

#[derive(Debug, Default)]
pub struct SupplementalLoad {
    /// Identifiers seen exactly once.
    pub records: SupplementalDataset,
    /// Identifiers seen more than once, in order of first appearance.
    pub duplicates: Vec<DuplicateGroup>,
    pub rejected: Vec<LineFormatError>,
    pub stats: SupplementalStats,
}

/// Parse `text`, keeping only identifiers in `universe` that have no
/// entry in `reference`.
pub fn load_supplemental(
    text: &str,
    universe: &Universe,
    reference: &ReferenceDataset,
) -> Result<SupplementalLoad, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut load = SupplementalLoad::default();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(|e| ReconError::DataFormat(e.to_string()))?;

        let first = record.get(0).unwrap_or("");
        if (record.len() == 1 && first.is_empty()) || first.starts_with('#') {
            continue;
        }
        load.stats.lines += 1;

        if record.len() != FIELD_COUNT {
            load.stats.malformed += 1;
            load.rejected.push(LineFormatError {
                line: record.position().map_or(0, |p| p.line()),
                fields: record.len(),
            });
            continue;
        }

        let identifier = first;
        if !universe.contains(identifier) {
            load.stats.skipped_unknown += 1;
            continue;
        }
        if reference.contains_key(identifier) {
            load.stats.skipped_reference += 1;
            continue;
        }

        let fields: FieldRecord = FieldKey::ALL
            .into_iter()
            .zip(record.iter().skip(1))
            .map(|(key, value)| (key, value.to_string()))
            .collect();

        if let Some(&idx) = group_index.get(identifier) {
            load.duplicates[idx].records.push(fields);
        } else if let Some(previous) = load.records.remove(identifier) {
            group_index.insert(identifier.to_string(), load.duplicates.len());
            load.duplicates.push(DuplicateGroup {
                identifier: identifier.to_string(),
                records: vec![previous, fields],
            });
        } else {
            load.records.insert(identifier.to_string(), fields);
        }
    }

    load.stats.loaded = load.records.len() + load.duplicates.len();
    load.stats.duplicate_groups = load.duplicates.len();
    Ok(load)
}
