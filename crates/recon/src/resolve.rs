//! Duplicate resolution for supplemental records.
//!
//! A group is first narrowed to records whose `add_in` version is not
//! newer than the catalog's own version. One survivor is taken as is;
//! several are handed to a [`DuplicateDecider`].

use std::fmt;

use crate::error::ReconError;
use crate::model::{DuplicateGroup, FieldKey, FieldRecord, ResolutionStats, SupplementalDataset};
use crate::version::{Version, VersionParseError};

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Index into the candidate list.
    Select(usize),
    Cancel,
}

/// Chooses among several version-eligible records for one identifier.
pub trait DuplicateDecider {
    fn decide(&mut self, identifier: &str, candidates: &[FieldRecord]) -> Decision;
}

impl<F> DuplicateDecider for F
where
    F: FnMut(&str, &[FieldRecord]) -> Decision,
{
    fn decide(&mut self, identifier: &str, candidates: &[FieldRecord]) -> Decision {
        self(identifier, candidates)
    }
}

/// Always takes the first candidate (file order).
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl DuplicateDecider for FirstCandidate {
    fn decide(&mut self, _identifier: &str, _candidates: &[FieldRecord]) -> Decision {
        Decision::Select(0)
    }
}

/// Cancels the run at the first ambiguous group.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelOnAmbiguity;

impl DuplicateDecider for CancelOnAmbiguity {
    fn decide(&mut self, _identifier: &str, _candidates: &[FieldRecord]) -> Decision {
        Decision::Cancel
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionNote {
    /// The catalog file name has no version token; every group was dropped.
    NoTargetVersion { groups: usize },
    /// The version token did not parse; every group was dropped.
    BadTargetVersion { error: VersionParseError, groups: usize },
    TargetVersion(String),
    BadAddIn { identifier: String, error: VersionParseError },
    NoCandidate { identifier: String },
    AutoSelected { identifier: String },
    OperatorSelected { identifier: String, index: usize },
}

impl ResolutionNote {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::NoTargetVersion { .. }
                | Self::BadTargetVersion { .. }
                | Self::BadAddIn { .. }
                | Self::NoCandidate { .. }
        )
    }
}

impl fmt::Display for ResolutionNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTargetVersion { groups } => write!(
                f,
                "cannot determine catalog version from file name; {groups} duplicate group(s) dropped"
            ),
            Self::BadTargetVersion { error, groups } => {
                write!(f, "catalog version: {error}; {groups} duplicate group(s) dropped")
            }
            Self::TargetVersion(v) => write!(f, "catalog version from file name: {v}"),
            Self::BadAddIn { identifier, error } => write!(f, "'{identifier}': add_in {error}"),
            Self::NoCandidate { identifier } => {
                write!(f, "no eligible version found for '{identifier}'")
            }
            Self::AutoSelected { identifier } => {
                write!(f, "automatically selected the only eligible record for '{identifier}'")
            }
            Self::OperatorSelected { identifier, index } => {
                write!(f, "selected record {} for '{identifier}'", index + 1)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Resolution {
    /// One winning record per resolved identifier.
    pub selected: SupplementalDataset,
    pub stats: ResolutionStats,
    pub notes: Vec<ResolutionNote>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Version token of a catalog file stem: third `_`-separated token
/// (`mame_039_0.33b3` → `0.33b3`).
pub fn target_version(file_stem: &str) -> Option<&str> {
    file_stem.split('_').nth(2)
}

/// Records of `group` whose `add_in` parses and is `<= target`.
pub fn eligible_records(
    group: &DuplicateGroup,
    target: &Version,
    notes: &mut Vec<ResolutionNote>,
) -> Vec<FieldRecord> {
    let mut eligible = Vec::new();
    for record in &group.records {
        let add_in = record.get(FieldKey::AddIn).unwrap_or("");
        match Version::parse(add_in) {
            Ok(version) if version <= *target => eligible.push(record.clone()),
            Ok(_) => {}
            Err(error) => notes.push(ResolutionNote::BadAddIn {
                identifier: group.identifier.clone(),
                error,
            }),
        }
    }
    eligible
}

/// Resolve every group to at most one record.
///
/// Cancellation, or an out-of-range answer, aborts with an error and
/// nothing resolved so far is returned.
pub fn resolve_duplicates(
    groups: Vec<DuplicateGroup>,
    target: Option<&str>,
    decider: &mut dyn DuplicateDecider,
) -> Result<Resolution, ReconError> {
    let mut resolution = Resolution::default();
    if groups.is_empty() {
        return Ok(resolution);
    }

    let Some(target) = target else {
        resolution.stats.dropped = groups.len();
        resolution.notes.push(ResolutionNote::NoTargetVersion { groups: groups.len() });
        return Ok(resolution);
    };
    let target = match Version::parse(target) {
        Ok(v) => v,
        Err(error) => {
            resolution.stats.dropped = groups.len();
            resolution.notes.push(ResolutionNote::BadTargetVersion {
                error,
                groups: groups.len(),
            });
            return Ok(resolution);
        }
    };
    resolution.stats.target_version = Some(target.to_string());
    resolution.notes.push(ResolutionNote::TargetVersion(target.to_string()));

    for group in groups {
        let mut eligible = eligible_records(&group, &target, &mut resolution.notes);
        let identifier = group.identifier;

        let index = match eligible.len() {
            0 => {
                resolution.stats.dropped += 1;
                resolution.notes.push(ResolutionNote::NoCandidate { identifier });
                continue;
            }
            1 => {
                resolution.stats.auto_selected += 1;
                resolution.notes.push(ResolutionNote::AutoSelected {
                    identifier: identifier.clone(),
                });
                0
            }
            n => match decider.decide(&identifier, &eligible) {
                Decision::Select(index) if index < n => {
                    resolution.stats.operator_selected += 1;
                    resolution.notes.push(ResolutionNote::OperatorSelected {
                        identifier: identifier.clone(),
                        index,
                    });
                    index
                }
                Decision::Select(index) => {
                    return Err(ReconError::InvalidDecision { identifier, index, candidates: n });
                }
                Decision::Cancel => return Err(ReconError::DuplicateUnresolved { identifier }),
            },
        };

        let winner = eligible.swap_remove(index);
        resolution.selected.insert(identifier, winner);
    }

    Ok(resolution)
}
