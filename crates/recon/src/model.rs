use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Field keys
// ---------------------------------------------------------------------------

/// The closed set of fields a record can carry.
///
/// Declaration order matches the column order of the supplemental file
/// (after the identifier column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Sourcefile,
    MameId,
    MachineType,
    AddBy,
    AddIn,
    SoundChannels,
    VideoScreen,
    Orientation,
    InputPlayers,
    Status,
    Emulation,
    Color,
    Sound,
    Graphic,
    Savestate,
}

impl FieldKey {
    pub const ALL: [FieldKey; 15] = [
        Self::Sourcefile,
        Self::MameId,
        Self::MachineType,
        Self::AddBy,
        Self::AddIn,
        Self::SoundChannels,
        Self::VideoScreen,
        Self::Orientation,
        Self::InputPlayers,
        Self::Status,
        Self::Emulation,
        Self::Color,
        Self::Sound,
        Self::Graphic,
        Self::Savestate,
    ];

    /// Keys stored as `<info name=".." value=".."/>` children, in insertion order.
    pub const INFO: [FieldKey; 4] = [Self::MameId, Self::MachineType, Self::AddBy, Self::AddIn];

    /// Keys stored as attributes of the `<driver>` child, in attribute order.
    pub const DRIVER: [FieldKey; 6] = [
        Self::Status,
        Self::Emulation,
        Self::Color,
        Self::Sound,
        Self::Graphic,
        Self::Savestate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sourcefile => "sourcefile",
            Self::MameId => "mameID",
            Self::MachineType => "machine_type",
            Self::AddBy => "add_by",
            Self::AddIn => "add_in",
            Self::SoundChannels => "sound_channels",
            Self::VideoScreen => "video_screen",
            Self::Orientation => "orientation",
            Self::InputPlayers => "input_players",
            Self::Status => "status",
            Self::Emulation => "emulation",
            Self::Color => "color",
            Self::Sound => "sound",
            Self::Graphic => "graphic",
            Self::Savestate => "savestate",
        }
    }

    /// Map an `<info name="..">` value to its key.
    pub fn from_info_name(name: &str) -> Option<Self> {
        Self::INFO.into_iter().find(|k| k.as_str() == name)
    }

    /// Attribute name this key uses on its catalog element.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::SoundChannels => "channels",
            Self::VideoScreen => "screen",
            Self::InputPlayers => "players",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Per-entity field values. Values are plain text, not markup.
///
/// A key may be stored with an empty value; empty and absent both mean
/// "no data" to every reader of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    fields: BTreeMap<FieldKey, String>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, value: impl Into<String>) {
        self.fields.insert(key, value.into());
    }

    /// Non-empty value for `key`.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.fields
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    /// True when no key holds a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }

    /// All stored entries, empty values included.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Copy every non-empty value of `other` whose key has no data here.
    pub fn fill_missing_from(&mut self, other: &FieldRecord) {
        for (key, value) in other.iter() {
            if !value.is_empty() && !self.has(key) {
                self.insert(key, value);
            }
        }
    }
}

impl FromIterator<(FieldKey, String)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

/// Identifiers present in the primary catalog.
pub type Universe = HashSet<String>;

/// Records from the secondary catalog. Wins over supplemental data per field.
pub type ReferenceDataset = HashMap<String, FieldRecord>;

/// Records from the supplemental text file, one per identifier.
pub type SupplementalDataset = HashMap<String, FieldRecord>;

/// Two or more supplemental records sharing one identifier, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub identifier: String,
    pub records: Vec<FieldRecord>,
}

// ---------------------------------------------------------------------------
// Statistics + result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupplementalStats {
    /// Non-blank, non-comment lines seen.
    pub lines: usize,
    /// Lines rejected for having the wrong field count.
    pub malformed: usize,
    /// Lines whose identifier is not in the primary catalog.
    pub skipped_unknown: usize,
    /// Lines whose identifier already has reference data.
    pub skipped_reference: usize,
    /// Distinct identifiers accepted; a duplicated identifier counts once.
    pub loaded: usize,
    pub duplicate_groups: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
    pub auto_selected: usize,
    pub operator_selected: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingResult {
    pub total: usize,
    pub modified: usize,
    pub unmatched: Vec<String>,
    pub reference_loaded: usize,
    pub supplemental: SupplementalStats,
    pub resolution: ResolutionStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched_log: Option<String>,
}
