use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::error::ReconError;
use crate::model::FieldKey;

// ---------------------------------------------------------------------------
// Selection keys
// ---------------------------------------------------------------------------

/// One operator-facing toggle. Each maps onto exactly one [`FieldKey`];
/// the driver toggles carry a `driver_` prefix to keep them apart from
/// the sound group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectionKey {
    Sourcefile,
    MameId,
    MachineType,
    AddBy,
    AddIn,
    SoundChannels,
    VideoScreen,
    Orientation,
    InputPlayers,
    DriverStatus,
    DriverEmulation,
    DriverColor,
    DriverSound,
    DriverGraphic,
    DriverSavestate,
}

impl SelectionKey {
    pub const ALL: [SelectionKey; 15] = [
        Self::Sourcefile,
        Self::MameId,
        Self::MachineType,
        Self::AddBy,
        Self::AddIn,
        Self::SoundChannels,
        Self::VideoScreen,
        Self::Orientation,
        Self::InputPlayers,
        Self::DriverStatus,
        Self::DriverEmulation,
        Self::DriverColor,
        Self::DriverSound,
        Self::DriverGraphic,
        Self::DriverSavestate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DriverStatus => "driver_status",
            Self::DriverEmulation => "driver_emulation",
            Self::DriverColor => "driver_color",
            Self::DriverSound => "driver_sound",
            Self::DriverGraphic => "driver_graphic",
            Self::DriverSavestate => "driver_savestate",
            other => other.field().as_str(),
        }
    }

    pub fn field(self) -> FieldKey {
        match self {
            Self::Sourcefile => FieldKey::Sourcefile,
            Self::MameId => FieldKey::MameId,
            Self::MachineType => FieldKey::MachineType,
            Self::AddBy => FieldKey::AddBy,
            Self::AddIn => FieldKey::AddIn,
            Self::SoundChannels => FieldKey::SoundChannels,
            Self::VideoScreen => FieldKey::VideoScreen,
            Self::Orientation => FieldKey::Orientation,
            Self::InputPlayers => FieldKey::InputPlayers,
            Self::DriverStatus => FieldKey::Status,
            Self::DriverEmulation => FieldKey::Emulation,
            Self::DriverColor => FieldKey::Color,
            Self::DriverSound => FieldKey::Sound,
            Self::DriverGraphic => FieldKey::Graphic,
            Self::DriverSavestate => FieldKey::Savestate,
        }
    }

    /// The toggle that controls `field`.
    pub fn for_field(field: FieldKey) -> Self {
        match field {
            FieldKey::Sourcefile => Self::Sourcefile,
            FieldKey::MameId => Self::MameId,
            FieldKey::MachineType => Self::MachineType,
            FieldKey::AddBy => Self::AddBy,
            FieldKey::AddIn => Self::AddIn,
            FieldKey::SoundChannels => Self::SoundChannels,
            FieldKey::VideoScreen => Self::VideoScreen,
            FieldKey::Orientation => Self::Orientation,
            FieldKey::InputPlayers => Self::InputPlayers,
            FieldKey::Status => Self::DriverStatus,
            FieldKey::Emulation => Self::DriverEmulation,
            FieldKey::Color => Self::DriverColor,
            FieldKey::Sound => Self::DriverSound,
            FieldKey::Graphic => Self::DriverGraphic,
            FieldKey::Savestate => Self::DriverSavestate,
        }
    }

    pub fn is_driver(self) -> bool {
        FieldKey::DRIVER.contains(&self.field())
    }
}

impl FromStr for SelectionKey {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                ReconError::SelectionParse(format!(
                    "unknown attribute '{wanted}' (expected one of: {})",
                    Self::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}

impl std::fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attribute selection
// ---------------------------------------------------------------------------

/// Which field groups a run is allowed to overwrite. Fixed for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSelection {
    selected: BTreeSet<SelectionKey>,
}

impl AttributeSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            selected: SelectionKey::ALL.into_iter().collect(),
        }
    }

    /// Build from key names such as `mameID` or `driver_status`.
    pub fn from_keys<I, S>(keys: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::none();
        for key in keys {
            let key = key.as_ref();
            if key.trim().is_empty() {
                continue;
            }
            selection.set(key.parse()?, true);
        }
        Ok(selection)
    }

    /// Parse a TOML selection profile: one `key = bool` line per toggle.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let flags: BTreeMap<String, bool> =
            toml::from_str(input).map_err(|e| ReconError::SelectionParse(e.to_string()))?;
        let mut selection = Self::none();
        for (name, on) in flags {
            selection.set(name.parse()?, on);
        }
        Ok(selection)
    }

    pub fn set(&mut self, key: SelectionKey, on: bool) {
        if on {
            self.selected.insert(key);
        } else {
            self.selected.remove(&key);
        }
    }

    pub fn is_selected(&self, key: SelectionKey) -> bool {
        self.selected.contains(&key)
    }

    /// True when the toggle controlling `field` is on.
    pub fn covers(&self, field: FieldKey) -> bool {
        self.is_selected(SelectionKey::for_field(field))
    }

    pub fn any_driver(&self) -> bool {
        self.selected.iter().any(|k| k.is_driver())
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected keys in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = SelectionKey> + '_ {
        self.selected.iter().copied()
    }
}

/// Everything the mutator needs besides the data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    pub selection: AttributeSelection,
    /// Global gate for rewriting the driver child.
    pub modify_driver: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            selection: AttributeSelection::none(),
            modify_driver: true,
        }
    }
}
