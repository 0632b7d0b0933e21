// Persisted user settings

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which merge input a path names; selects the default folder to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Catalog,
    Reference,
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Default folders
    #[serde(rename = "folders.catalog")]
    pub catalog_folder: Option<PathBuf>,

    #[serde(rename = "folders.reference")]
    pub reference_folder: Option<PathBuf>,

    #[serde(rename = "folders.data")]
    pub data_folder: Option<PathBuf>,

    // Merge defaults
    #[serde(rename = "merge.selection")]
    pub selection: Vec<String>,

    #[serde(rename = "merge.modifyDriver")]
    pub modify_driver: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_folder: None,
            reference_folder: None,
            data_folder: None,
            selection: Vec::new(),
            modify_driver: true,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Folders searched for relative input paths not found in the
    // working directory (null = working directory only)
    "folders.catalog": null,
    "folders.reference": null,
    "folders.data": null,

    // Attributes updated when no --all / --select / --selection is given.
    // Keys: sourcefile, mameID, machine_type, add_by, add_in,
    // sound_channels, video_screen, orientation, input_players,
    // driver_status, driver_emulation, driver_color, driver_sound,
    // driver_graphic, driver_savestate
    "merge.selection": [],

    // Rewrite the <driver> element when a driver_* key is selected
    "merge.modifyDriver": true
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gamelist");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`, writing the commented default file if it is missing.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {e}; using default settings", path.display());
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings JSON; lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {e}");
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            log::warn!("Error writing default {}: {e}", path.display());
        }
    }

    pub fn folder(&self, kind: InputKind) -> Option<&Path> {
        match kind {
            InputKind::Catalog => self.catalog_folder.as_deref(),
            InputKind::Reference => self.reference_folder.as_deref(),
            InputKind::Data => self.data_folder.as_deref(),
        }
    }

    /// Resolve an input path given on the command line.
    ///
    /// Absolute paths and paths that exist relative to the working
    /// directory are used as given. Otherwise the path is looked up in the
    /// default folder for `kind`; if it is not there either the original
    /// path is returned so the caller reports it as missing.
    pub fn resolve_input(&self, kind: InputKind, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        match self.folder(kind) {
            Some(folder) if folder.join(path).exists() => folder.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_FILE).unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s = Settings::parse(
            r#"{
            // only a selection
            "merge.selection": ["mameID", "driver_status"]
        }"#,
        )
        .unwrap();
        assert_eq!(s.selection, vec!["mameID", "driver_status"]);
        assert!(s.modify_driver);
        assert_eq!(s.data_folder, None);
    }

    #[test]
    fn missing_file_is_created_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamelist").join("settings.json");
        let s = Settings::load_from(&path);
        assert_eq!(s, Settings::default());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("// Folders searched"));
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ \"merge.modifyDriver\": \"yes\" }").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn written_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // lists live here\n  \"folders.data\": \"/lists/data\",\n  \"merge.modifyDriver\": false\n}\n",
        )
        .unwrap();
        let s = Settings::load_from(&path);
        assert_eq!(s.data_folder, Some(PathBuf::from("/lists/data")));
        assert!(!s.modify_driver);
    }

    #[test]
    fn relative_inputs_fall_back_to_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("extra.txt"), "").unwrap();
        let s = Settings {
            data_folder: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };

        let found = s.resolve_input(InputKind::Data, Path::new("extra.txt"));
        assert_eq!(found, dir.path().join("extra.txt"));

        let missing = s.resolve_input(InputKind::Data, Path::new("nope.txt"));
        assert_eq!(missing, Path::new("nope.txt"));

        let other_kind = s.resolve_input(InputKind::Catalog, Path::new("extra.txt"));
        assert_eq!(other_kind, Path::new("extra.txt"));
    }
}
