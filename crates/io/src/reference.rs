//! Reference catalog loader.
//!
//! The reference is a catalog in the same format as the primary one. Only
//! entities whose identifier also appears in the primary catalog are kept,
//! and only the fields the merge knows about.

use std::path::Path;

use gamelist_recon::catalog::{unescape, ChildKind, Entity};
use gamelist_recon::model::Universe;
use gamelist_recon::{FieldKey, FieldRecord, ReconError, ReferenceDataset};

use crate::text::{read_file_as_utf8, split_bom};
use crate::xml::parse_document;

/// Build the reference dataset from catalog text.
pub fn load_reference(text: &str, universe: &Universe) -> Result<ReferenceDataset, ReconError> {
    let (_, body) = split_bom(text);
    let doc = parse_document(body).map_err(ReconError::ReferenceFormat)?;

    let mut dataset = ReferenceDataset::new();
    for entity in &doc.entities {
        let Some(name) = entity.name().filter(|name| universe.contains(name.as_ref())) else {
            continue;
        };
        let record = extract_fields(entity);
        if !record.is_empty() {
            dataset.insert(name.into_owned(), record);
        }
    }
    log::debug!(
        "reference: {} of {} entities matched the catalog",
        dataset.len(),
        doc.entities.len()
    );
    Ok(dataset)
}

pub fn read_reference(path: &Path, universe: &Universe) -> Result<ReferenceDataset, ReconError> {
    let text = read_file_as_utf8(path)?;
    load_reference(&text, universe)
}

/// Fields carried by one reference entity, as plain (unescaped) values.
///
/// Sound, video, input and driver data come from the first element of each
/// kind; later ones are ignored.
pub fn extract_fields(entity: &Entity) -> FieldRecord {
    let mut record = FieldRecord::new();
    let mut put = |key: FieldKey, raw: Option<&str>| {
        if let Some(raw) = raw {
            record.insert(key, unescape(raw));
        }
    };

    put(FieldKey::Sourcefile, entity.attrs.get("sourcefile"));

    for info in entity.of_kind(ChildKind::Info) {
        let Some(key) = info.info_name().and_then(FieldKey::from_info_name) else {
            continue;
        };
        put(key, info.attrs.get("value"));
    }

    let first_attr = |kind: ChildKind, key: FieldKey| {
        entity
            .first(kind)
            .and_then(|c| c.attrs.get(key.attribute_name()))
    };
    put(FieldKey::SoundChannels, first_attr(ChildKind::Sound, FieldKey::SoundChannels));
    put(FieldKey::VideoScreen, first_attr(ChildKind::Video, FieldKey::VideoScreen));
    put(FieldKey::Orientation, first_attr(ChildKind::Video, FieldKey::Orientation));
    put(FieldKey::InputPlayers, first_attr(ChildKind::Input, FieldKey::InputPlayers));
    for key in FieldKey::DRIVER {
        put(key, first_attr(ChildKind::Driver, key));
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "<datafile>\n\
        \t<game name=\"pacman\" sourcefile=\"pacman.c\">\n\
        \t\t<description>Pac-Man</description>\n\
        \t\t<info name=\"mameID\" value=\"12\"/>\n\
        \t\t<info name=\"add_by\" value=\"Tom &amp; Jerry\"/>\n\
        \t\t<info name=\"unrelated\" value=\"x\"/>\n\
        \t\t<sound channels=\"1\"/>\n\
        \t\t<sound channels=\"4\"/>\n\
        \t\t<video screen=\"raster\" orientation=\"vertical\"/>\n\
        \t\t<driver status=\"good\" emulation=\"good\" color=\"\"/>\n\
        \t</game>\n\
        \t<game name=\"galaga\">\n\
        \t\t<info name=\"add_in\" value=\"0.30\"/>\n\
        \t</game>\n\
        \t<game name=\"bare\">\n\
        \t\t<description>Nothing to offer</description>\n\
        \t</game>\n\
        </datafile>\n";

    fn universe(names: &[&str]) -> Universe {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn extracts_known_fields_only() {
        let data = load_reference(REFERENCE, &universe(&["pacman"])).unwrap();
        let rec = &data["pacman"];
        assert_eq!(rec.get(FieldKey::Sourcefile), Some("pacman.c"));
        assert_eq!(rec.get(FieldKey::MameId), Some("12"));
        assert_eq!(rec.get(FieldKey::AddBy), Some("Tom & Jerry"));
        assert_eq!(rec.get(FieldKey::SoundChannels), Some("1"));
        assert_eq!(rec.get(FieldKey::Orientation), Some("vertical"));
        assert_eq!(rec.get(FieldKey::Emulation), Some("good"));
        assert_eq!(rec.get(FieldKey::Color), None);
        assert_eq!(rec.get(FieldKey::InputPlayers), None);
    }

    #[test]
    fn restricted_to_catalog_universe() {
        let data = load_reference(REFERENCE, &universe(&["galaga", "bare", "other"])).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["galaga"].get(FieldKey::AddIn), Some("0.30"));
    }

    #[test]
    fn unreadable_reference_is_reported() {
        let err = load_reference("<datafile><game>", &universe(&[])).unwrap_err();
        assert!(matches!(err, ReconError::ReferenceFormat(_)));
    }
}
