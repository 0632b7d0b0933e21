//! Applies the selected fields of an effective record onto one entity.
//!
//! Every step is a pure transformation of the child sequence: drop the
//! children of a kind, then splice replacements in at a computed index.
//! Positions follow the catalog convention: info children right after
//! `manufacturer`; sound, video and input right after the last `rom`;
//! driver last.

use crate::catalog::{escape_attr, Attributes, Child, ChildKind, Entity};
use crate::config::MergeOptions;
use crate::model::{FieldKey, FieldRecord};

/// A copy of `entity` with the selected-and-present fields of `record` applied.
pub fn apply_selection(entity: &Entity, record: &FieldRecord, options: &MergeOptions) -> Entity {
    let selection = &options.selection;
    let pick = |key: FieldKey| selection.covers(key).then(|| record.get(key)).flatten();

    let mut attrs = entity.attrs.clone();
    if let Some(sourcefile) = pick(FieldKey::Sourcefile) {
        attrs.set("sourcefile", escape_attr(sourcefile));
    }

    let infos: Vec<(FieldKey, &str)> = FieldKey::INFO
        .into_iter()
        .filter_map(|key| pick(key).map(|v| (key, v)))
        .collect();
    let sound = pick(FieldKey::SoundChannels);
    let screen = pick(FieldKey::VideoScreen);
    let orientation = pick(FieldKey::Orientation);
    let players = pick(FieldKey::InputPlayers);

    let mut children = without(entity.children.clone(), |c| {
        c.info_name()
            .is_some_and(|name| infos.iter().any(|(key, _)| key.as_str() == name))
    });
    if sound.is_some() {
        children = without(children, |c| c.kind == ChildKind::Sound);
    }
    if screen.is_some() || orientation.is_some() {
        children = without(children, |c| c.kind == ChildKind::Video);
    }
    if players.is_some() {
        children = without(children, |c| c.kind == ChildKind::Input);
    }

    let info_at = children
        .iter()
        .position(|c| c.kind == ChildKind::Manufacturer)
        .map_or(children.len(), |i| i + 1);
    let new_infos = infos.iter().map(|(key, value)| Child::info(key.as_str(), value));
    children = insert_at(children, info_at, new_infos);

    let media_at = children
        .iter()
        .rposition(|c| c.kind == ChildKind::Rom)
        .map_or(children.len(), |i| i + 1);
    let mut media = Vec::new();
    if let Some(channels) = sound {
        media.push(single(ChildKind::Sound, &[(FieldKey::SoundChannels, channels)]));
    }
    if screen.is_some() || orientation.is_some() {
        let fields: Vec<(FieldKey, &str)> = [
            (FieldKey::VideoScreen, screen),
            (FieldKey::Orientation, orientation),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();
        media.push(single(ChildKind::Video, &fields));
    }
    if let Some(players) = players {
        media.push(single(ChildKind::Input, &[(FieldKey::InputPlayers, players)]));
    }
    children = insert_at(children, media_at, media);

    if options.modify_driver && selection.any_driver() {
        children = without(children, |c| c.kind == ChildKind::Driver);
        let fields: Vec<(FieldKey, &str)> = FieldKey::DRIVER
            .into_iter()
            .filter_map(|key| pick(key).map(|v| (key, v)))
            .collect();
        if !fields.is_empty() {
            let len = children.len();
            children = insert_at(children, len, [single(ChildKind::Driver, &fields)]);
        }
    }

    Entity {
        tag: entity.tag.clone(),
        attrs,
        children,
    }
}

fn without(children: Vec<Child>, drop: impl Fn(&Child) -> bool) -> Vec<Child> {
    children.into_iter().filter(|c| !drop(c)).collect()
}

fn insert_at(mut children: Vec<Child>, index: usize, new: impl IntoIterator<Item = Child>) -> Vec<Child> {
    children.splice(index..index, new);
    children
}

fn single(kind: ChildKind, fields: &[(FieldKey, &str)]) -> Child {
    let attrs: Attributes = fields
        .iter()
        .map(|(key, value)| (key.attribute_name(), escape_attr(value).into_owned()))
        .collect();
    Child::element(kind, attrs)
}
