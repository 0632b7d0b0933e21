use std::path::PathBuf;

use gamelist_recon::catalog::{Attributes, Catalog, Child, ChildKind, Entity};
use gamelist_recon::engine::{run, MergeOutput, ReconInput};
use gamelist_recon::resolve::{target_version, FirstCandidate};
use gamelist_recon::{
    AttributeSelection, Decision, FieldRecord, MergeOptions, ReconError, ReferenceDataset,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn entity(name: &str) -> Entity {
    let mut e = Entity::new("machine");
    e.attrs = [("name", name)].into_iter().collect();
    e.children = vec![
        Child::text(ChildKind::Description, name),
        Child::text(ChildKind::Manufacturer, "Someone"),
        Child::element(ChildKind::Rom, [("name", "a.bin")].into_iter().collect::<Attributes>()),
    ];
    e
}

fn input(stem: &str, selection: AttributeSelection) -> ReconInput {
    let names = ["robby", "bzone", "frogger", "qix", "tron"];
    let supplemental = std::fs::read_to_string(fixtures_dir().join("duplicates.txt")).unwrap();
    ReconInput {
        catalog: Catalog {
            header: "<mame>\n".into(),
            root: "mame".into(),
            entities: names.iter().map(|n| entity(n)).collect(),
        },
        target_version: target_version(stem).map(str::to_string),
        reference: ReferenceDataset::new(),
        supplemental,
        options: MergeOptions { selection, modify_driver: true },
    }
}

fn run_quiet(
    input: ReconInput,
    decider: &mut dyn gamelist_recon::DuplicateDecider,
) -> Result<MergeOutput, ReconError> {
    run(input, decider, &mut |_: String| {})
}

fn sourcefile_of(document: &str, name: &str) -> Option<String> {
    let open = format!("<machine name=\"{name}\" sourcefile=\"");
    let start = document.find(&open)? + open.len();
    let end = document[start..].find('"')?;
    Some(document[start..start + end].to_string())
}

// -------------------------------------------------------------------------
// Version filtering
// -------------------------------------------------------------------------

#[test]
fn pre_releases_order_before_final() {
    let sel = AttributeSelection::from_keys(["sourcefile"]).unwrap();
    let mut asked = Vec::new();
    let mut decider = |id: &str, candidates: &[FieldRecord]| {
        asked.push((id.to_string(), candidates.len()));
        Decision::Select(candidates.len() - 1)
    };
    let out = run_quiet(input("mame_039_0.33b3", sel), &mut decider).unwrap();

    // robby: 0.33rc1 sorts after 0.33b3, so only 0.30 survives.
    assert_eq!(sourcefile_of(&out.document, "robby").as_deref(), Some("robby.c"));
    // bzone: 0.33b3 equals the target, 0.33 final is newer.
    assert_eq!(sourcefile_of(&out.document, "bzone").as_deref(), Some("bzone.c"));
    // frogger: both lines are newer, so it has no data at all.
    assert_eq!(sourcefile_of(&out.document, "frogger"), None);
    assert!(asked.is_empty());

    assert_eq!(out.result.resolution.auto_selected, 2);
    assert_eq!(out.result.resolution.dropped, 1);
    assert_eq!(out.result.unmatched, vec!["frogger".to_string(), "tron".to_string()]);
}

#[test]
fn later_target_hands_ambiguity_to_decider() {
    let sel = AttributeSelection::from_keys(["sourcefile"]).unwrap();
    let mut asked = Vec::new();
    let mut decider = |id: &str, candidates: &[FieldRecord]| {
        asked.push((id.to_string(), candidates.len()));
        Decision::Select(candidates.len() - 1)
    };
    let out = run_quiet(input("mame_039_0.50", sel), &mut decider).unwrap();

    assert_eq!(
        asked,
        vec![
            ("robby".to_string(), 3),
            ("bzone".to_string(), 2),
            ("frogger".to_string(), 2),
        ]
    );
    assert_eq!(sourcefile_of(&out.document, "robby").as_deref(), Some("robby_c.c"));
    assert_eq!(sourcefile_of(&out.document, "frogger").as_deref(), Some("frogger2.c"));
    assert_eq!(out.result.resolution.operator_selected, 3);
}

#[test]
fn unversioned_catalog_drops_every_duplicate() {
    let out = run_quiet(input("catalog", AttributeSelection::all()), &mut FirstCandidate).unwrap();
    assert_eq!(out.result.modified, 1);
    assert_eq!(sourcefile_of(&out.document, "qix").as_deref(), Some("qix.c"));
    assert_eq!(out.result.resolution.dropped, 3);
    assert_eq!(out.result.resolution.target_version, None);
}

// -------------------------------------------------------------------------
// Output shape
// -------------------------------------------------------------------------

#[test]
fn machine_tags_and_root_are_kept() {
    let out = run_quiet(input("mame_039_0.50", AttributeSelection::all()), &mut FirstCandidate).unwrap();
    assert!(out.document.starts_with("<mame>\n\t<machine name=\"robby\""));
    assert!(out.document.ends_with("\t<machine name=\"tron\">\n\t\t<description>tron</description>\n\t\t<manufacturer>Someone</manufacturer>\n\t\t<rom name=\"a.bin\"/>\n\t</machine>\n</mame>\n"));
    assert!(out.document.contains("<driver status=\"preliminary\""));
}

#[test]
fn cancel_midway_returns_error_and_no_document() {
    let mut calls = 0;
    let mut decider = |_: &str, _: &[FieldRecord]| {
        calls += 1;
        if calls == 2 {
            Decision::Cancel
        } else {
            Decision::Select(0)
        }
    };
    let err = run_quiet(input("mame_039_0.50", AttributeSelection::all()), &mut decider).unwrap_err();
    assert!(matches!(err, ReconError::DuplicateUnresolved { ref identifier } if identifier == "bzone"));
}
