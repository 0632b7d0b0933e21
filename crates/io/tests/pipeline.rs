//! File-level merge runs against temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use gamelist_io::{run_merge, spawn_merge, EventSink, MergeRequest, PipelineEvent};
use gamelist_recon::resolve::{CancelOnAmbiguity, FirstCandidate};
use gamelist_recon::{AttributeSelection, Decision, FieldKey, ReconError};

const CATALOG: &str = "<?xml version=\"1.0\"?>\n\
<datafile>\n\
\t<game name=\"pacman\">\n\
\t\t<description>Pac-Man</description>\n\
\t\t<year>1980</year>\n\
\t\t<manufacturer>Namco</manufacturer>\n\
\t\t<rom name=\"pacman.6e\" size=\"4096\"/>\n\
\t\t<driver status=\"preliminary\"/>\n\
\t</game>\n\
\t<game name=\"galaga\">\n\
\t\t<description>Galaga</description>\n\
\t\t<manufacturer>Namco</manufacturer>\n\
\t\t<rom name=\"gg1.bin\" size=\"4096\"/>\n\
\t</game>\n\
\t<game name=\"zaxxon\">\n\
\t\t<description>Zaxxon</description>\n\
\t</game>\n\
</datafile>\n";

const REFERENCE: &str = "<datafile>\n\
\t<game name=\"pacman\" sourcefile=\"pacman.c\">\n\
\t\t<driver status=\"good\"/>\n\
\t</game>\n\
</datafile>\n";

fn data_line(name: &str, sourcefile: &str, add_in: &str) -> String {
    format!("{name};{sourcefile};7;arcade;tester;{add_in};1;raster;vertical;2;imperfect;good;good;good;good;supported")
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        Self { _dir: dir, root }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn request(&self, data: &str, reference: bool) -> MergeRequest {
        MergeRequest {
            catalog: self.write("mame_039_0.50.xml", CATALOG),
            reference: reference.then(|| self.write("reference.xml", REFERENCE)),
            data: self.write("data.txt", data),
            selection: AttributeSelection::all(),
            modify_driver: true,
        }
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root.join(name)).unwrap()
    }

    fn exists(&self, name: &str) -> bool {
        Path::new(&self.root.join(name)).exists()
    }
}

#[test]
fn writes_updated_catalog_and_unmatched_log() {
    let fx = Fixture::new();
    let data = [data_line("pacman", "other.c", "0.10"), data_line("galaga", "galaga.c", "0.20")].join("\n");
    let request = fx.request(&data, true);

    let result = run_merge(&request, &EventSink::detached(), &mut FirstCandidate).unwrap();
    assert_eq!(result.total, 3);
    assert_eq!(result.modified, 2);
    assert_eq!(result.unmatched, vec!["zaxxon".to_string()]);
    assert_eq!(result.reference_loaded, 1);

    let out = fx.read("mame_039_0.50_upd.xml");
    assert!(out.starts_with("<?xml version=\"1.0\"?>\n<datafile>\n\t<game name=\"pacman\" sourcefile=\"pacman.c\">\n"));
    assert!(out.contains("\t<game name=\"galaga\" sourcefile=\"galaga.c\">\n"));
    // Identifiers with reference data ignore their data-file lines.
    assert!(out.contains("\t\t<driver status=\"good\"/>\n\t</game>\n\t<game name=\"galaga\""));
    assert!(!out.contains("other.c"));
    assert_eq!(result.supplemental.skipped_reference, 1);
    assert!(out.contains("\t<game name=\"zaxxon\">\n\t\t<description>Zaxxon</description>\n\t</game>\n"));
    assert!(out.ends_with("</datafile>\n"));

    let log = fx.read("mame_039_0.50_not_modified.log");
    assert_eq!(log, format!("Games not modified:\n{}\nzaxxon\n", "=".repeat(50)));
    assert_eq!(
        result.unmatched_log.as_deref(),
        Some(fx.root.join("mame_039_0.50_not_modified.log").display().to_string().as_str())
    );
}

#[test]
fn escaped_names_match_reference_and_data_lines() {
    let fx = Fixture::new();
    let catalog = "<datafile>\n\
\t<game name=\"tom&amp;jerry\">\n\t\t<description>T</description>\n\t</game>\n\
\t<game name=\"a&amp;b\">\n\t\t<description>A</description>\n\t</game>\n\
\t<game name=\"x&lt;y\">\n\t\t<description>X</description>\n\t</game>\n\
\t<game>\n\t\t<description>Nameless</description>\n\t</game>\n\
</datafile>\n";
    let reference = "<datafile>\n\t<game name=\"tom&amp;jerry\" sourcefile=\"tj.c\"/>\n</datafile>\n";
    let data = [data_line("a&b", "ab.c", "0.10"), data_line("", "nameless.c", "0.10")].join("\n");
    let request = MergeRequest {
        catalog: fx.write("mame_039_0.50.xml", catalog),
        reference: Some(fx.write("reference.xml", reference)),
        data: fx.write("data.txt", &data),
        selection: AttributeSelection::from_keys(["sourcefile"]).unwrap(),
        modify_driver: true,
    };

    let result = run_merge(&request, &EventSink::detached(), &mut FirstCandidate).unwrap();
    assert_eq!(result.total, 4);
    assert_eq!(result.modified, 2);
    assert_eq!(result.reference_loaded, 1);
    assert_eq!(result.unmatched, vec!["x<y".to_string()]);

    let out = fx.read("mame_039_0.50_upd.xml");
    assert!(out.contains("\t<game name=\"tom&amp;jerry\" sourcefile=\"tj.c\">\n"));
    assert!(out.contains("\t<game name=\"a&amp;b\" sourcefile=\"ab.c\">\n"));
    assert!(out.contains("\t<game>\n\t\t<description>Nameless</description>\n\t</game>\n"));
    assert!(!out.contains("nameless.c"));
    assert!(fx.read("mame_039_0.50_not_modified.log").ends_with("\nx<y\n"));
}

#[test]
fn no_log_when_everything_matches() {
    let fx = Fixture::new();
    let data = ["pacman", "galaga", "zaxxon"]
        .iter()
        .map(|n| data_line(n, "x.c", "0.10"))
        .collect::<Vec<_>>()
        .join("\n");
    let result = run_merge(&fx.request(&data, false), &EventSink::detached(), &mut FirstCandidate).unwrap();
    assert!(result.unmatched.is_empty());
    assert!(result.unmatched_log.is_none());
    assert!(fx.exists("mame_039_0.50_upd.xml"));
    assert!(!fx.exists("mame_039_0.50_not_modified.log"));
}

#[test]
fn cancelled_run_writes_nothing() {
    let fx = Fixture::new();
    let data = [data_line("galaga", "a.c", "0.10"), data_line("galaga", "b.c", "0.20")].join("\n");
    let err = run_merge(&fx.request(&data, false), &EventSink::detached(), &mut CancelOnAmbiguity).unwrap_err();
    assert!(err.is_cancellation());
    assert!(!fx.exists("mame_039_0.50_upd.xml"));
    assert!(!fx.exists("mame_039_0.50_not_modified.log"));
}

#[test]
fn missing_data_file_is_io_error() {
    let fx = Fixture::new();
    let mut request = fx.request("", false);
    request.data = fx.root.join("absent.txt");
    let err = run_merge(&request, &EventSink::detached(), &mut FirstCandidate).unwrap_err();
    assert!(matches!(err, ReconError::Io(_)));
    assert!(!fx.exists("mame_039_0.50_upd.xml"));
}

#[test]
fn worker_asks_front_end_for_duplicates() {
    let fx = Fixture::new();
    let data = [data_line("galaga", "first.c", "0.10"), data_line("galaga", "second.c", "0.20")].join("\n");
    let handle = spawn_merge(fx.request(&data, false)).unwrap();

    let mut asked = Vec::new();
    let mut logs = Vec::new();
    let mut finished = None;
    for event in handle.events.iter() {
        match event {
            PipelineEvent::Log(line) => logs.push(line),
            PipelineEvent::Duplicate(req) => {
                let sources: Vec<_> = req
                    .candidates
                    .iter()
                    .map(|c| c.get(FieldKey::Sourcefile).unwrap_or("").to_string())
                    .collect();
                asked.push((req.identifier.clone(), sources));
                req.respond(Decision::Select(1));
            }
            PipelineEvent::Finished(result) => {
                finished = Some(result);
                break;
            }
        }
    }
    handle.join();

    assert_eq!(asked, vec![("galaga".to_string(), vec!["first.c".to_string(), "second.c".to_string()])]);
    let result = finished.unwrap().unwrap();
    assert_eq!(result.resolution.operator_selected, 1);
    assert!(fx.read("mame_039_0.50_upd.xml").contains("sourcefile=\"second.c\""));
    assert!(logs.iter().any(|l| l.starts_with("Entities modified:")));
}

#[test]
fn unanswered_duplicate_cancels_worker() {
    let fx = Fixture::new();
    let data = [data_line("galaga", "first.c", "0.10"), data_line("galaga", "second.c", "0.20")].join("\n");
    let handle = spawn_merge(fx.request(&data, false)).unwrap();

    let mut finished = None;
    for event in handle.events.iter() {
        match event {
            PipelineEvent::Duplicate(req) => drop(req),
            PipelineEvent::Finished(result) => {
                finished = Some(result);
                break;
            }
            PipelineEvent::Log(_) => {}
        }
    }
    handle.join();

    let err = finished.unwrap().unwrap_err();
    assert!(matches!(err, ReconError::DuplicateUnresolved { ref identifier } if identifier == "galaga"));
    assert!(!fx.exists("mame_039_0.50_upd.xml"));
}
