//! Output files of a merge run.
//!
//! Both files land next to the primary catalog and are named after its
//! stem: `<stem>_upd.xml` and `<stem>_not_modified.log`. Writes go to a
//! temporary sibling first and are renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use gamelist_recon::ReconError;

pub const UPDATED_SUFFIX: &str = "_upd.xml";
pub const UNMATCHED_SUFFIX: &str = "_not_modified.log";
pub const UNMATCHED_HEADER: &str = "Games not modified:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub catalog: PathBuf,
    pub unmatched_log: PathBuf,
}

impl OutputPaths {
    pub fn for_catalog(catalog: &Path) -> Self {
        let stem = catalog
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = catalog.parent().unwrap_or_else(|| Path::new(""));
        Self {
            catalog: dir.join(format!("{stem}{UPDATED_SUFFIX}")),
            unmatched_log: dir.join(format!("{stem}{UNMATCHED_SUFFIX}")),
        }
    }
}

/// Write `contents` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ReconError> {
    let fail = |e: std::io::Error| ReconError::OutputWrite(format!("{}: {e}", path.display()));

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let written = std::fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(fail(e));
    }
    Ok(())
}

/// Body of the unmatched log: header, rule, one identifier per line.
pub fn unmatched_report(unmatched: &[String]) -> String {
    let mut out = String::with_capacity(64 + unmatched.len() * 12);
    out.push_str(UNMATCHED_HEADER);
    out.push('\n');
    out.push_str(&"=".repeat(50));
    out.push('\n');
    for id in unmatched {
        out.push_str(id);
        out.push('\n');
    }
    out
}

pub fn write_unmatched_log(path: &Path, unmatched: &[String]) -> Result<(), ReconError> {
    write_atomic(path, &unmatched_report(unmatched))
}
