//! CLI Exit Code Registry
//!
//! Single source of truth for `gamelist` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad arguments, bad selection key/profile)   |
//! | 3    | Input error (unreadable or malformed catalog/input file) |
//! | 4    | Cancelled during duplicate resolution                    |
//! | 5    | Output file could not be written                         |

use gamelist_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or selection.
pub const EXIT_USAGE: u8 = 2;

/// An input file is missing, unreadable, or not a usable catalog.
pub const EXIT_INPUT: u8 = 3;

/// The operator cancelled (or mis-answered) a duplicate choice.
pub const EXIT_CANCELLED: u8 = 4;

/// Writing `<stem>_upd.xml` or the unmatched log failed.
pub const EXIT_OUTPUT: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::CatalogFormat(_)
        | ReconError::ReferenceFormat(_)
        | ReconError::DataFormat(_)
        | ReconError::Io(_) => EXIT_INPUT,
        ReconError::SelectionParse(_) => EXIT_USAGE,
        ReconError::DuplicateUnresolved { .. } | ReconError::InvalidDecision { .. } => EXIT_CANCELLED,
        ReconError::OutputWrite(_) => EXIT_OUTPUT,
    }
}
