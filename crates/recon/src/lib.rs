//! `gamelist-recon`: game list reconciliation engine.
//!
//! Pure engine crate: takes a parsed catalog, supplemental text and
//! pre-loaded reference records, returns the regenerated catalog and a
//! processing summary. No filesystem access.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod mutate;
pub mod render;
pub mod resolve;
pub mod supplemental;
pub mod version;

pub use catalog::{Catalog, Entity};
pub use config::{AttributeSelection, MergeOptions, SelectionKey};
pub use engine::{run, MergeOutput, ReconInput, RunContext};
pub use error::ReconError;
pub use model::{FieldKey, FieldRecord, ProcessingResult, ReferenceDataset};
pub use resolve::{Decision, DuplicateDecider};
pub use version::Version;
