//! File-side of the game list merge: reading catalogs and data files,
//! writing results, and running a merge on a worker thread.

pub mod catalog;
pub mod output;
pub mod pipeline;
pub mod reference;
pub mod text;
mod xml;

pub use catalog::{parse_catalog, read_catalog, CatalogFile};
pub use output::OutputPaths;
pub use pipeline::{
    run_merge, spawn_merge, ChannelDecider, DuplicateRequest, EventSink, MergeHandle,
    MergeRequest, PipelineEvent,
};
pub use reference::{load_reference, read_reference};
