use crate::catalog::{Catalog, Entity};
use crate::config::MergeOptions;
use crate::error::ReconError;
use crate::merge::effective_record;
use crate::model::{ProcessingResult, ReferenceDataset, SupplementalDataset};
use crate::mutate::apply_selection;
use crate::render::render_catalog;
use crate::resolve::{resolve_duplicates, DuplicateDecider, Resolution};
use crate::supplemental::{load_supplemental, SupplementalLoad};

// ---------------------------------------------------------------------------
// Input / context / output
// ---------------------------------------------------------------------------

/// Everything a run needs, already read from disk.
pub struct ReconInput {
    pub catalog: Catalog,
    /// Catalog version token (see [`crate::resolve::target_version`]).
    pub target_version: Option<String>,
    pub reference: ReferenceDataset,
    /// Raw text of the supplemental data file.
    pub supplemental: String,
    pub options: MergeOptions,
}

/// Datasets and options of one run, frozen before any entity is touched.
#[derive(Debug)]
pub struct RunContext {
    pub reference: ReferenceDataset,
    /// Unique supplemental records plus the winners of duplicate resolution.
    pub supplemental: SupplementalDataset,
    pub options: MergeOptions,
}

impl RunContext {
    pub fn new(
        reference: ReferenceDataset,
        load_records: SupplementalDataset,
        resolution: &Resolution,
        options: MergeOptions,
    ) -> Self {
        let mut supplemental = load_records;
        for (identifier, record) in &resolution.selected {
            supplemental.insert(identifier.clone(), record.clone());
        }
        Self { reference, supplemental, options }
    }
}

#[derive(Debug)]
pub struct MergeOutput {
    /// Complete regenerated catalog text.
    pub document: String,
    pub result: ProcessingResult,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Apply the context to every entity and render the catalog.
pub fn process_catalog(catalog: &Catalog, ctx: &RunContext) -> MergeOutput {
    let mut result = ProcessingResult {
        total: catalog.entities.len(),
        reference_loaded: ctx.reference.len(),
        ..ProcessingResult::default()
    };

    let entities: Vec<Entity> = catalog
        .entities
        .iter()
        .map(|entity| {
            // Nameless entities are carried through untouched.
            let Some(name) = entity.name() else {
                return entity.clone();
            };
            let record = effective_record(&name, &ctx.reference, &ctx.supplemental);
            if record.is_empty() {
                result.unmatched.push(name.into_owned());
                entity.clone()
            } else {
                result.modified += 1;
                apply_selection(entity, &record, &ctx.options)
            }
        })
        .collect();

    MergeOutput {
        document: render_catalog(&catalog.header, &catalog.root, &entities),
        result,
    }
}

/// Run the supplemental, duplicate and processing stages over `input`.
///
/// Progress lines go to `log` as they happen. `decider` is consulted for
/// every duplicate group that stays ambiguous after version filtering.
pub fn run(
    input: ReconInput,
    decider: &mut dyn DuplicateDecider,
    log: &mut dyn FnMut(String),
) -> Result<MergeOutput, ReconError> {
    let ReconInput { catalog, target_version, reference, supplemental, options } = input;

    log("=== Loading supplemental data ===".into());
    let universe = catalog.universe();
    let SupplementalLoad { records, duplicates, rejected, stats } =
        load_supplemental(&supplemental, &universe, &reference)?;
    for err in &rejected {
        log(format!("Error at {err}"));
    }
    log(format!("Lines processed: {}", stats.lines));
    log(format!("Skipped (not in catalog): {}", stats.skipped_unknown));
    log(format!("Skipped (covered by reference): {}", stats.skipped_reference));
    log(format!("Loaded from data file: {}", stats.loaded));
    if !duplicates.is_empty() {
        log(format!("Found {} identifier(s) with duplicate records", duplicates.len()));
        log("=== Resolving duplicates ===".into());
    }

    let resolution = resolve_duplicates(duplicates, target_version.as_deref(), decider)?;
    for note in &resolution.notes {
        if note.is_warning() {
            log(format!("Warning: {note}"));
        } else {
            log(note.to_string());
        }
    }

    log("=== Processing catalog ===".into());
    let selected: Vec<&str> = options.selection.iter().map(|k| k.as_str()).collect();
    log(format!("Found {} entities in catalog", catalog.entities.len()));
    log(format!("Attributes selected for update: [{}]", selected.join(", ")));

    let resolution_stats = resolution.stats.clone();
    let ctx = RunContext::new(reference, records, &resolution, options);
    let mut output = process_catalog(&catalog, &ctx);
    output.result.supplemental = stats;
    output.result.resolution = resolution_stats;

    log(format!(
        "Entities modified: {}/{}",
        output.result.modified, output.result.total
    ));
    Ok(output)
}
