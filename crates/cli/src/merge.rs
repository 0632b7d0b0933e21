//! `gamelist merge`: run the merge pipeline and talk to the operator.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use gamelist_config::{InputKind, Settings};
use gamelist_io::{spawn_merge, DuplicateRequest, MergeRequest, PipelineEvent};
use gamelist_recon::{AttributeSelection, Decision, FieldKey, ProcessingResult};

use crate::CliError;

#[derive(Args)]
pub struct MergeArgs {
    /// Primary catalog; its version is the third `_` token of the file
    /// name (mame_039_0.33b3.xml -> 0.33b3)
    pub catalog: PathBuf,

    /// Supplemental data file, 16 `;`-separated fields per line
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// Reference catalog; its values win over the data file
    #[arg(long, short = 'r')]
    pub reference: Option<PathBuf>,

    /// Attribute keys to update (comma-separated, repeatable)
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["all", "selection"])]
    pub select: Vec<String>,

    /// Update every attribute
    #[arg(long, conflicts_with = "selection")]
    pub all: bool,

    /// TOML selection profile (`key = true` per attribute)
    #[arg(long)]
    pub selection: Option<PathBuf>,

    /// Never rewrite the <driver> element
    #[arg(long)]
    pub no_driver: bool,

    /// How to settle identifiers with several eligible data lines
    #[arg(long, value_enum, default_value_t = OnDuplicate::Prompt)]
    pub on_duplicate: OnDuplicate,

    /// Print the processing result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnDuplicate {
    /// Ask on the terminal
    Prompt,
    /// Take the first eligible line
    First,
    /// Stop the run
    Abort,
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let selection = build_selection(&args, &settings)?;
    if selection.is_empty() {
        log::warn!("no attributes selected; matched entities are re-emitted unchanged");
    }

    let request = MergeRequest {
        catalog: settings.resolve_input(InputKind::Catalog, &args.catalog),
        reference: args
            .reference
            .as_deref()
            .map(|p| settings.resolve_input(InputKind::Reference, p)),
        data: settings.resolve_input(InputKind::Data, &args.data),
        selection,
        modify_driver: settings.modify_driver && !args.no_driver,
    };
    log::debug!("merge request: {request:?}");

    let handle = spawn_merge(request).map_err(CliError::recon)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut outcome = None;

    for event in handle.events.iter() {
        match event {
            PipelineEvent::Log(line) => eprintln!("{line}"),
            PipelineEvent::Duplicate(req) => {
                let decision = match args.on_duplicate {
                    OnDuplicate::First => Decision::Select(0),
                    OnDuplicate::Abort => Decision::Cancel,
                    OnDuplicate::Prompt => prompt_choice(&req, &mut input, &mut io::stderr()),
                };
                req.respond(decision);
            }
            PipelineEvent::Finished(result) => {
                outcome = Some(result);
                break;
            }
        }
    }
    handle.join();

    let result = outcome
        .ok_or_else(|| CliError::general("merge worker stopped without a result"))?
        .map_err(CliError::recon)?;

    eprintln!("{}", summary_line(&result));
    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }
    Ok(())
}

/// `--all`, then `--selection`, then `--select`, then the settings default.
fn build_selection(args: &MergeArgs, settings: &Settings) -> Result<AttributeSelection, CliError> {
    if args.all {
        return Ok(AttributeSelection::all());
    }
    if let Some(path) = &args.selection {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::usage(format!("cannot read selection profile {}: {e}", path.display()))
        })?;
        return AttributeSelection::from_toml(&text).map_err(CliError::recon);
    }
    let keys = if args.select.is_empty() { &settings.selection } else { &args.select };
    AttributeSelection::from_keys(keys.iter().map(|k| k.trim()))
        .map_err(CliError::recon)
}

const PROMPT_FIELDS: [FieldKey; 5] = [
    FieldKey::Sourcefile,
    FieldKey::MameId,
    FieldKey::MachineType,
    FieldKey::AddBy,
    FieldKey::AddIn,
];

/// Ask which candidate to keep. Empty input, `q` or end of input cancel.
pub fn prompt_choice(req: &DuplicateRequest, input: &mut impl BufRead, out: &mut impl Write) -> Decision {
    let n = req.candidates.len();
    let _ = writeln!(out, "\n'{}' has {} eligible records:", req.identifier, n);
    for (i, record) in req.candidates.iter().enumerate() {
        let fields: Vec<String> = PROMPT_FIELDS
            .iter()
            .map(|key| format!("{}={}", key, record.get(*key).unwrap_or("-")))
            .collect();
        let _ = writeln!(out, "  [{}] {}", i + 1, fields.join(" "));
    }

    loop {
        let _ = write!(out, "choose 1-{n} (q to cancel): ");
        let _ = out.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return Decision::Cancel,
            Ok(_) => {}
        }
        let answer = line.trim();
        if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
            return Decision::Cancel;
        }
        match answer.parse::<usize>() {
            Ok(choice) if (1..=n).contains(&choice) => return Decision::Select(choice - 1),
            _ => {
                let _ = writeln!(out, "'{answer}' is not a number between 1 and {n}");
            }
        }
    }
}

fn summary_line(result: &ProcessingResult) -> String {
    let mut line = format!(
        "{}/{} entities updated, {} unmatched",
        result.modified,
        result.total,
        result.unmatched.len()
    );
    if let Some(path) = &result.output_file {
        line.push_str(&format!(" -> {path}"));
    }
    line
}
