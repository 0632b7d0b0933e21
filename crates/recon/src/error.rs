use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Primary catalog is not well-formed or holds no entity element.
    CatalogFormat(String),
    /// Reference catalog could not be parsed.
    ReferenceFormat(String),
    /// Supplemental file could not be tokenized at all.
    DataFormat(String),
    /// Selection profile parse / validation error.
    SelectionParse(String),
    /// Operator declined to pick a record for a duplicate group.
    DuplicateUnresolved { identifier: String },
    /// Decision function answered with an index outside the candidate list.
    InvalidDecision { identifier: String, index: usize, candidates: usize },
    /// Input file could not be read.
    Io(String),
    /// Output file could not be written.
    OutputWrite(String),
}

impl ReconError {
    /// True for errors raised because the operator stopped the run.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::DuplicateUnresolved { .. } | Self::InvalidDecision { .. })
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CatalogFormat(msg) => write!(f, "catalog format error: {msg}"),
            Self::ReferenceFormat(msg) => write!(f, "reference catalog error: {msg}"),
            Self::DataFormat(msg) => write!(f, "data file error: {msg}"),
            Self::SelectionParse(msg) => write!(f, "selection error: {msg}"),
            Self::DuplicateUnresolved { identifier } => {
                write!(f, "duplicate resolution cancelled at '{identifier}'")
            }
            Self::InvalidDecision { identifier, index, candidates } => {
                write!(
                    f,
                    "'{identifier}': choice {index} is out of range ({candidates} candidate(s))"
                )
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::OutputWrite(msg) => write!(f, "cannot write output: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
