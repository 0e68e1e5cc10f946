use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeredityError {
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Invalid pedigree: {0}")]
    InvalidPedigree(String),

    #[error("Invalid probability model: {0}")]
    InvalidModel(String),

    #[error("Contradictory evidence: no assignment consistent with the observed traits has nonzero probability (first affected person: '{person}')")]
    ContradictoryEvidence { person: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = HeredityError> = std::result::Result<T, E>;
