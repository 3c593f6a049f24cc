use thiserror::Error;

/// error types of the aqueous equilibrium engine
#[derive(Debug, Error)]
pub enum AqueousEquilibriumError {
    #[error("Failed to parse formula '{tag}': {reason}")]
    FormulaParse { tag: String, reason: String },
    #[error("Seed species '{0}' has no reaction path in the candidate database")]
    ClosureUnreachable(String),
    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Invalid reaction record: {0}")]
    InvalidRecord(String),
    #[error("Unknown phase: {0}")]
    UnknownPhase(String),
    #[error("Phase listed more than once at the interface: {0}")]
    DuplicatePhase(String),
    #[error("Least squares solve failed: {0}")]
    LeastSquares(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AqueousEquilibriumError {
    pub(crate) fn formula(tag: &str, reason: impl Into<String>) -> Self {
        AqueousEquilibriumError::FormulaParse {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}
