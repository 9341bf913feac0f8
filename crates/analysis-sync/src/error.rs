use shared_types::AnalysisDimension;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Analysis dimension is disabled: {0}")]
    DimensionDisabled(AnalysisDimension),

    #[error("Required page element is missing: {0}")]
    MissingTarget(String),

    #[error("Editor is not available: {0}")]
    EditorUnavailable(String),

    #[error("Decorator failed: {0}")]
    Decorator(String),

    #[error("Scoring engine error: {0}")]
    Engine(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
