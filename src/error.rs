//! Error types for the frame solver

use thiserror::Error;

/// Main error type for model editing and analysis
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("{kind} '{label}' not found in domain")]
    NotFound { kind: &'static str, label: String },

    #[error("Stale or foreign {0} handle")]
    InvalidHandle(&'static str),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Element '{0}' must connect two distinct nodes")]
    CoincidentNodes(String),

    #[error("{kind} '{label}' is used by {used_by}")]
    InUse {
        kind: &'static str,
        label: String,
        used_by: String,
    },

    #[error("Load case '{0}' is active and cannot be deleted")]
    ActiveLoadCase(String),

    #[error("Load case '{0}' still contains loads")]
    LoadCaseNotEmpty(String),

    #[error("Zero stiffness in DOF {dof} of node '{node}', check supports")]
    ZeroStiffnessDiagonal { node: String, dof: String },

    #[error("Singular stiffness matrix, check boundary conditions")]
    SingularMatrix,

    #[error("Hinged element '{element}' has a singular condensed block")]
    SingularCondensation { element: String },

    #[error("Ill-posed problem: {0}")]
    IllPosed(String),

    #[error("Eigenvalue solution failed: {0}")]
    EigenFailed(String),

    #[error("Problem not solved, run solve() first")]
    NotSolved,

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FEAError {
    pub(crate) fn not_found(kind: &'static str, label: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            label: label.into(),
        }
    }
}

/// Result type for frame solver operations
pub type FEAResult<T> = Result<T, FEAError>;
