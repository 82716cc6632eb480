//! Analysis types and options

mod postprocess;
mod stability;
mod static_solver;

pub use stability::LinearStabilitySolver;
pub use static_solver::{AssembledSystem, LinearStaticSolver, SolveReport, SolverWarning};

use serde::{Deserialize, Serialize};

use crate::elements::ElementKind;

/// Structural formulation of a domain, fixing the meaning and order of the
/// three nodal DOFs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formulation {
    /// Plane frame in the x-z plane: translation x, translation z, rotation about Y
    Beam2d,
    /// Grid in the x-y plane loaded out of plane: translation z, rotation about X, rotation about Y
    Grid2d,
}

impl Default for Formulation {
    fn default() -> Self {
        Self::Beam2d
    }
}

impl Formulation {
    /// DOF names in location-array order
    pub fn dof_names(&self) -> [&'static str; 3] {
        match self {
            Self::Beam2d => ["x", "z", "Y"],
            Self::Grid2d => ["z", "X", "Y"],
        }
    }

    /// Index of a DOF given its name
    pub fn dof_index(&self, name: &str) -> Option<usize> {
        self.dof_names().iter().position(|&n| n == name)
    }

    /// Element kind created by this formulation
    pub fn element_kind(&self) -> ElementKind {
        match self {
            Self::Beam2d => ElementKind::Beam2d,
            Self::Grid2d => ElementKind::BeamGrid2d,
        }
    }
}

/// Lifecycle of a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverState {
    Unsolved,
    Numbered,
    Assembled,
    Solved,
    Failed,
}

impl Default for SolverState {
    fn default() -> Self {
        Self::Unsolved
    }
}

/// Numeric thresholds used by the solvers and the post-processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Free-DOF stiffness diagonal below this value aborts the solve
    pub zero_diagonal_tolerance: f64,
    /// Any displacement above this magnitude raises a warning
    pub huge_displacement: f64,
    /// Axial forces below this magnitude count as zero in buckling analysis
    pub zero_axial_force: f64,
    /// Eigenvalues of the reduced problem below this magnitude map to an infinite load factor
    pub eigen_zero_tolerance: f64,
    /// Number of segments used to sample element diagrams
    pub diagram_segments: usize,
    /// Distance under which two nodes are reported as coincident
    pub coincident_node_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            zero_diagonal_tolerance: 1e-8,
            huge_displacement: 1e6,
            zero_axial_force: 1e-8,
            eigen_zero_tolerance: 1e-12,
            diagram_segments: 20,
            coincident_node_tolerance: 1e-3,
        }
    }
}

impl SolverOptions {
    /// Set the number of diagram segments
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.diagram_segments = segments.max(1);
        self
    }

    /// Set the huge-displacement warning threshold
    pub fn with_huge_displacement(mut self, limit: f64) -> Self {
        self.huge_displacement = limit;
        self
    }

    /// Set the zero-diagonal tolerance
    pub fn with_diagonal_tolerance(mut self, tol: f64) -> Self {
        self.zero_diagonal_tolerance = tol;
        self
    }
}
