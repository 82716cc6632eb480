//! Node element - a point carrying three DOFs

use serde::{Deserialize, Serialize};

use super::Supports;
use crate::analysis::Formulation;
use crate::domain::Labeled;

/// A node of a plane frame or grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique label within the domain
    pub label: String,
    /// Coordinates [x, y, z]; the formulation decides which pair is used
    pub coords: [f64; 3],
    /// Support flags in formulation DOF order
    pub supports: Supports,
}

/// Fields to change on a node; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeChange {
    pub label: Option<String>,
    pub coords: Option<[f64; 3]>,
    pub supports: Option<Supports>,
}

impl Node {
    /// Create a free node at the given coordinates
    pub fn new(label: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            label: label.to_string(),
            coords: [x, y, z],
            supports: Supports::free(),
        }
    }

    /// Set the support flags
    pub fn with_supports(mut self, supports: Supports) -> Self {
        self.supports = supports;
        self
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    pub fn y(&self) -> f64 {
        self.coords[1]
    }

    pub fn z(&self) -> f64 {
        self.coords[2]
    }

    /// Whether DOF `dof` (0..3) is supported
    pub fn has_prescribed_bc(&self, dof: usize) -> bool {
        self.supports.is_restrained(dof)
    }

    /// Whether the DOF named `name` is supported, `None` for a name the
    /// formulation does not know
    pub fn has_prescribed_bc_named(&self, formulation: Formulation, name: &str) -> Option<bool> {
        formulation
            .dof_index(name)
            .map(|dof| self.has_prescribed_bc(dof))
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        distance(&self.coords, &other.coords)
    }
}

pub(crate) fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(p, q)| (q - p).powi(2))
        .sum::<f64>()
        .sqrt()
}

impl Labeled for Node {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
