//! Prescribed (enforced) displacements of supported DOFs

use serde::{Deserialize, Serialize};

use crate::domain::{Labeled, NodeId};

/// Target displacements of a node in formulation DOF order
/// (`x, z, Y` for plane frames, `z, X, Y` for grids). Components on DOFs
/// that are not supported have no effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedDisplacement {
    /// Label, unique within the owning load case
    pub label: String,
    pub node: NodeId,
    pub value: [f64; 3],
}

impl PrescribedDisplacement {
    pub fn new(label: &str, node: NodeId, value: [f64; 3]) -> Self {
        Self {
            label: label.to_string(),
            node,
            value,
        }
    }
}

impl Labeled for PrescribedDisplacement {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
