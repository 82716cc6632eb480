//! Nodal loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

use crate::analysis::Formulation;
use crate::domain::{Labeled, NodeId};

/// Force and moment components of a nodal load
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodalLoadValue {
    /// Force in X direction (N)
    pub fx: f64,
    /// Force in Y direction (N)
    pub fy: f64,
    /// Force in Z direction (N)
    pub fz: f64,
    /// Moment about X axis (N·m)
    pub mx: f64,
    /// Moment about Y axis (N·m)
    pub my: f64,
    /// Moment about Z axis (N·m)
    pub mz: f64,
}

impl NodalLoadValue {
    /// Plane frame load (fx, fz, my)
    pub fn frame(fx: f64, fz: f64, my: f64) -> Self {
        Self {
            fx,
            fz,
            my,
            ..Default::default()
        }
    }

    /// Grid load (fz, mx, my)
    pub fn grid(fz: f64, mx: f64, my: f64) -> Self {
        Self {
            fz,
            mx,
            my,
            ..Default::default()
        }
    }

    /// Components acting on the three DOFs of `formulation`
    pub fn components(&self, formulation: Formulation) -> [f64; 3] {
        match formulation {
            Formulation::Beam2d => [self.fx, self.fz, self.my],
            Formulation::Grid2d => [self.fz, self.mx, self.my],
        }
    }
}

/// A load applied directly to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodalLoad {
    /// Label, unique within the owning load case
    pub label: String,
    /// Loaded node
    pub node: NodeId,
    pub value: NodalLoadValue,
}

impl NodalLoad {
    pub fn new(label: &str, node: NodeId, value: NodalLoadValue) -> Self {
        Self {
            label: label.to_string(),
            node,
            value,
        }
    }
}

impl Labeled for NodalLoad {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
