//! Result types for static and stability analysis

use serde::{Deserialize, Serialize};

use crate::math::Vec6;

/// Local end values of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndValues {
    /// Local end forces, including fixed-end forces of element loads
    pub forces: Vec6,
    /// Local end displacements, with hinge rotations recovered
    pub displacements: Vec6,
}

impl EndValues {
    /// Average axial force `0.5 (N_start - N_end)`, compression positive
    pub fn average_axial_force(&self) -> f64 {
        0.5 * (self.forces[0] - self.forces[3])
    }
}

/// Sampled internal-force diagram along an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Distances from the start node
    pub x: Vec<f64>,
    /// Diagram values at `x`
    pub values: Vec<f64>,
    /// Where a numeric label should be drawn
    pub labels: Vec<bool>,
}

impl Diagram {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Value with the largest magnitude
    pub fn extreme(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
    }

    /// Samples flagged for labelling
    pub fn labelled(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.values)
            .zip(&self.labels)
            .filter(|(_, flag)| **flag)
            .map(|((&x, &v), _)| (x, v))
    }
}

/// Sampled local deflection of an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deflection {
    /// Distances from the start node
    pub x: Vec<f64>,
    /// Axial displacement
    pub u: Vec<f64>,
    /// Transverse displacement
    pub w: Vec<f64>,
}

impl Deflection {
    /// Largest transverse displacement magnitude
    pub fn max_w(&self) -> f64 {
        self.w.iter().fold(0.0_f64, |acc, w| acc.max(w.abs()))
    }
}
