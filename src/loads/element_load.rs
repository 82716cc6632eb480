//! Loads acting along an element: uniform line loads, point forces and
//! temperature changes

use serde::{Deserialize, Serialize};

use crate::domain::{ElementId, Labeled};

/// Direction of a uniform element load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadDirection {
    /// Global X
    X,
    /// Global Z
    Z,
    /// Element axis
    LocalX,
    /// Element normal
    LocalZ,
}

/// Value of an element load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementLoadValue {
    /// Uniform load of `magnitude` per unit length. With `per_projection`
    /// the magnitude is given per unit of horizontal projection.
    Uniform {
        direction: LoadDirection,
        magnitude: f64,
        per_projection: bool,
    },
    /// Point force with global components at `distance` from the start node
    Force { fx: f64, fz: f64, distance: f64 },
    /// Temperature change: `dtc` at the centroid, `dtg` difference bottom minus top
    Temperature { dtc: f64, dtg: f64 },
}

impl ElementLoadValue {
    pub fn uniform(direction: LoadDirection, magnitude: f64) -> Self {
        Self::Uniform {
            direction,
            magnitude,
            per_projection: false,
        }
    }

    pub fn point(fx: f64, fz: f64, distance: f64) -> Self {
        Self::Force { fx, fz, distance }
    }

    pub fn temperature(dtc: f64, dtg: f64) -> Self {
        Self::Temperature { dtc, dtg }
    }

    /// Global `(vx, vz)` intensity of a uniform load on an element with
    /// direction cosines `(c, s)`; zero for other load types
    pub fn uniform_components(&self, c: f64, s: f64) -> (f64, f64) {
        let Self::Uniform {
            direction,
            magnitude,
            per_projection,
        } = *self
        else {
            return (0.0, 0.0);
        };

        let (vx, vz) = match direction {
            LoadDirection::X => (magnitude, 0.0),
            LoadDirection::Z => (0.0, magnitude),
            LoadDirection::LocalX => (magnitude * c, magnitude * s),
            LoadDirection::LocalZ => (-magnitude * s, magnitude * c),
        };

        if per_projection {
            (vx * c.abs(), vz * c.abs())
        } else {
            (vx, vz)
        }
    }

    /// Out-of-plane intensity of a uniform load on a grid element whose
    /// in-plane direction cosine is `c`; in-plane directions carry nothing.
    ///
    /// The local and global out-of-plane axes of a grid element coincide,
    /// so `LocalZ` is not scaled by the direction cosine and `LocalX` gets
    /// no out-of-plane part of `magnitude * s`. This departs from the
    /// classic grid load convention; only `per_projection` scales the
    /// intensity.
    pub fn grid_intensity(&self, c: f64) -> f64 {
        match *self {
            Self::Uniform {
                direction: LoadDirection::Z | LoadDirection::LocalZ,
                magnitude,
                per_projection,
            } => {
                if per_projection {
                    magnitude * c.abs()
                } else {
                    magnitude
                }
            }
            _ => 0.0,
        }
    }

    /// `(distance, fx, fz)` of a point force
    pub fn point_force(&self) -> Option<(f64, f64, f64)> {
        match *self {
            Self::Force { fx, fz, distance } => Some((distance, fx, fz)),
            _ => None,
        }
    }
}

/// A load attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementLoad {
    /// Label, unique within the owning load case
    pub label: String,
    pub element: ElementId,
    pub value: ElementLoadValue,
}

impl ElementLoad {
    pub fn new(label: &str, element: ElementId, value: ElementLoadValue) -> Self {
        Self {
            label: label.to_string(),
            element,
            value,
        }
    }
}

impl Labeled for ElementLoad {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
