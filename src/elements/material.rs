//! Material properties

use serde::{Deserialize, Serialize};

use crate::domain::Labeled;
use crate::error::{FEAError, FEAResult};

/// Linear elastic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique label within the domain
    pub label: String,
    /// Young's modulus in Pa
    pub e: f64,
    /// Shear modulus in Pa
    pub g: f64,
    /// Thermal dilatation coefficient in 1/K
    pub alpha: f64,
    /// Density in kg/m³
    pub d: f64,
}

/// Fields to change on a material; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialChange {
    pub label: Option<String>,
    pub e: Option<f64>,
    pub g: Option<f64>,
    pub alpha: Option<f64>,
    pub d: Option<f64>,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(label: &str, e: f64, g: f64, alpha: f64, d: f64) -> Self {
        Self {
            label: label.to_string(),
            e,
            g,
            alpha,
            d,
        }
    }

    /// Material registered in every new domain
    pub fn default_material() -> Self {
        Self::new("DefaultMat", 30.0e6, 10.0e6, 12.0e-6, 1.0)
    }

    /// Check that all properties are positive
    pub fn validate(&self) -> FEAResult<()> {
        for (name, value) in [("e", self.e), ("g", self.g), ("alpha", self.alpha), ("d", self.d)] {
            if !(value > 0.0) {
                return Err(FEAError::InvalidInput(format!(
                    "material '{}': {name} must be positive, got {value}",
                    self.label
                )));
            }
        }
        Ok(())
    }

    /// Copy of `self` with `change` applied, validated
    pub fn changed(&self, change: &MaterialChange) -> FEAResult<Self> {
        let mut next = self.clone();
        if let Some(label) = &change.label {
            next.label = label.clone();
        }
        next.e = change.e.unwrap_or(next.e);
        next.g = change.g.unwrap_or(next.g);
        next.alpha = change.alpha.unwrap_or(next.alpha);
        next.d = change.d.unwrap_or(next.d);
        next.validate()?;
        Ok(next)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::default_material()
    }
}

impl Labeled for Material {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
