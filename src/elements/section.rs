//! Cross-section properties for beam elements

use serde::{Deserialize, Serialize};

use crate::domain::Labeled;
use crate::error::{FEAError, FEAResult};

/// Cross-section properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Unique label within the domain
    pub label: String,
    /// Area in m²
    pub a: f64,
    /// Second moment of area about local y in m⁴
    pub iy: f64,
    /// Second moment of area about local z in m⁴
    pub iz: f64,
    /// Product moment of area in m⁴
    pub dyz: f64,
    /// Section height in m
    pub h: f64,
    /// Timoshenko shear coefficient
    pub k: f64,
    /// Torsional constant in m⁴
    pub j: f64,
}

/// Fields to change on a cross-section; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossSectionChange {
    pub label: Option<String>,
    pub a: Option<f64>,
    pub iy: Option<f64>,
    pub iz: Option<f64>,
    pub dyz: Option<f64>,
    pub h: Option<f64>,
    pub k: Option<f64>,
    pub j: Option<f64>,
}

impl CrossSection {
    /// Create a section; `dyz` defaults to zero
    pub fn new(label: &str, a: f64, iy: f64, iz: f64, h: f64, k: f64, j: f64) -> Self {
        Self {
            label: label.to_string(),
            a,
            iy,
            iz,
            dyz: 0.0,
            h,
            k,
            j,
        }
    }

    /// Solid rectangle `width` x `height`, shear coefficient 5/6
    pub fn rectangular(label: &str, width: f64, height: f64) -> Self {
        let a = width * height;
        let iy = width * height.powi(3) / 12.0;
        let iz = height * width.powi(3) / 12.0;

        let (long, short) = if width > height { (width, height) } else { (height, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self::new(label, a, iy, iz, height, 5.0 / 6.0, j)
    }

    /// Section registered in every new domain
    pub fn default_section() -> Self {
        Self::new("DefaultCS", 0.06, 4.5e-4, 2.0e-4, 0.3, 0.833333, 1.0)
    }

    /// Set the product moment
    pub fn with_dyz(mut self, dyz: f64) -> Self {
        self.dyz = dyz;
        self
    }

    /// Check that every property except `dyz` is positive
    pub fn validate(&self) -> FEAResult<()> {
        let props = [
            ("a", self.a),
            ("iy", self.iy),
            ("iz", self.iz),
            ("h", self.h),
            ("k", self.k),
            ("j", self.j),
        ];
        for (name, value) in props {
            if !(value > 0.0) {
                return Err(FEAError::InvalidInput(format!(
                    "cross-section '{}': {name} must be positive, got {value}",
                    self.label
                )));
            }
        }
        if !self.dyz.is_finite() {
            return Err(FEAError::InvalidInput(format!(
                "cross-section '{}': dyz must be finite",
                self.label
            )));
        }
        Ok(())
    }

    /// Copy of `self` with `change` applied, validated
    pub fn changed(&self, change: &CrossSectionChange) -> FEAResult<Self> {
        let mut next = self.clone();
        if let Some(label) = &change.label {
            next.label = label.clone();
        }
        next.a = change.a.unwrap_or(next.a);
        next.iy = change.iy.unwrap_or(next.iy);
        next.iz = change.iz.unwrap_or(next.iz);
        next.dyz = change.dyz.unwrap_or(next.dyz);
        next.h = change.h.unwrap_or(next.h);
        next.k = change.k.unwrap_or(next.k);
        next.j = change.j.unwrap_or(next.j);
        next.validate()?;
        Ok(next)
    }
}

impl Default for CrossSection {
    fn default() -> Self {
        Self::default_section()
    }
}

impl Labeled for CrossSection {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_section() {
        let cs = CrossSection::rectangular("R", 0.2, 0.4);
        assert_relative_eq!(cs.a, 0.08, epsilon = 1e-12);
        assert_relative_eq!(cs.iy, 0.2 * 0.4_f64.powi(3) / 12.0, epsilon = 1e-12);
        assert_eq!(cs.h, 0.4);
        assert!(cs.validate().is_ok());
    }

    #[test]
    fn test_negative_dyz_allowed() {
        let cs = CrossSection::default().with_dyz(-1e-5);
        assert!(cs.validate().is_ok());
        let bad = CrossSectionChange {
            j: Some(-1.0),
            ..Default::default()
        };
        assert!(cs.changed(&bad).is_err());
    }
}
