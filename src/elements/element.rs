//! Two-node beam elements for plane frames and grids

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::{CrossSection, Material, Node};
use crate::domain::{CrossSectionId, Labeled, MaterialId, NodeId};
use crate::error::{FEAError, FEAResult};
use crate::loads::ElementLoadValue;
use crate::math::{beam2d, grid, Condensation, Mat6, Vec6};
use crate::results::EndValues;

/// Element formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Plane-frame Timoshenko beam in the x-z plane
    Beam2d,
    /// Grid beam in the x-y plane with bending and torsion
    BeamGrid2d,
}

impl ElementKind {
    /// Indices of the coordinate pair spanning the element plane
    pub fn plane_axes(&self) -> (usize, usize) {
        match self {
            Self::Beam2d => (0, 2),
            Self::BeamGrid2d => (0, 1),
        }
    }
}

/// Moment hinges at the element ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hinges {
    pub start: bool,
    pub end: bool,
}

impl Hinges {
    /// No hinges
    pub fn none() -> Self {
        Self::default()
    }

    /// Hinge at the start node
    pub fn at_start() -> Self {
        Self {
            start: true,
            end: false,
        }
    }

    /// Hinge at the end node
    pub fn at_end() -> Self {
        Self {
            start: false,
            end: true,
        }
    }

    /// Hinges at both ends
    pub fn both() -> Self {
        Self {
            start: true,
            end: true,
        }
    }

    pub fn any(&self) -> bool {
        self.start || self.end
    }
}

/// A beam element connecting two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique label within the domain
    pub label: String,
    pub kind: ElementKind,
    /// Start and end node
    pub nodes: [NodeId; 2],
    pub material: MaterialId,
    pub section: CrossSectionId,
    pub hinges: Hinges,
}

/// Fields to change on an element; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ElementChange {
    pub label: Option<String>,
    pub nodes: Option<[NodeId; 2]>,
    pub material: Option<MaterialId>,
    pub section: Option<CrossSectionId>,
    pub hinges: Option<Hinges>,
}

impl Element {
    /// Create an unhinged element; the domain sets `kind` from its formulation
    pub fn new(
        label: &str,
        start: NodeId,
        end: NodeId,
        material: MaterialId,
        section: CrossSectionId,
    ) -> Self {
        Self {
            label: label.to_string(),
            kind: ElementKind::Beam2d,
            nodes: [start, end],
            material,
            section,
            hinges: Hinges::none(),
        }
    }

    /// Set the end hinges
    pub fn with_hinges(mut self, hinges: Hinges) -> Self {
        self.hinges = hinges;
        self
    }

    pub fn has_hinges(&self) -> bool {
        self.hinges.any()
    }

    pub fn connects(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

impl Labeled for Element {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

/// An element with its material, section and geometry resolved, providing
/// the element matrices and load vectors
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    pub element: &'a Element,
    pub material: &'a Material,
    pub section: &'a CrossSection,
    /// Element length
    pub length: f64,
    /// Direction cosine along the first plane axis
    pub c: f64,
    /// Direction cosine along the second plane axis
    pub s: f64,
}

impl<'a> ElementView<'a> {
    pub fn new(
        element: &'a Element,
        material: &'a Material,
        section: &'a CrossSection,
        start: &Node,
        end: &Node,
    ) -> FEAResult<Self> {
        let (p, q) = element.kind.plane_axes();
        let dx = end.coords[p] - start.coords[p];
        let dz = end.coords[q] - start.coords[q];
        let length = (dx * dx + dz * dz).sqrt();
        if length < 1e-12 {
            return Err(FEAError::InvalidInput(format!(
                "element '{}' has zero length",
                element.label
            )));
        }

        Ok(Self {
            element,
            material,
            section,
            length,
            c: dx / length,
            s: dz / length,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind
    }

    fn uncondensed_stiffness(&self) -> Mat6 {
        let (mat, cs) = (self.material, self.section);
        match self.kind() {
            ElementKind::Beam2d => beam2d::local_stiffness(mat.e, mat.g, cs.a, cs.iy, cs.k, self.length),
            ElementKind::BeamGrid2d => grid::local_stiffness(mat.e, mat.g, cs.iy, cs.j, self.length),
        }
    }

    /// Partition used to condense the hinge rotations, `None` when unhinged
    pub fn condensation(&self) -> FEAResult<Option<Condensation>> {
        let hinges = self.element.hinges;
        let sets = match self.kind() {
            ElementKind::Beam2d => beam2d::hinge_sets(hinges.start, hinges.end),
            ElementKind::BeamGrid2d => grid::hinge_sets(hinges.start, hinges.end),
        };
        let Some((a, b)) = sets else {
            return Ok(None);
        };

        Condensation::new(&self.uncondensed_stiffness(), a, b)
            .map(Some)
            .ok_or_else(|| FEAError::SingularCondensation {
                element: self.element.label.clone(),
            })
    }

    /// Local stiffness, condensed when hinged
    pub fn local_stiffness(&self) -> FEAResult<Mat6> {
        Ok(match self.condensation()? {
            Some(cond) => cond.stiffness(),
            None => self.uncondensed_stiffness(),
        })
    }

    /// Global-to-local transformation
    pub fn transformation(&self) -> Mat6 {
        match self.kind() {
            ElementKind::Beam2d => beam2d::transformation(self.c, self.s),
            ElementKind::BeamGrid2d => grid::transformation(self.c, self.s),
        }
    }

    /// Global stiffness `T^T K T`
    pub fn global_stiffness(&self) -> FEAResult<Mat6> {
        let t = self.transformation();
        Ok(t.transpose() * self.local_stiffness()? * t)
    }

    /// Local initial-stress matrix for axial force `n` (compression positive)
    pub fn local_initial_stress(&self, n: f64) -> FEAResult<Mat6> {
        if self.kind() == ElementKind::BeamGrid2d {
            return Err(FEAError::NotSupported(
                "initial stress matrix of grid elements".to_string(),
            ));
        }

        let (mat, cs) = (self.material, self.section);
        let ks = beam2d::initial_stress(mat.e, mat.g, cs.a, cs.iy, cs.k, self.length, n);
        Ok(match self.condensation()? {
            Some(cond) => cond.project(&ks),
            None => ks,
        })
    }

    /// Global initial-stress matrix
    pub fn global_initial_stress(&self, n: f64) -> FEAResult<Mat6> {
        let t = self.transformation();
        Ok(t.transpose() * self.local_initial_stress(n)? * t)
    }

    /// Local fixed-end forces of `load` on the doubly clamped element
    pub fn fixed_end_forces(&self, load: &ElementLoadValue) -> Vec6 {
        let l = self.length;
        match self.kind() {
            ElementKind::Beam2d => {
                let rot = beam2d::rotation(self.c, self.s);
                match *load {
                    ElementLoadValue::Uniform { .. } => {
                        let (vx, vz) = load.uniform_components(self.c, self.s);
                        let local = rot * Vector2::new(vx, vz);
                        beam2d::fixed_end_uniform(l, local[0], local[1])
                    }
                    ElementLoadValue::Force { fx, fz, distance } => {
                        let local = rot * Vector2::new(fx, fz);
                        beam2d::fixed_end_point(l, distance, local[0], local[1])
                    }
                    ElementLoadValue::Temperature { dtc, dtg } => {
                        let (mat, cs) = (self.material, self.section);
                        beam2d::fixed_end_thermal(mat.e, cs.a, cs.iy, cs.h, mat.alpha, dtc, dtg)
                    }
                }
            }
            ElementKind::BeamGrid2d => match *load {
                ElementLoadValue::Uniform { .. } => {
                    grid::fixed_end_uniform(l, load.grid_intensity(self.c))
                }
                ElementLoadValue::Force { fz, distance, .. } => grid::fixed_end_point(l, distance, fz),
                ElementLoadValue::Temperature { .. } => {
                    log::debug!(
                        "temperature load on grid element '{}' has no effect",
                        self.element.label
                    );
                    Vec6::zeros()
                }
            },
        }
    }

    /// Equivalent global nodal load of `load`, condensed when hinged
    pub fn equivalent_nodal_load(&self, load: &ElementLoadValue) -> FEAResult<Vec6> {
        let f = self.fixed_end_forces(load);
        let f = match self.condensation()? {
            Some(cond) => cond.load(&f),
            None => f,
        };
        // fixed-end forces act on the element, the structure sees the opposite
        Ok(-(self.transformation().transpose() * f))
    }

    /// Local end forces and displacements from the element's global
    /// displacements `r` and the loads acting on it
    pub fn end_values<'l, I>(&self, r: &Vec6, loads: I) -> FEAResult<EndValues>
    where
        I: IntoIterator<Item = &'l ElementLoadValue>,
    {
        let mut re = self.transformation() * r;
        let mut bl = Vec6::zeros();
        for load in loads {
            bl += self.fixed_end_forces(load);
        }

        let mut fe;
        match self.condensation()? {
            Some(cond) => {
                fe = cond.stiffness() * re;
                cond.recover(&mut re, &mut fe, &bl);
            }
            None => {
                fe = self.uncondensed_stiffness() * re;
                fe += bl;
            }
        }

        Ok(EndValues {
            forces: fe,
            displacements: re,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Handle;
    use approx::assert_relative_eq;

    fn fixture(kind: ElementKind, hinges: Hinges) -> (Element, Material, CrossSection, Node, Node) {
        let mut element = Element::new(
            "e1",
            NodeId::from_index(0),
            NodeId::from_index(1),
            MaterialId::from_index(0),
            CrossSectionId::from_index(0),
        )
        .with_hinges(hinges);
        element.kind = kind;
        let start = Node::new("a", 0.0, 0.0, 0.0);
        let end = match kind {
            ElementKind::Beam2d => Node::new("b", 3.0, 0.0, 4.0),
            ElementKind::BeamGrid2d => Node::new("b", 3.0, 4.0, 0.0),
        };
        (element, Material::default(), CrossSection::default(), start, end)
    }

    #[test]
    fn test_geometry() {
        let (el, mat, cs, a, b) = fixture(ElementKind::Beam2d, Hinges::none());
        let view = ElementView::new(&el, &mat, &cs, &a, &b).unwrap();
        assert_relative_eq!(view.length, 5.0, epsilon = 1e-12);
        assert_relative_eq!(view.c, 0.6, epsilon = 1e-12);
        assert_relative_eq!(view.s, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_global_stiffness_symmetric() {
        for kind in [ElementKind::Beam2d, ElementKind::BeamGrid2d] {
            for hinges in [Hinges::none(), Hinges::at_start(), Hinges::both()] {
                let (el, mat, cs, a, b) = fixture(kind, hinges);
                let view = ElementView::new(&el, &mat, &cs, &a, &b).unwrap();
                let k = view.global_stiffness().unwrap();
                for i in 0..6 {
                    for j in 0..6 {
                        assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6, max_relative = 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_hinged_equivalent_load_has_no_moment() {
        let (el, mat, cs, a, b) = fixture(ElementKind::Beam2d, Hinges::both());
        let view = ElementView::new(&el, &mat, &cs, &a, &b).unwrap();
        let load = ElementLoadValue::uniform(crate::loads::LoadDirection::Z, 10.0);
        let f = view.equivalent_nodal_load(&load).unwrap();
        assert_relative_eq!(f[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(f[5], 0.0, epsilon = 1e-9);
        // total vertical load is preserved
        assert_relative_eq!(f[1] + f[4], 10.0 * 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grid_initial_stress_not_supported() {
        let (el, mat, cs, a, b) = fixture(ElementKind::BeamGrid2d, Hinges::none());
        let view = ElementView::new(&el, &mat, &cs, &a, &b).unwrap();
        assert!(matches!(
            view.global_initial_stress(1.0),
            Err(FEAError::NotSupported(_))
        ));
    }

    #[test]
    fn test_zero_length_rejected() {
        let (el, mat, cs, a, _) = fixture(ElementKind::Beam2d, Hinges::none());
        let b = Node::new("b", 0.0, 7.0, 0.0);
        assert!(ElementView::new(&el, &mat, &cs, &a, &b).is_err());
    }
}
