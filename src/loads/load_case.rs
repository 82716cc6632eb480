//! Load cases

use serde::{Deserialize, Serialize};

use super::{ElementLoad, NodalLoad, PrescribedDisplacement};
use crate::domain::{
    ElementLoadId, Handle, Labeled, LoadCaseId, NodalLoadId, PrescribedId, Registry,
};

/// Address of a load: its owning load case and its handle within that case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadKey<H> {
    pub case: LoadCaseId,
    pub id: H,
}

impl<H: Handle> LoadKey<H> {
    pub fn new(case: LoadCaseId, id: H) -> Self {
        Self { case, id }
    }
}

/// A load case groups nodal loads, element loads and prescribed
/// displacements solved together as one right-hand side
#[derive(Debug, Clone)]
pub struct LoadCase {
    /// Unique label within the domain
    pub label: String,
    /// Whether the case is shown by rendering layers
    pub display: bool,
    pub(crate) nodal_loads: Registry<NodalLoadId, NodalLoad>,
    pub(crate) element_loads: Registry<ElementLoadId, ElementLoad>,
    pub(crate) prescribed: Registry<PrescribedId, PrescribedDisplacement>,
}

impl LoadCase {
    /// Create an empty, displayed load case
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            display: true,
            nodal_loads: Registry::new(),
            element_loads: Registry::new(),
            prescribed: Registry::new(),
        }
    }

    /// Load case registered in every new domain
    pub fn default_case() -> Self {
        Self::new("Default_loadcase")
    }

    pub fn nodal_loads(&self) -> impl Iterator<Item = (NodalLoadId, &NodalLoad)> {
        self.nodal_loads.iter()
    }

    pub fn element_loads(&self) -> impl Iterator<Item = (ElementLoadId, &ElementLoad)> {
        self.element_loads.iter()
    }

    pub fn prescribed_displacements(
        &self,
    ) -> impl Iterator<Item = (PrescribedId, &PrescribedDisplacement)> {
        self.prescribed.iter()
    }

    /// Total number of loads of all kinds
    pub fn load_count(&self) -> usize {
        self.nodal_loads.len() + self.element_loads.len() + self.prescribed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_count() == 0
    }
}

impl Default for LoadCase {
    fn default() -> Self {
        Self::default_case()
    }
}

impl Labeled for LoadCase {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
