//! Domain - the structural model container
//!
//! The domain owns materials, cross-sections, nodes, elements and load
//! cases in label-keyed registries and keeps every cross-reference valid:
//! adding an entity that points at something missing fails, deleting an
//! entity still referenced either cascades or fails, as documented per
//! method. A failed call leaves the domain unchanged.

mod loads;
mod registry;
mod snapshot;

pub use loads::CaseLoad;
pub use registry::{
    CrossSectionId, ElementId, ElementLoadId, Handle, Labeled, LoadCaseId, MaterialId,
    NodalLoadId, NodeId, PrescribedId, Registry,
};
pub use snapshot::{
    DomainSnapshot, ElementLoadSnapshot, ElementSnapshot, EntityRef, EntitySnapshot,
    LoadCaseSnapshot, NodalLoadSnapshot, NodeSnapshot, PrescribedSnapshot,
};

use crate::analysis::Formulation;
use crate::elements::{
    distance, CrossSection, CrossSectionChange, Element, ElementChange, ElementView, Material,
    MaterialChange, Node, NodeChange,
};
use crate::error::{FEAError, FEAResult};
use crate::loads::{ElementLoad, LoadCase};

/// Distance under which `copy_elements` reuses an existing node
pub const NODE_MERGE_TOLERANCE: f64 = 1e-3;

/// Entities created by [`Domain::copy_elements`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopiedEntities {
    pub nodes: Vec<NodeId>,
    pub elements: Vec<ElementId>,
}

/// Fields to change on a load case; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct LoadCaseChange {
    pub label: Option<String>,
    pub display: Option<bool>,
}

/// The structural model: entities, load cases and the active load case
#[derive(Debug, Clone)]
pub struct Domain {
    pub label: String,
    formulation: Formulation,
    materials: Registry<MaterialId, Material>,
    sections: Registry<CrossSectionId, CrossSection>,
    nodes: Registry<NodeId, Node>,
    elements: Registry<ElementId, Element>,
    load_cases: Registry<LoadCaseId, LoadCase>,
    active_load_case: Option<LoadCaseId>,
    revision: u64,
}

impl Domain {
    /// Create a domain without any entities or load cases
    pub fn empty(label: &str, formulation: Formulation) -> Self {
        Self {
            label: label.to_string(),
            formulation,
            materials: Registry::new(),
            sections: Registry::new(),
            nodes: Registry::new(),
            elements: Registry::new(),
            load_cases: Registry::new(),
            active_load_case: None,
            revision: 0,
        }
    }

    /// Create a domain holding the default material, cross-section and an
    /// active default load case
    pub fn new(label: &str, formulation: Formulation) -> Self {
        let mut domain = Self::empty(label, formulation);
        if let Err(err) = domain.add_predefined() {
            log::error!("could not register predefined items: {err}");
        }
        domain
    }

    fn add_predefined(&mut self) -> FEAResult<()> {
        self.materials.insert(Material::default_material())?;
        self.sections.insert(CrossSection::default_section())?;
        let lc = self.load_cases.insert(LoadCase::default_case())?;
        self.active_load_case = Some(lc);
        Ok(())
    }

    /// Drop every entity and restore the freshly constructed state
    pub fn reset(&mut self) {
        let revision = self.revision;
        *self = Self::new(&self.label, self.formulation);
        self.revision = revision + 1;
    }

    /// Run `edit` and roll the domain back when it fails
    fn atomically<R, F>(&mut self, edit: F) -> FEAResult<R>
    where
        F: FnOnce(&mut Self) -> FEAResult<R>,
    {
        let backup = self.clone();
        match edit(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = backup;
                Err(err)
            }
        }
    }

    /// Check geometry of `elements` and every element load placed on them
    fn check_element_loads(&self, elements: &[ElementId]) -> FEAResult<()> {
        for &id in elements {
            self.element_view(id)?;
        }
        self.loads::<ElementLoad>(false)
            .into_iter()
            .filter(|(_, load)| elements.contains(&load.element))
            .try_for_each(|(_, load)| load.check(self))
    }

    /// Extents of the axis-aligned box around all nodes, zero when empty
    pub fn bounding_box_dims(&self) -> [f64; 3] {
        if self.nodes.is_empty() {
            return [0.0; 3];
        }
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for (_, node) in self.nodes.iter() {
            for i in 0..3 {
                min[i] = min[i].min(node.coords[i]);
                max[i] = max[i].max(node.coords[i]);
            }
        }
        [max[0] - min[0], max[1] - min[1], max[2] - min[2]]
    }

    /// Largest extent of the bounding box
    pub fn max_dim(&self) -> f64 {
        self.bounding_box_dims().into_iter().fold(0.0, f64::max)
    }

    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// Counter bumped by every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ========================
    // Materials
    // ========================

    /// Add a validated material
    pub fn add_material(&mut self, material: Material) -> FEAResult<MaterialId> {
        material.validate()?;
        let id = self.materials.insert(material)?;
        self.touch();
        Ok(id)
    }

    pub fn material(&self, id: MaterialId) -> FEAResult<&Material> {
        self.materials.get(id)
    }

    /// Look up a material by label
    pub fn material_id(&self, label: &str) -> FEAResult<MaterialId> {
        self.materials.find(label)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter()
    }

    pub fn change_material(&mut self, id: MaterialId, change: &MaterialChange) -> FEAResult<()> {
        let next = self.materials.get(id)?.changed(change)?;
        self.materials.relabel(id, &next.label)?;
        *self.materials.get_mut(id)? = next;
        self.touch();
        Ok(())
    }

    /// Delete a material. Elements using it are moved to `replacement`;
    /// without one the call fails while any element uses it.
    pub fn del_material(&mut self, id: MaterialId, replacement: Option<MaterialId>) -> FEAResult<()> {
        let label = self.materials.get(id)?.label.clone();
        let users = self.elements_with_material(id);
        match replacement {
            Some(r) if r == id => {
                return Err(FEAError::InvalidInput(format!(
                    "material '{label}' cannot replace itself"
                )))
            }
            Some(r) => {
                self.materials.get(r)?;
                for e in &users {
                    self.elements.get_mut(*e)?.material = r;
                }
            }
            None if !users.is_empty() => {
                return Err(FEAError::InUse {
                    kind: "Material",
                    label,
                    used_by: self.describe_elements(&users),
                })
            }
            None => {}
        }
        self.materials.remove(id)?;
        self.touch();
        Ok(())
    }

    pub fn elements_with_material(&self, id: MaterialId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, e)| e.material == id)
            .map(|(eid, _)| eid)
            .collect()
    }

    // ========================
    // Cross-sections
    // ========================

    /// Add a validated cross-section
    pub fn add_cross_section(&mut self, section: CrossSection) -> FEAResult<CrossSectionId> {
        section.validate()?;
        let id = self.sections.insert(section)?;
        self.touch();
        Ok(id)
    }

    pub fn cross_section(&self, id: CrossSectionId) -> FEAResult<&CrossSection> {
        self.sections.get(id)
    }

    pub fn cross_section_id(&self, label: &str) -> FEAResult<CrossSectionId> {
        self.sections.find(label)
    }

    pub fn cross_sections(&self) -> impl Iterator<Item = (CrossSectionId, &CrossSection)> {
        self.sections.iter()
    }

    pub fn change_cross_section(
        &mut self,
        id: CrossSectionId,
        change: &CrossSectionChange,
    ) -> FEAResult<()> {
        let next = self.sections.get(id)?.changed(change)?;
        self.sections.relabel(id, &next.label)?;
        *self.sections.get_mut(id)? = next;
        self.touch();
        Ok(())
    }

    /// Delete a cross-section, reassigning its elements to `replacement`
    pub fn del_cross_section(
        &mut self,
        id: CrossSectionId,
        replacement: Option<CrossSectionId>,
    ) -> FEAResult<()> {
        let label = self.sections.get(id)?.label.clone();
        let users = self.elements_with_cross_section(id);
        match replacement {
            Some(r) if r == id => {
                return Err(FEAError::InvalidInput(format!(
                    "cross-section '{label}' cannot replace itself"
                )))
            }
            Some(r) => {
                self.sections.get(r)?;
                for e in &users {
                    self.elements.get_mut(*e)?.section = r;
                }
            }
            None if !users.is_empty() => {
                return Err(FEAError::InUse {
                    kind: "Cross-section",
                    label,
                    used_by: self.describe_elements(&users),
                })
            }
            None => {}
        }
        self.sections.remove(id)?;
        self.touch();
        Ok(())
    }

    pub fn elements_with_cross_section(&self, id: CrossSectionId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, e)| e.section == id)
            .map(|(eid, _)| eid)
            .collect()
    }

    // ========================
    // Nodes
    // ========================

    pub fn add_node(&mut self, node: Node) -> FEAResult<NodeId> {
        Self::check_coords(&node)?;
        let id = self.nodes.insert(node)?;
        self.touch();
        Ok(id)
    }

    fn check_coords(node: &Node) -> FEAResult<()> {
        if node.coords.iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(FEAError::InvalidInput(format!(
                "node '{}' has non-finite coordinates",
                node.label
            )))
        }
    }

    pub fn node(&self, id: NodeId) -> FEAResult<&Node> {
        self.nodes.get(id)
    }

    pub fn node_id(&self, label: &str) -> FEAResult<NodeId> {
        self.nodes.find(label)
    }

    /// Nodes in registry order, which is the equation numbering order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Change a node. Fails, leaving the domain untouched, when an element
    /// on the node would lose its length or a point load would fall off it.
    pub fn change_node(&mut self, id: NodeId, change: &NodeChange) -> FEAResult<()> {
        self.atomically(|d| d.apply_node_change(id, change))
    }

    /// Apply the same change to several nodes, all or nothing
    pub fn change_nodes(&mut self, ids: &[NodeId], change: &NodeChange) -> FEAResult<()> {
        self.atomically(|d| ids.iter().try_for_each(|&id| d.apply_node_change(id, change)))
    }

    /// Translate nodes by `offset`, all or nothing
    pub fn move_nodes(&mut self, ids: &[NodeId], offset: [f64; 3]) -> FEAResult<()> {
        self.atomically(|d| {
            for &id in ids {
                let c = d.nodes.get(id)?.coords;
                let change = NodeChange {
                    coords: Some([c[0] + offset[0], c[1] + offset[1], c[2] + offset[2]]),
                    ..Default::default()
                };
                d.apply_node_change(id, &change)?;
            }
            log::info!("moved {} node(s) by {offset:?}", ids.len());
            Ok(())
        })
    }

    fn apply_node_change(&mut self, id: NodeId, change: &NodeChange) -> FEAResult<()> {
        let mut next = self.nodes.get(id)?.clone();
        if let Some(label) = &change.label {
            next.label = label.clone();
        }
        if let Some(coords) = change.coords {
            next.coords = coords;
        }
        if let Some(supports) = change.supports {
            next.supports = supports;
        }
        Self::check_coords(&next)?;
        self.nodes.relabel(id, &next.label)?;
        *self.nodes.get_mut(id)? = next;
        self.check_element_loads(&self.elements_with_node(id))?;
        self.touch();
        Ok(())
    }

    /// Delete a node together with its elements (and their loads), its
    /// nodal loads and its prescribed displacements
    pub fn del_node(&mut self, id: NodeId) -> FEAResult<Node> {
        self.nodes.get(id)?;
        for e in self.elements_with_node(id) {
            self.del_element(e)?;
        }
        for lc in self.load_cases.ids() {
            let case = self.load_cases.get_mut(lc)?;
            let nodal: Vec<_> = case
                .nodal_loads
                .iter()
                .filter(|(_, l)| l.node == id)
                .map(|(lid, _)| lid)
                .collect();
            for lid in nodal {
                case.nodal_loads.remove(lid)?;
            }
            let prescribed: Vec<_> = case
                .prescribed
                .iter()
                .filter(|(_, p)| p.node == id)
                .map(|(lid, _)| lid)
                .collect();
            for lid in prescribed {
                case.prescribed.remove(lid)?;
            }
        }
        let node = self.nodes.remove(id)?;
        self.touch();
        Ok(node)
    }

    /// Delete several nodes with the cascade of [`Domain::del_node`], all or
    /// nothing
    pub fn del_nodes(&mut self, ids: &[NodeId]) -> FEAResult<Vec<Node>> {
        self.atomically(|d| ids.iter().map(|&id| d.del_node(id)).collect())
    }

    pub fn elements_with_node(&self, id: NodeId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, e)| e.connects(id))
            .map(|(eid, _)| eid)
            .collect()
    }

    /// First node within `tol` of `coords`
    pub fn node_at(&self, coords: [f64; 3], tol: f64) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| distance(&n.coords, &coords) < tol)
            .map(|(id, _)| id)
    }

    // ========================
    // Elements
    // ========================

    /// Add an element of the domain's formulation
    pub fn add_element(&mut self, mut element: Element) -> FEAResult<ElementId> {
        element.kind = self.formulation.element_kind();
        self.check_element(&element)?;
        let id = self.elements.insert(element)?;
        self.touch();
        Ok(id)
    }

    fn check_element(&self, element: &Element) -> FEAResult<()> {
        let [start, end] = element.nodes;
        self.nodes.get(start)?;
        self.nodes.get(end)?;
        if start == end {
            return Err(FEAError::CoincidentNodes(element.label.clone()));
        }
        self.materials.get(element.material)?;
        self.sections.get(element.section)?;
        Ok(())
    }

    pub fn element(&self, id: ElementId) -> FEAResult<&Element> {
        self.elements.get(id)
    }

    pub fn element_id(&self, label: &str) -> FEAResult<ElementId> {
        self.elements.find(label)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Change an element. Fails, leaving the domain untouched, when a point
    /// load on it would fall outside the changed element.
    pub fn change_element(&mut self, id: ElementId, change: &ElementChange) -> FEAResult<()> {
        self.atomically(|d| d.apply_element_change(id, change))
    }

    /// Apply the same change to several elements, all or nothing
    pub fn change_elements(&mut self, ids: &[ElementId], change: &ElementChange) -> FEAResult<()> {
        self.atomically(|d| ids.iter().try_for_each(|&id| d.apply_element_change(id, change)))
    }

    fn apply_element_change(&mut self, id: ElementId, change: &ElementChange) -> FEAResult<()> {
        let mut next = self.elements.get(id)?.clone();
        if let Some(label) = &change.label {
            next.label = label.clone();
        }
        if let Some(nodes) = change.nodes {
            next.nodes = nodes;
        }
        if let Some(material) = change.material {
            next.material = material;
        }
        if let Some(section) = change.section {
            next.section = section;
        }
        if let Some(hinges) = change.hinges {
            next.hinges = hinges;
        }
        self.replace_element(id, next)
    }

    /// Overwrite element `id`, re-checking the loads placed on it
    fn replace_element(&mut self, id: ElementId, mut element: Element) -> FEAResult<()> {
        element.kind = self.formulation.element_kind();
        self.elements.get(id)?;
        self.check_element(&element)?;
        self.elements.relabel(id, &element.label)?;
        *self.elements.get_mut(id)? = element;
        self.check_element_loads(&[id])?;
        self.touch();
        Ok(())
    }

    /// Delete an element and every load attached to it
    pub fn del_element(&mut self, id: ElementId) -> FEAResult<Element> {
        self.elements.get(id)?;
        for lc in self.load_cases.ids() {
            let case = self.load_cases.get_mut(lc)?;
            let attached: Vec<_> = case
                .element_loads
                .iter()
                .filter(|(_, l)| l.element == id)
                .map(|(lid, _)| lid)
                .collect();
            for lid in attached {
                case.element_loads.remove(lid)?;
            }
        }
        let element = self.elements.remove(id)?;
        self.touch();
        Ok(element)
    }

    /// Delete several elements with their loads, all or nothing
    pub fn del_elements(&mut self, ids: &[ElementId]) -> FEAResult<Vec<Element>> {
        self.atomically(|d| ids.iter().map(|&id| d.del_element(id)).collect())
    }

    /// Copy `elements` and the standalone `nodes` `copies` times, copy `i`
    /// shifted by `i * offset`. Existing nodes within
    /// [`NODE_MERGE_TOLERANCE`] of a target position are reused, elements
    /// duplicating an existing one are skipped and new entities get the
    /// next free numeric label. Loads are not copied. All or nothing.
    pub fn copy_elements(
        &mut self,
        elements: &[ElementId],
        nodes: &[NodeId],
        offset: [f64; 3],
        copies: usize,
    ) -> FEAResult<CopiedEntities> {
        self.atomically(|d| {
            let mut created = CopiedEntities::default();
            let mut element_nodes = Vec::new();
            for &id in elements {
                element_nodes.extend(d.elements.get(id)?.nodes);
            }
            for i in 1..=copies {
                let shift = offset.map(|o| o * i as f64);
                for &id in elements {
                    let source = d.elements.get(id)?.clone();
                    let mut ends = [source.nodes[0]; 2];
                    for (end, &node) in ends.iter_mut().zip(&source.nodes) {
                        *end = d.copy_node(node, shift, &mut created)?;
                    }
                    if d.element_between(ends[0], ends[1]).is_some() {
                        continue;
                    }
                    let label = d.elements.next_numeric_label();
                    let copy = Element::new(&label, ends[0], ends[1], source.material, source.section)
                        .with_hinges(source.hinges);
                    created.elements.push(d.add_element(copy)?);
                }
                for &node in nodes.iter().filter(|n| !element_nodes.contains(n)) {
                    d.copy_node(node, shift, &mut created)?;
                }
            }
            log::info!(
                "copied {} element(s) {copies} time(s), created {} node(s) and {} element(s)",
                elements.len(),
                created.nodes.len(),
                created.elements.len()
            );
            Ok(created)
        })
    }

    /// Node at `node`'s position shifted by `shift`, created with the same
    /// supports unless one already exists there
    fn copy_node(&mut self, node: NodeId, shift: [f64; 3], created: &mut CopiedEntities) -> FEAResult<NodeId> {
        let source = self.nodes.get(node)?;
        let coords = [
            source.coords[0] + shift[0],
            source.coords[1] + shift[1],
            source.coords[2] + shift[2],
        ];
        if let Some(existing) = self.node_at(coords, NODE_MERGE_TOLERANCE) {
            return Ok(existing);
        }
        let supports = source.supports;
        let label = self.nodes.next_numeric_label();
        let id = self.add_node(Node::new(&label, coords[0], coords[1], coords[2]).with_supports(supports))?;
        created.nodes.push(id);
        Ok(id)
    }

    /// Element with its material, section and geometry resolved
    pub fn element_view(&self, id: ElementId) -> FEAResult<ElementView<'_>> {
        let element = self.elements.get(id)?;
        ElementView::new(
            element,
            self.materials.get(element.material)?,
            self.sections.get(element.section)?,
            self.nodes.get(element.nodes[0])?,
            self.nodes.get(element.nodes[1])?,
        )
    }

    /// An element joining `a` and `b` in either direction
    pub fn element_between(&self, a: NodeId, b: NodeId) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, e)| e.nodes == [a, b] || e.nodes == [b, a])
            .map(|(id, _)| id)
    }

    fn describe_elements(&self, ids: &[ElementId]) -> String {
        let labels: Vec<&str> = ids
            .iter()
            .filter_map(|id| self.elements.get(*id).ok())
            .map(|e| e.label.as_str())
            .collect();
        format!("elements [{}]", labels.join(", "))
    }

    // ========================
    // Load cases
    // ========================

    /// Add a load case; the first load case of a domain becomes active
    pub fn add_load_case(&mut self, case: LoadCase) -> FEAResult<LoadCaseId> {
        let id = self.load_cases.insert(case)?;
        if self.active_load_case.is_none() {
            self.active_load_case = Some(id);
        }
        self.touch();
        Ok(id)
    }

    pub fn load_case(&self, id: LoadCaseId) -> FEAResult<&LoadCase> {
        self.load_cases.get(id)
    }

    pub fn load_case_id(&self, label: &str) -> FEAResult<LoadCaseId> {
        self.load_cases.find(label)
    }

    pub fn load_cases(&self) -> impl Iterator<Item = (LoadCaseId, &LoadCase)> {
        self.load_cases.iter()
    }

    pub fn load_case_count(&self) -> usize {
        self.load_cases.len()
    }

    pub fn active_load_case(&self) -> Option<LoadCaseId> {
        self.active_load_case
    }

    pub fn set_active_load_case(&mut self, id: LoadCaseId) -> FEAResult<()> {
        self.load_cases.get(id)?;
        self.active_load_case = Some(id);
        self.touch();
        Ok(())
    }

    pub fn change_load_case(&mut self, id: LoadCaseId, change: &LoadCaseChange) -> FEAResult<()> {
        self.load_cases.get(id)?;
        if let Some(label) = &change.label {
            self.load_cases.relabel(id, label)?;
        }
        if let Some(display) = change.display {
            self.load_cases.get_mut(id)?.display = display;
        }
        self.touch();
        Ok(())
    }

    /// Delete a load case.
    ///
    /// The active case is only deleted when `forced`. With a `replacement`
    /// its loads move there; otherwise a non-empty case is only deleted,
    /// loads included, when `forced`.
    pub fn del_load_case(
        &mut self,
        id: LoadCaseId,
        replacement: Option<LoadCaseId>,
        forced: bool,
    ) -> FEAResult<LoadCase> {
        let case = self.load_cases.get(id)?;
        let label = case.label.clone();
        let is_empty = case.is_empty();
        if self.active_load_case == Some(id) && !forced {
            return Err(FEAError::ActiveLoadCase(label));
        }

        match replacement {
            Some(r) if r == id => {
                return Err(FEAError::InvalidInput(format!(
                    "load case '{label}' cannot replace itself"
                )))
            }
            Some(r) => self.merge_load_case(id, r)?,
            None if !is_empty && !forced => return Err(FEAError::LoadCaseNotEmpty(label)),
            None => {}
        }

        let removed = self.load_cases.remove(id)?;
        if self.active_load_case == Some(id) {
            self.active_load_case = self.load_cases.ids().first().copied();
        }
        self.touch();
        Ok(removed)
    }

    /// Move every load of `from` into `into`, failing before any move on a
    /// label clash
    fn merge_load_case(&mut self, from: LoadCaseId, into: LoadCaseId) -> FEAResult<()> {
        let source = self.load_cases.get(from)?;
        let target = self.load_cases.get(into)?;
        for (_, l) in source.nodal_loads.iter() {
            if target.nodal_loads.contains_label(&l.label) {
                return Err(FEAError::DuplicateName(l.label.clone()));
            }
        }
        for (_, l) in source.element_loads.iter() {
            if target.element_loads.contains_label(&l.label) {
                return Err(FEAError::DuplicateName(l.label.clone()));
            }
        }
        for (_, l) in source.prescribed.iter() {
            if target.prescribed.contains_label(&l.label) {
                return Err(FEAError::DuplicateName(l.label.clone()));
            }
        }

        let source = self.load_cases.get_mut(from)?;
        let nodal = source.nodal_loads.drain();
        let element = source.element_loads.drain();
        let prescribed = source.prescribed.drain();

        let target = self.load_cases.get_mut(into)?;
        for l in nodal {
            target.nodal_loads.insert(l)?;
        }
        for l in element {
            target.element_loads.insert(l)?;
        }
        for l in prescribed {
            target.prescribed.insert(l)?;
        }
        Ok(())
    }
}
