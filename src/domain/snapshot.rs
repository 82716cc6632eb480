//! Label-based snapshots of domain entities
//!
//! Snapshots refer to other entities by label rather than by handle, so a
//! snapshot stays meaningful across domains and survives a JSON round trip.

use serde::{Deserialize, Serialize};

use super::{
    CaseLoad, CrossSectionId, Domain, ElementId, ElementLoadId, LoadCaseChange, LoadCaseId, MaterialId,
    NodalLoadId, NodeId, PrescribedId,
};
use crate::analysis::Formulation;
use crate::elements::{CrossSection, Element, Hinges, Material, Node, NodeChange, Supports};
use crate::error::{FEAError, FEAResult};
use crate::loads::{
    ElementLoad, ElementLoadValue, LoadCase, LoadKey, NodalLoad, NodalLoadValue, PrescribedDisplacement,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub label: String,
    pub coords: [f64; 3],
    pub supports: Supports,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub label: String,
    /// Start and end node labels
    pub nodes: [String; 2],
    pub material: String,
    pub section: String,
    pub hinges: Hinges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCaseSnapshot {
    pub label: String,
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodalLoadSnapshot {
    pub label: String,
    pub load_case: String,
    pub node: String,
    pub value: NodalLoadValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementLoadSnapshot {
    pub label: String,
    pub load_case: String,
    pub element: String,
    pub value: ElementLoadValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedSnapshot {
    pub label: String,
    pub load_case: String,
    pub node: String,
    pub value: [f64; 3],
}

/// Snapshot of any single entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity")]
pub enum EntitySnapshot {
    Material(Material),
    CrossSection(CrossSection),
    Node(NodeSnapshot),
    Element(ElementSnapshot),
    LoadCase(LoadCaseSnapshot),
    NodalLoad(NodalLoadSnapshot),
    ElementLoad(ElementLoadSnapshot),
    Prescribed(PrescribedSnapshot),
}

impl EntitySnapshot {
    pub fn label(&self) -> &str {
        match self {
            Self::Material(m) => &m.label,
            Self::CrossSection(cs) => &cs.label,
            Self::Node(n) => &n.label,
            Self::Element(e) => &e.label,
            Self::LoadCase(lc) => &lc.label,
            Self::NodalLoad(l) => &l.label,
            Self::ElementLoad(l) => &l.label,
            Self::Prescribed(l) => &l.label,
        }
    }
}

/// Handle of any single entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Material(MaterialId),
    CrossSection(CrossSectionId),
    Node(NodeId),
    Element(ElementId),
    LoadCase(LoadCaseId),
    NodalLoad(LoadKey<NodalLoadId>),
    ElementLoad(LoadKey<ElementLoadId>),
    Prescribed(LoadKey<PrescribedId>),
}

/// A whole domain in dependency order: materials, cross-sections, nodes,
/// elements, load cases and finally their loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub label: String,
    pub formulation: Formulation,
    pub active_load_case: Option<String>,
    pub entities: Vec<EntitySnapshot>,
}

impl DomainSnapshot {
    pub fn to_json(&self) -> FEAResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> FEAResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Domain {
    /// Snapshot of the entity behind `entity`
    pub fn entity_snapshot(&self, entity: EntityRef) -> FEAResult<EntitySnapshot> {
        Ok(match entity {
            EntityRef::Material(id) => EntitySnapshot::Material(self.materials.get(id)?.clone()),
            EntityRef::CrossSection(id) => EntitySnapshot::CrossSection(self.sections.get(id)?.clone()),
            EntityRef::Node(id) => {
                let node = self.nodes.get(id)?;
                EntitySnapshot::Node(NodeSnapshot {
                    label: node.label.clone(),
                    coords: node.coords,
                    supports: node.supports,
                })
            }
            EntityRef::Element(id) => {
                let e = self.elements.get(id)?;
                EntitySnapshot::Element(ElementSnapshot {
                    label: e.label.clone(),
                    nodes: [
                        self.nodes.get(e.nodes[0])?.label.clone(),
                        self.nodes.get(e.nodes[1])?.label.clone(),
                    ],
                    material: self.materials.get(e.material)?.label.clone(),
                    section: self.sections.get(e.section)?.label.clone(),
                    hinges: e.hinges,
                })
            }
            EntityRef::LoadCase(id) => {
                let lc = self.load_cases.get(id)?;
                EntitySnapshot::LoadCase(LoadCaseSnapshot {
                    label: lc.label.clone(),
                    display: lc.display,
                })
            }
            EntityRef::NodalLoad(key) => {
                let l = self.load::<NodalLoad>(key)?;
                EntitySnapshot::NodalLoad(NodalLoadSnapshot {
                    label: l.label.clone(),
                    load_case: self.load_cases.get(key.case)?.label.clone(),
                    node: self.nodes.get(l.node)?.label.clone(),
                    value: l.value,
                })
            }
            EntityRef::ElementLoad(key) => {
                let l = self.load::<ElementLoad>(key)?;
                EntitySnapshot::ElementLoad(ElementLoadSnapshot {
                    label: l.label.clone(),
                    load_case: self.load_cases.get(key.case)?.label.clone(),
                    element: self.elements.get(l.element)?.label.clone(),
                    value: l.value,
                })
            }
            EntityRef::Prescribed(key) => {
                let l = self.load::<PrescribedDisplacement>(key)?;
                EntitySnapshot::Prescribed(PrescribedSnapshot {
                    label: l.label.clone(),
                    load_case: self.load_cases.get(key.case)?.label.clone(),
                    node: self.nodes.get(l.node)?.label.clone(),
                    value: l.value,
                })
            }
        })
    }

    /// Every entity of the domain in dependency order
    pub fn entity_refs(&self) -> Vec<EntityRef> {
        let mut refs: Vec<EntityRef> = Vec::new();
        refs.extend(self.materials.ids().into_iter().map(EntityRef::Material));
        refs.extend(self.sections.ids().into_iter().map(EntityRef::CrossSection));
        refs.extend(self.nodes.ids().into_iter().map(EntityRef::Node));
        refs.extend(self.elements.ids().into_iter().map(EntityRef::Element));
        refs.extend(self.load_cases.ids().into_iter().map(EntityRef::LoadCase));
        refs.extend(self.loads::<NodalLoad>(false).into_iter().map(|(k, _)| EntityRef::NodalLoad(k)));
        refs.extend(self.loads::<ElementLoad>(false).into_iter().map(|(k, _)| EntityRef::ElementLoad(k)));
        refs.extend(
            self.loads::<PrescribedDisplacement>(false)
                .into_iter()
                .map(|(k, _)| EntityRef::Prescribed(k)),
        );
        refs
    }

    pub fn snapshot(&self) -> FEAResult<DomainSnapshot> {
        let entities = self
            .entity_refs()
            .into_iter()
            .map(|r| self.entity_snapshot(r))
            .collect::<FEAResult<Vec<_>>>()?;
        let active_load_case = match self.active_load_case {
            Some(id) => Some(self.load_cases.get(id)?.label.clone()),
            None => None,
        };

        Ok(DomainSnapshot {
            label: self.label.clone(),
            formulation: self.formulation,
            active_load_case,
            entities,
        })
    }

    /// Rebuild a domain from a snapshot. Only the entities in the snapshot
    /// are created; predefined items are not added.
    pub fn from_snapshot(snapshot: &DomainSnapshot) -> FEAResult<Self> {
        let mut domain = Self::empty(&snapshot.label, snapshot.formulation);
        for entity in &snapshot.entities {
            domain.restore(entity, None)?;
        }
        domain.active_load_case = match &snapshot.active_load_case {
            Some(label) => Some(domain.load_cases.find(label)?),
            None => None,
        };
        Ok(domain)
    }

    /// Apply `snapshot`: overwrite the entity behind `target`, or add a new
    /// entity when `target` is `None`. Returns the handle of the entity.
    pub fn restore(&mut self, snapshot: &EntitySnapshot, target: Option<EntityRef>) -> FEAResult<EntityRef> {
        match (snapshot, target) {
            (EntitySnapshot::Material(m), None) => Ok(EntityRef::Material(self.add_material(m.clone())?)),
            (EntitySnapshot::Material(m), Some(EntityRef::Material(id))) => {
                m.validate()?;
                self.materials.get(id)?;
                self.materials.relabel(id, &m.label)?;
                *self.materials.get_mut(id)? = m.clone();
                self.touch();
                Ok(EntityRef::Material(id))
            }
            (EntitySnapshot::CrossSection(cs), None) => {
                Ok(EntityRef::CrossSection(self.add_cross_section(cs.clone())?))
            }
            (EntitySnapshot::CrossSection(cs), Some(EntityRef::CrossSection(id))) => {
                cs.validate()?;
                self.sections.get(id)?;
                self.sections.relabel(id, &cs.label)?;
                *self.sections.get_mut(id)? = cs.clone();
                self.touch();
                Ok(EntityRef::CrossSection(id))
            }
            (EntitySnapshot::Node(n), None) => {
                let node = Node::new(&n.label, n.coords[0], n.coords[1], n.coords[2]).with_supports(n.supports);
                Ok(EntityRef::Node(self.add_node(node)?))
            }
            (EntitySnapshot::Node(n), Some(EntityRef::Node(id))) => {
                let change = NodeChange {
                    label: Some(n.label.clone()),
                    coords: Some(n.coords),
                    supports: Some(n.supports),
                };
                self.change_node(id, &change)?;
                Ok(EntityRef::Node(id))
            }
            (EntitySnapshot::Element(e), None) => {
                let element = self.resolve_element(e)?;
                Ok(EntityRef::Element(self.add_element(element)?))
            }
            (EntitySnapshot::Element(e), Some(EntityRef::Element(id))) => {
                let element = self.resolve_element(e)?;
                self.atomically(|d| d.replace_element(id, element))?;
                Ok(EntityRef::Element(id))
            }
            (EntitySnapshot::LoadCase(lc), None) => {
                let mut case = LoadCase::new(&lc.label);
                case.display = lc.display;
                Ok(EntityRef::LoadCase(self.add_load_case(case)?))
            }
            (EntitySnapshot::LoadCase(lc), Some(EntityRef::LoadCase(id))) => {
                let change = LoadCaseChange {
                    label: Some(lc.label.clone()),
                    display: Some(lc.display),
                };
                self.change_load_case(id, &change)?;
                Ok(EntityRef::LoadCase(id))
            }
            (EntitySnapshot::NodalLoad(l), target) => {
                let case = self.load_cases.find(&l.load_case)?;
                let load = NodalLoad::new(&l.label, self.nodes.find(&l.node)?, l.value);
                let key = match target {
                    None => self.add_load(load, Some(case))?,
                    Some(EntityRef::NodalLoad(key)) => self.replace_load(key, case, load)?,
                    Some(other) => return Err(mismatch(snapshot, other)),
                };
                Ok(EntityRef::NodalLoad(key))
            }
            (EntitySnapshot::ElementLoad(l), target) => {
                let case = self.load_cases.find(&l.load_case)?;
                let load = ElementLoad::new(&l.label, self.elements.find(&l.element)?, l.value);
                let key = match target {
                    None => self.add_load(load, Some(case))?,
                    Some(EntityRef::ElementLoad(key)) => self.replace_load(key, case, load)?,
                    Some(other) => return Err(mismatch(snapshot, other)),
                };
                Ok(EntityRef::ElementLoad(key))
            }
            (EntitySnapshot::Prescribed(l), target) => {
                let case = self.load_cases.find(&l.load_case)?;
                let load = PrescribedDisplacement::new(&l.label, self.nodes.find(&l.node)?, l.value);
                let key = match target {
                    None => self.add_load(load, Some(case))?,
                    Some(EntityRef::Prescribed(key)) => self.replace_load(key, case, load)?,
                    Some(other) => return Err(mismatch(snapshot, other)),
                };
                Ok(EntityRef::Prescribed(key))
            }
            (_, Some(other)) => Err(mismatch(snapshot, other)),
        }
    }

    fn resolve_element(&self, e: &ElementSnapshot) -> FEAResult<Element> {
        let element = Element::new(
            &e.label,
            self.nodes.find(&e.nodes[0])?,
            self.nodes.find(&e.nodes[1])?,
            self.materials.find(&e.material)?,
            self.sections.find(&e.section)?,
        );
        Ok(element.with_hinges(e.hinges))
    }

    fn replace_load<T: CaseLoad>(
        &mut self,
        key: LoadKey<T::Id>,
        case: LoadCaseId,
        load: T,
    ) -> FEAResult<LoadKey<T::Id>> {
        self.change_load(key, Some(case), |l: &mut T| *l = load)
    }
}

fn mismatch(snapshot: &EntitySnapshot, target: EntityRef) -> FEAError {
    FEAError::InvalidInput(format!(
        "snapshot of '{}' cannot be applied to {target:?}",
        snapshot.label()
    ))
}
