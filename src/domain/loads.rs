//! Loads held by load cases: adding, changing, moving and querying them

use super::{Domain, ElementId, ElementLoadId, Handle, Labeled, LoadCaseId, NodalLoadId, NodeId, PrescribedId, Registry};
use crate::error::{FEAError, FEAResult};
use crate::loads::{ElementLoad, ElementLoadValue, LoadCase, LoadKey, NodalLoad, PrescribedDisplacement};

/// A load stored in one of the three collections of a load case
pub trait CaseLoad: Labeled + Clone {
    type Id: Handle;

    fn registry(case: &LoadCase) -> &Registry<Self::Id, Self>;
    fn registry_mut(case: &mut LoadCase) -> &mut Registry<Self::Id, Self>;

    /// Check that the load's target exists and its value fits the target
    fn check(&self, domain: &Domain) -> FEAResult<()>;
}

impl CaseLoad for NodalLoad {
    type Id = NodalLoadId;

    fn registry(case: &LoadCase) -> &Registry<NodalLoadId, Self> {
        &case.nodal_loads
    }

    fn registry_mut(case: &mut LoadCase) -> &mut Registry<NodalLoadId, Self> {
        &mut case.nodal_loads
    }

    fn check(&self, domain: &Domain) -> FEAResult<()> {
        domain.node(self.node).map(|_| ())
    }
}

impl CaseLoad for PrescribedDisplacement {
    type Id = PrescribedId;

    fn registry(case: &LoadCase) -> &Registry<PrescribedId, Self> {
        &case.prescribed
    }

    fn registry_mut(case: &mut LoadCase) -> &mut Registry<PrescribedId, Self> {
        &mut case.prescribed
    }

    fn check(&self, domain: &Domain) -> FEAResult<()> {
        domain.node(self.node).map(|_| ())
    }
}

impl CaseLoad for ElementLoad {
    type Id = ElementLoadId;

    fn registry(case: &LoadCase) -> &Registry<ElementLoadId, Self> {
        &case.element_loads
    }

    fn registry_mut(case: &mut LoadCase) -> &mut Registry<ElementLoadId, Self> {
        &mut case.element_loads
    }

    fn check(&self, domain: &Domain) -> FEAResult<()> {
        let view = domain.element_view(self.element)?;
        if let Some((distance, _, _)) = self.value.point_force() {
            if !(0.0..=view.length).contains(&distance) {
                return Err(FEAError::InvalidInput(format!(
                    "load '{}': distance {distance} outside element '{}' of length {}",
                    self.label, view.element.label, view.length
                )));
            }
        }
        Ok(())
    }
}

impl Domain {
    fn target_case(&self, case: Option<LoadCaseId>) -> FEAResult<LoadCaseId> {
        let id = case
            .or(self.active_load_case)
            .ok_or_else(|| FEAError::not_found("Load case", "<active>"))?;
        self.load_cases.get(id)?;
        Ok(id)
    }

    /// Add `load` to `case`, or to the active load case when `None`
    pub fn add_load<T: CaseLoad>(&mut self, load: T, case: Option<LoadCaseId>) -> FEAResult<LoadKey<T::Id>> {
        let case = self.target_case(case)?;
        load.check(self)?;
        let id = T::registry_mut(self.load_cases.get_mut(case)?).insert(load)?;
        self.touch();
        Ok(LoadKey::new(case, id))
    }

    pub fn add_nodal_load(&mut self, load: NodalLoad, case: Option<LoadCaseId>) -> FEAResult<LoadKey<NodalLoadId>> {
        self.add_load(load, case)
    }

    pub fn add_element_load(
        &mut self,
        load: ElementLoad,
        case: Option<LoadCaseId>,
    ) -> FEAResult<LoadKey<ElementLoadId>> {
        self.add_load(load, case)
    }

    pub fn add_prescribed_displacement(
        &mut self,
        load: PrescribedDisplacement,
        case: Option<LoadCaseId>,
    ) -> FEAResult<LoadKey<PrescribedId>> {
        self.add_load(load, case)
    }

    pub fn load<T: CaseLoad>(&self, key: LoadKey<T::Id>) -> FEAResult<&T> {
        T::registry(self.load_cases.get(key.case)?).get(key.id)
    }

    /// Look up a load by the labels of its load case and itself
    pub fn load_key<T: CaseLoad>(&self, case: &str, label: &str) -> FEAResult<LoadKey<T::Id>> {
        let case = self.load_cases.find(case)?;
        let id = T::registry(self.load_cases.get(case)?).find(label)?;
        Ok(LoadKey::new(case, id))
    }

    /// Edit a load through `edit`, optionally moving it to `move_to`.
    /// Returns the load's key, which changes when it moves.
    pub fn change_load<T, F>(
        &mut self,
        key: LoadKey<T::Id>,
        move_to: Option<LoadCaseId>,
        edit: F,
    ) -> FEAResult<LoadKey<T::Id>>
    where
        T: CaseLoad,
        F: FnOnce(&mut T),
    {
        let mut next = self.load::<T>(key)?.clone();
        edit(&mut next);
        next.check(self)?;

        let target = move_to.unwrap_or(key.case);
        if target == key.case {
            let registry = T::registry_mut(self.load_cases.get_mut(key.case)?);
            registry.relabel(key.id, next.label())?;
            *registry.get_mut(key.id)? = next;
            self.touch();
            return Ok(key);
        }

        if T::registry(self.load_cases.get(target)?).contains_label(next.label()) {
            return Err(FEAError::DuplicateName(next.label().to_string()));
        }
        T::registry_mut(self.load_cases.get_mut(key.case)?).remove(key.id)?;
        let id = T::registry_mut(self.load_cases.get_mut(target)?).insert(next)?;
        self.touch();
        Ok(LoadKey::new(target, id))
    }

    pub fn del_load<T: CaseLoad>(&mut self, key: LoadKey<T::Id>) -> FEAResult<T> {
        let load = T::registry_mut(self.load_cases.get_mut(key.case)?).remove(key.id)?;
        self.touch();
        Ok(load)
    }

    /// Loads of type `T` in every load case, or only in the active one
    pub fn loads<T: CaseLoad>(&self, only_active: bool) -> Vec<(LoadKey<T::Id>, &T)> {
        self.load_cases
            .iter()
            .filter(|(id, _)| !only_active || Some(*id) == self.active_load_case)
            .flat_map(|(case, lc)| {
                T::registry(lc)
                    .iter()
                    .map(move |(id, load)| (LoadKey::new(case, id), load))
            })
            .collect()
    }

    pub fn nodal_loads_on_node(&self, node: NodeId, only_active: bool) -> Vec<(LoadKey<NodalLoadId>, &NodalLoad)> {
        self.loads::<NodalLoad>(only_active)
            .into_iter()
            .filter(|(_, l)| l.node == node)
            .collect()
    }

    pub fn prescribed_on_node(
        &self,
        node: NodeId,
        only_active: bool,
    ) -> Vec<(LoadKey<PrescribedId>, &PrescribedDisplacement)> {
        self.loads::<PrescribedDisplacement>(only_active)
            .into_iter()
            .filter(|(_, l)| l.node == node)
            .collect()
    }

    pub fn element_loads_on_element(
        &self,
        element: ElementId,
        only_active: bool,
    ) -> Vec<(LoadKey<ElementLoadId>, &ElementLoad)> {
        self.loads::<ElementLoad>(only_active)
            .into_iter()
            .filter(|(_, l)| l.element == element)
            .collect()
    }

    /// Values of the loads acting on `element` in `case`
    pub fn element_load_values(&self, case: LoadCaseId, element: ElementId) -> FEAResult<Vec<ElementLoadValue>> {
        Ok(self
            .load_cases
            .get(case)?
            .element_loads
            .iter()
            .filter(|(_, l)| l.element == element)
            .map(|(_, l)| l.value)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Formulation;
    use crate::elements::{Element, Node};
    use crate::loads::{LoadDirection, NodalLoadValue};

    fn beam() -> (Domain, NodeId, NodeId, ElementId) {
        let mut d = Domain::new("d", Formulation::Beam2d);
        let a = d.add_node(Node::new("a", 0.0, 0.0, 0.0)).unwrap();
        let b = d.add_node(Node::new("b", 3.0, 0.0, 0.0)).unwrap();
        let mat = d.material_id("DefaultMat").unwrap();
        let cs = d.cross_section_id("DefaultCS").unwrap();
        let e = d.add_element(Element::new("e", a, b, mat, cs)).unwrap();
        (d, a, b, e)
    }

    #[test]
    fn test_add_to_active_case() {
        let (mut d, _, b, _) = beam();
        let key = d
            .add_nodal_load(NodalLoad::new("P", b, NodalLoadValue::frame(0.0, 10.0, 0.0)), None)
            .unwrap();
        assert_eq!(Some(key.case), d.active_load_case());
        assert_eq!(d.nodal_loads_on_node(b, true).len(), 1);
        assert!(d
            .add_nodal_load(NodalLoad::new("P", b, NodalLoadValue::default()), None)
            .is_err());
    }

    #[test]
    fn test_point_force_outside_element_rejected() {
        let (mut d, _, _, e) = beam();
        let load = ElementLoad::new("F", e, ElementLoadValue::point(0.0, 1.0, 3.5));
        assert!(d.add_element_load(load, None).is_err());
        let load = ElementLoad::new("F", e, ElementLoadValue::point(0.0, 1.0, 3.0));
        assert!(d.add_element_load(load, None).is_ok());
    }

    #[test]
    fn test_move_load_between_cases() {
        let (mut d, _, _, e) = beam();
        let wind = d.add_load_case(LoadCase::new("wind")).unwrap();
        let key = d
            .add_element_load(
                ElementLoad::new("q", e, ElementLoadValue::uniform(LoadDirection::Z, 5.0)),
                None,
            )
            .unwrap();
        let moved = d
            .change_load::<ElementLoad, _>(key, Some(wind), |l| l.label = "q2".into())
            .unwrap();
        assert_eq!(moved.case, wind);
        assert!(d.load::<ElementLoad>(key).is_err());
        assert_eq!(d.load::<ElementLoad>(moved).unwrap().label, "q2");
        assert!(d.element_loads_on_element(e, true).is_empty());
        assert_eq!(d.element_loads_on_element(e, false).len(), 1);
    }

    #[test]
    fn test_delete_node_cascades() {
        let (mut d, a, b, e) = beam();
        d.add_element_load(
            ElementLoad::new("q", e, ElementLoadValue::uniform(LoadDirection::Z, 5.0)),
            None,
        )
        .unwrap();
        d.add_nodal_load(NodalLoad::new("P", b, NodalLoadValue::frame(1.0, 0.0, 0.0)), None)
            .unwrap();
        d.add_prescribed_displacement(PrescribedDisplacement::new("s", b, [0.0, 0.01, 0.0]), None)
            .unwrap();

        d.del_node(b).unwrap();
        assert_eq!(d.element_count(), 0);
        assert!(d.loads::<ElementLoad>(false).is_empty());
        assert!(d.loads::<NodalLoad>(false).is_empty());
        assert!(d.loads::<PrescribedDisplacement>(false).is_empty());
        assert!(d.node(a).is_ok());
    }

    #[test]
    fn test_delete_load_case_with_replacement() {
        let (mut d, _, b, _) = beam();
        let active = d.active_load_case().unwrap();
        let extra = d.add_load_case(LoadCase::new("extra")).unwrap();
        d.add_nodal_load(NodalLoad::new("P", b, NodalLoadValue::frame(1.0, 0.0, 0.0)), Some(extra))
            .unwrap();
        assert!(matches!(
            d.del_load_case(extra, None, false),
            Err(FEAError::LoadCaseNotEmpty(_))
        ));
        d.del_load_case(extra, Some(active), false).unwrap();
        assert_eq!(d.nodal_loads_on_node(b, true).len(), 1);
    }
}
