use approx::assert_relative_eq;
use frame_fea::prelude::*;

/// Two-span continuous beam with loads in two cases
fn continuous_beam() -> Domain {
    let mut domain = Domain::new("two spans", Formulation::Beam2d);
    let mat = domain.material_id("DefaultMat").unwrap();
    let cs = domain.cross_section_id("DefaultCS").unwrap();

    let a = domain
        .add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::pinned()))
        .unwrap();
    let b = domain
        .add_node(Node::new("b", 4.0, 0.0, 0.0).with_supports(Supports::roller()))
        .unwrap();
    let c = domain
        .add_node(Node::new("c", 9.0, 0.0, 0.0).with_supports(Supports::roller()))
        .unwrap();
    let ab = domain.add_element(Element::new("ab", a, b, mat, cs)).unwrap();
    let bc = domain.add_element(Element::new("bc", b, c, mat, cs)).unwrap();

    domain
        .add_element_load(
            ElementLoad::new("dead", ab, ElementLoadValue::uniform(LoadDirection::Z, 3.0)),
            None,
        )
        .unwrap();
    domain
        .add_element_load(ElementLoad::new("F", bc, ElementLoadValue::point(0.0, 12.0, 2.0)), None)
        .unwrap();

    let live = domain.add_load_case(LoadCase::new("live")).unwrap();
    domain
        .add_nodal_load(NodalLoad::new("M", c, NodalLoadValue::frame(0.0, 0.0, 5.0)), Some(live))
        .unwrap();
    domain
        .add_prescribed_displacement(PrescribedDisplacement::new("sink", b, [0.0, 0.002, 0.0]), Some(live))
        .unwrap();
    domain
}

#[test]
fn test_snapshot_round_trip_gives_same_results() {
    let _ = env_logger::builder().is_test(true).try_init();
    let original = continuous_beam();
    let json = original.snapshot().unwrap().to_json().unwrap();
    let restored = Domain::from_snapshot(&DomainSnapshot::from_json(&json).unwrap()).unwrap();

    assert_eq!(restored.node_count(), original.node_count());
    assert_eq!(restored.element_count(), original.element_count());
    assert_eq!(restored.load_case_count(), original.load_case_count());
    assert_eq!(
        restored.snapshot().unwrap(),
        original.snapshot().unwrap()
    );

    let mut first = LinearStaticSolver::default();
    first.solve(&original).unwrap();
    let mut second = LinearStaticSolver::default();
    second.solve(&restored).unwrap();

    for label in ["Default_loadcase", "live"] {
        let r1 = first
            .displacements(&original, original.load_case_id(label).unwrap())
            .unwrap();
        let r2 = second
            .displacements(&restored, restored.load_case_id(label).unwrap())
            .unwrap();
        assert_eq!(r1, r2);
    }
}

#[test]
fn test_deleting_node_cascades() {
    let mut domain = continuous_beam();
    let c = domain.node_id("c").unwrap();
    let bc = domain.element_id("bc").unwrap();
    assert_eq!(domain.element_loads_on_element(bc, false).len(), 1);
    assert_eq!(domain.nodal_loads_on_node(c, false).len(), 1);

    domain.del_node(c).unwrap();
    assert!(domain.element_id("bc").is_err());
    assert!(domain.loads::<ElementLoad>(false).iter().all(|(_, l)| l.label != "F"));
    assert!(domain.loads::<NodalLoad>(false).is_empty());
    assert_eq!(domain.loads::<PrescribedDisplacement>(false).len(), 1);
    assert_eq!(domain.element_count(), 1);
}

#[test]
fn test_material_in_use() {
    let mut domain = continuous_beam();
    let default = domain.material_id("DefaultMat").unwrap();
    assert!(matches!(
        domain.del_material(default, None),
        Err(FEAError::InUse { .. })
    ));

    let steel = domain
        .add_material(Material::new("steel", 210e9, 81e9, 12e-6, 7850.0))
        .unwrap();
    domain.del_material(default, Some(steel)).unwrap();
    assert!(domain.elements().all(|(_, e)| e.material == steel));
    assert_eq!(domain.elements_with_material(steel).len(), 2);
}

#[test]
fn test_duplicate_labels_are_rejected() {
    let mut domain = continuous_beam();
    assert!(matches!(
        domain.add_node(Node::new("a", 20.0, 0.0, 0.0)),
        Err(FEAError::DuplicateName(_))
    ));
    let a = domain.node_id("a").unwrap();
    let b = domain.node_id("b").unwrap();
    assert_eq!(domain.node_at([4.0005, 0.0, 0.0], 1e-3), Some(b));
    assert!(domain.element_between(b, a).is_some());

    let mat = domain.material_id("DefaultMat").unwrap();
    let cs = domain.cross_section_id("DefaultCS").unwrap();
    assert!(matches!(
        domain.add_element(Element::new("aa", a, a, mat, cs)),
        Err(FEAError::CoincidentNodes(_))
    ));

    // the same load label may live in two different cases
    let live = domain.load_case_id("live").unwrap();
    domain
        .add_nodal_load(NodalLoad::new("H", a, NodalLoadValue::frame(1.0, 0.0, 0.0)), None)
        .unwrap();
    domain
        .add_nodal_load(NodalLoad::new("H", a, NodalLoadValue::frame(2.0, 0.0, 0.0)), Some(live))
        .unwrap();
    assert!(domain
        .add_nodal_load(NodalLoad::new("H", a, NodalLoadValue::frame(3.0, 0.0, 0.0)), Some(live))
        .is_err());
}

#[test]
fn test_moving_load_between_cases() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut domain = continuous_beam();
    let live = domain.load_case_id("live").unwrap();
    let key = domain.load_key::<ElementLoad>("Default_loadcase", "F").unwrap();

    let moved = domain
        .change_load::<ElementLoad, _>(key, Some(live), |l| {
            l.value = ElementLoadValue::point(0.0, 24.0, 2.5);
        })
        .unwrap();
    assert_eq!(moved.case, live);
    assert!(domain.load::<ElementLoad>(key).is_err());
    assert_eq!(
        domain.load::<ElementLoad>(moved).unwrap().value.point_force(),
        Some((2.5, 0.0, 24.0))
    );

    let mut solver = LinearStaticSolver::default();
    solver.solve(&domain).unwrap();
    let bc = domain.element_id("bc").unwrap();
    let shear = solver.element_shear_force(&domain, bc, live).unwrap();
    // the point force splits the shear diagram into a jump of its size
    let jump = shear
        .x
        .windows(2)
        .zip(shear.values.windows(2))
        .find(|(x, _)| x[0] == x[1])
        .map(|(_, v)| v[0] - v[1])
        .unwrap();
    assert_relative_eq!(jump.abs(), 24.0, epsilon = 1e-9);
}

#[test]
fn test_deleting_active_load_case() {
    let mut domain = continuous_beam();
    let default = domain.load_case_id("Default_loadcase").unwrap();
    let live = domain.load_case_id("live").unwrap();

    assert!(matches!(
        domain.del_load_case(default, None, false),
        Err(FEAError::ActiveLoadCase(_))
    ));
    domain.set_active_load_case(live).unwrap();
    assert!(matches!(
        domain.del_load_case(default, None, false),
        Err(FEAError::LoadCaseNotEmpty(_))
    ));

    domain.del_load_case(default, Some(live), false).unwrap();
    assert_eq!(domain.load_case_count(), 1);
    assert_eq!(domain.loads::<ElementLoad>(true).len(), 2);
}

#[test]
fn test_shortening_element_below_point_load_fails() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut domain = Domain::new("cantilever", Formulation::Beam2d);
    let mat = domain.material_id("DefaultMat").unwrap();
    let cs = domain.cross_section_id("DefaultCS").unwrap();
    let a = domain
        .add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::fixed()))
        .unwrap();
    let b = domain.add_node(Node::new("b", 3.0, 0.0, 0.0)).unwrap();
    let e = domain.add_element(Element::new("e", a, b, mat, cs)).unwrap();
    domain
        .add_element_load(ElementLoad::new("F", e, ElementLoadValue::point(0.0, 10.0, 3.0)), None)
        .unwrap();

    let change = NodeChange {
        coords: Some([1.0, 0.0, 0.0]),
        ..Default::default()
    };
    assert!(matches!(domain.change_node(b, &change), Err(FEAError::InvalidInput(_))));
    assert_eq!(domain.node(b).unwrap().coords, [3.0, 0.0, 0.0]);

    // the same edit replayed from a snapshot is rejected too
    let c = domain.add_node(Node::new("c", 1.0, 0.0, 0.0)).unwrap();
    let EntitySnapshot::Element(mut snapshot) = domain.entity_snapshot(EntityRef::Element(e)).unwrap() else {
        panic!("element snapshot expected");
    };
    snapshot.nodes[1] = "c".to_string();
    assert!(domain
        .restore(&EntitySnapshot::Element(snapshot), Some(EntityRef::Element(e)))
        .is_err());
    assert_eq!(domain.element(e).unwrap().nodes, [a, b]);
    assert!(domain.elements_with_node(c).is_empty());

    domain.del_node(c).unwrap();
    let mut solver = LinearStaticSolver::default();
    solver.solve(&domain).unwrap();
    let case = domain.active_load_case().unwrap();
    let reaction = solver.node_reactions(&domain, a, case).unwrap();
    assert_relative_eq!(reaction[1].abs(), 10.0, epsilon = 1e-6);
}

#[test]
fn test_copying_bays_reuses_shared_supports() {
    let mut domain = Domain::new("bays", Formulation::Beam2d);
    let mat = domain.material_id("DefaultMat").unwrap();
    let cs = domain.cross_section_id("DefaultCS").unwrap();
    let a = domain
        .add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::pinned()))
        .unwrap();
    let b = domain
        .add_node(Node::new("b", 4.0, 0.0, 0.0).with_supports(Supports::roller()))
        .unwrap();
    let ab = domain.add_element(Element::new("ab", a, b, mat, cs)).unwrap();

    let copied = domain.copy_elements(&[ab], &[], [4.0, 0.0, 0.0], 2).unwrap();
    assert_eq!(copied.elements.len(), 2);
    assert_eq!(domain.node_count(), 4);
    assert_eq!(domain.bounding_box_dims(), [12.0, 0.0, 0.0]);
    assert_eq!(domain.max_dim(), 12.0);
    // every new support is a roller copied from `b`
    assert!(copied
        .nodes
        .iter()
        .all(|&n| domain.node(n).unwrap().supports == Supports::roller()));

    domain.move_nodes(&copied.nodes, [0.0, 0.0, 1.0]).unwrap();
    assert_eq!(domain.bounding_box_dims(), [12.0, 0.0, 1.0]);
    let removed = domain.del_elements(&copied.elements).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(domain.element_count(), 1);
}
