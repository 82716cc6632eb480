//! Benchmarks for the static and stability solvers

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frame_fea::prelude::*;

fn create_cantilever_model() -> Domain {
    let mut domain = Domain::new("cantilever", Formulation::Beam2d);
    let mat = domain
        .add_material(Material::new("Steel", 210e9, 81e9, 12e-6, 7850.0))
        .unwrap();
    let cs = domain
        .add_cross_section(CrossSection::rectangular("Section", 0.3, 0.5))
        .unwrap();

    let n1 = domain
        .add_node(Node::new("N1", 0.0, 0.0, 0.0).with_supports(Supports::fixed()))
        .unwrap();
    let n2 = domain.add_node(Node::new("N2", 10.0, 0.0, 0.0)).unwrap();

    domain.add_element(Element::new("M1", n1, n2, mat, cs)).unwrap();
    domain
        .add_nodal_load(NodalLoad::new("P", n2, NodalLoadValue::frame(0.0, 10000.0, 0.0)), None)
        .unwrap();

    domain
}

fn create_multi_story_frame(stories: usize, bays: usize) -> Domain {
    let mut domain = Domain::new("frame", Formulation::Beam2d);

    let steel = domain
        .add_material(Material::new("Steel", 210e9, 81e9, 12e-6, 7850.0))
        .unwrap();
    let column = domain
        .add_cross_section(CrossSection::rectangular("Column", 0.4, 0.4))
        .unwrap();
    let beam = domain
        .add_cross_section(CrossSection::rectangular("Beam", 0.3, 0.6))
        .unwrap();

    let story_height = 3.5;
    let bay_width = 6.0;

    // Create nodes, z points down so stories go to negative z
    let mut nodes = vec![vec![]; stories + 1];
    for (story, row) in nodes.iter_mut().enumerate() {
        for bay in 0..=bays {
            let supports = if story == 0 { Supports::fixed() } else { Supports::free() };
            let node = Node::new(
                &format!("N{story}_{bay}"),
                bay as f64 * bay_width,
                0.0,
                -(story as f64) * story_height,
            );
            row.push(domain.add_node(node.with_supports(supports)).unwrap());
        }
    }

    // Create columns
    for story in 0..stories {
        for bay in 0..=bays {
            let element = Element::new(
                &format!("Col{story}_{bay}"),
                nodes[story][bay],
                nodes[story + 1][bay],
                steel,
                column,
            );
            domain.add_element(element).unwrap();
        }
    }

    // Create beams with a uniform gravity load
    for story in 1..=stories {
        for bay in 0..bays {
            let id = domain
                .add_element(Element::new(
                    &format!("Beam{story}_{bay}"),
                    nodes[story][bay],
                    nodes[story][bay + 1],
                    steel,
                    beam,
                ))
                .unwrap();
            let load = ElementLoadValue::uniform(LoadDirection::Z, 20000.0);
            domain
                .add_element_load(ElementLoad::new(&format!("q{story}_{bay}"), id, load), None)
                .unwrap();
        }
    }

    domain
}

fn benchmark_cantilever(c: &mut Criterion) {
    let domain = create_cantilever_model();
    c.bench_function("cantilever_linear", |b| {
        b.iter(|| {
            let mut solver = LinearStaticSolver::default();
            solver.solve(black_box(&domain)).unwrap();
            black_box(&solver);
        })
    });
}

fn benchmark_small_frame(c: &mut Criterion) {
    let domain = create_multi_story_frame(3, 2);
    c.bench_function("frame_3story_2bay_linear", |b| {
        b.iter(|| {
            let mut solver = LinearStaticSolver::default();
            solver.solve(black_box(&domain)).unwrap();
            black_box(&solver);
        })
    });
}

fn benchmark_medium_frame(c: &mut Criterion) {
    let domain = create_multi_story_frame(10, 5);
    c.bench_function("frame_10story_5bay_linear", |b| {
        b.iter(|| {
            let mut solver = LinearStaticSolver::default();
            solver.solve(black_box(&domain)).unwrap();
            black_box(&solver);
        })
    });
}

fn benchmark_buckling(c: &mut Criterion) {
    let domain = create_multi_story_frame(5, 3);
    c.bench_function("frame_5story_3bay_buckling", |b| {
        b.iter(|| {
            let mut solver = LinearStabilitySolver::default();
            solver.solve(black_box(&domain)).unwrap();
            black_box(&solver);
        })
    });
}

criterion_group!(
    benches,
    benchmark_cantilever,
    benchmark_small_frame,
    benchmark_medium_frame,
    benchmark_buckling,
);

criterion_main!(benches);
