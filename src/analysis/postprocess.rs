//! Element end values and internal-force diagrams

use super::LinearStaticSolver;
use crate::domain::{Domain, ElementId, LoadCaseId};
use crate::elements::{ElementKind, ElementView};
use crate::error::{FEAError, FEAResult};
use crate::loads::ElementLoadValue;
use crate::results::{Deflection, Diagram, EndValues};

/// Point force in local components at distance `a` from the start node
#[derive(Debug, Clone, Copy)]
struct PointForce {
    a: f64,
    fx: f64,
    fz: f64,
}

impl PointForce {
    /// Whether the force acts left of a station at `x`; `right` selects
    /// the right-hand limit at the force itself
    fn passed(&self, x: f64, right: bool) -> bool {
        x > self.a || (right && x == self.a)
    }
}

#[derive(Debug, Clone, Copy)]
struct Station {
    x: f64,
    right: bool,
}

/// Solved state of one plane-frame element
struct BeamState<'a> {
    view: ElementView<'a>,
    end: EndValues,
    /// Summed uniform intensity along and across the element axis
    fxloc: f64,
    fzloc: f64,
    forces: Vec<PointForce>,
}

impl BeamState<'_> {
    fn stations(&self, nseg: usize, split: bool) -> (Vec<Station>, Vec<bool>) {
        let l = self.view.length;
        let mut stations: Vec<Station> = (0..=nseg)
            .map(|i| Station {
                x: l * i as f64 / nseg as f64,
                right: false,
            })
            .collect();

        let inner: Vec<f64> = self
            .forces
            .iter()
            .map(|p| p.a)
            .filter(|&a| a > 0.0 && a < l)
            .collect();
        for &a in &inner {
            stations.retain(|s| s.x != a);
            stations.push(Station { x: a, right: false });
            if split {
                stations.push(Station { x: a, right: true });
            }
        }
        stations.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.right.cmp(&q.right)));

        let last = stations.len() - 1;
        let labels = stations
            .iter()
            .enumerate()
            .map(|(i, s)| i == 0 || i == last || inner.contains(&s.x))
            .collect();
        (stations, labels)
    }

    fn diagram<F>(&self, nseg: usize, split: bool, value: F) -> Diagram
    where
        F: Fn(&Station) -> f64,
    {
        let (stations, labels) = self.stations(nseg, split);
        Diagram {
            x: stations.iter().map(|s| s.x).collect(),
            values: stations.iter().map(value).collect(),
            labels,
        }
    }
}

impl LinearStaticSolver {
    /// Local end forces and displacements of `element` in `case`
    pub fn element_end_values(&self, domain: &Domain, element: ElementId, case: LoadCaseId) -> FEAResult<EndValues> {
        let view = domain.element_view(element)?;
        let r = self.element_displacements(domain, element, case)?;
        let loads = domain.element_load_values(case, element)?;
        view.end_values(&r, &loads)
    }

    fn beam_state<'d>(&self, domain: &'d Domain, element: ElementId, case: LoadCaseId) -> FEAResult<BeamState<'d>> {
        self.ensure_current(domain)?;
        let view = domain.element_view(element)?;
        if view.kind() == ElementKind::BeamGrid2d {
            return Err(FEAError::NotSupported(format!(
                "internal-force diagrams of grid element '{}'",
                view.element.label
            )));
        }

        let loads = domain.element_load_values(case, element)?;
        let end = self.element_end_values(domain, element, case)?;
        let (c, s) = (view.c, view.s);
        let (mut fxloc, mut fzloc) = (0.0, 0.0);
        let mut forces = Vec::new();
        for load in &loads {
            let (vx, vz) = load.uniform_components(c, s);
            fxloc += c * vx + s * vz;
            fzloc += -s * vx + c * vz;
            if let ElementLoadValue::Force { fx, fz, distance } = *load {
                forces.push(PointForce {
                    a: distance,
                    fx: c * fx + s * fz,
                    fz: -s * fx + c * fz,
                });
            }
        }

        Ok(BeamState {
            view,
            end,
            fxloc,
            fzloc,
            forces,
        })
    }

    /// Local deflection of `element` sampled at `diagram_segments + 1`
    /// evenly spaced points: end-displacement interpolation plus the
    /// clamped-beam response to the element loads
    pub fn element_deflection(&self, domain: &Domain, element: ElementId, case: LoadCaseId) -> FEAResult<Deflection> {
        let state = self.beam_state(domain, element, case)?;
        let nseg = self.options.diagram_segments.max(1);
        let l = state.view.length;
        let ei = state.view.material.e * state.view.section.iy;
        let ea = state.view.material.e * state.view.section.a;
        let rl = state.end.displacements;

        let mut out = Deflection::default();
        for station in state.stations(nseg, false).0 {
            let x = station.x;
            let xi = x / l;
            let (xi2, xi3) = (xi * xi, xi * xi * xi);

            let mut w = (1.0 - 3.0 * xi2 + 2.0 * xi3) * rl[1]
                + l * (-xi + 2.0 * xi2 - xi3) * rl[2]
                + (3.0 * xi2 - 2.0 * xi3) * rl[4]
                + l * (xi2 - xi3) * rl[5];
            let mut u = (1.0 - xi) * rl[0] + xi * rl[3];

            w += state.fzloc * l.powi(4) * (xi2 * xi2 / 24.0 - xi3 / 12.0 + xi2 / 24.0) / ei;
            u += state.fxloc * x * (l - x) / (2.0 * ea);

            for p in &state.forces {
                let (a, b) = (p.a, l - p.a);
                let za = b / l * (a * (a - b) / (l * l) - 1.0) * p.fz;
                let ma = a * b * b / (l * l) * p.fz;
                let jump = if x > a { p.fz * (x - a).powi(3) / 6.0 } else { 0.0 };
                w += (za * x.powi(3) / 6.0 + ma * x * x / 2.0 + jump) / ei;
                u += if x < a {
                    b / l * p.fx * x / ea
                } else {
                    b / l * p.fx * a / ea - a / l * p.fx * (x - a) / ea
                };
            }

            out.x.push(x);
            out.u.push(u);
            out.w.push(w);
        }
        Ok(out)
    }

    /// Bending moment along `element`, with a breakpoint at every point force
    pub fn element_moment(&self, domain: &Domain, element: ElementId, case: LoadCaseId) -> FEAResult<Diagram> {
        let state = self.beam_state(domain, element, case)?;
        let f = state.end.forces;
        Ok(state.diagram(self.options.diagram_segments.max(1), false, |st| {
            let x = st.x;
            let mut m = 0.5 * state.fzloc * x * x + f[1] * x + f[2];
            for p in state.forces.iter().filter(|p| p.passed(x, st.right)) {
                m += p.fz * (x - p.a);
            }
            m
        }))
    }

    /// Shear force along `element`, sampled on both sides of every point force
    pub fn element_shear_force(&self, domain: &Domain, element: ElementId, case: LoadCaseId) -> FEAResult<Diagram> {
        let state = self.beam_state(domain, element, case)?;
        let f = state.end.forces;
        Ok(state.diagram(self.options.diagram_segments.max(1), true, |st| {
            let mut v = -f[1] - state.fzloc * st.x;
            for p in state.forces.iter().filter(|p| p.passed(st.x, st.right)) {
                v -= p.fz;
            }
            v
        }))
    }

    /// Normal force along `element`, tension positive
    pub fn element_normal_force(&self, domain: &Domain, element: ElementId, case: LoadCaseId) -> FEAResult<Diagram> {
        let state = self.beam_state(domain, element, case)?;
        let f = state.end.forces;
        Ok(state.diagram(self.options.diagram_segments.max(1), true, |st| {
            let mut n = -f[0] - state.fxloc * st.x;
            for p in state.forces.iter().filter(|p| p.passed(st.x, st.right)) {
                n -= p.fx;
            }
            n
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Formulation, SolverOptions};
    use crate::domain::NodeId;
    use crate::elements::{Element, Node, Supports};
    use crate::loads::{ElementLoad, LoadDirection};
    use approx::assert_relative_eq;

    fn simply_supported(load: ElementLoadValue) -> (Domain, ElementId, LoadCaseId) {
        let mut d = Domain::new("ss", Formulation::Beam2d);
        let a = d
            .add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::pinned()))
            .unwrap();
        let b = d
            .add_node(Node::new("b", 4.0, 0.0, 0.0).with_supports(Supports::roller()))
            .unwrap();
        let mat = d.material_id("DefaultMat").unwrap();
        let cs = d.cross_section_id("DefaultCS").unwrap();
        let e = d.add_element(Element::new("e", a, b, mat, cs)).unwrap();
        d.add_element_load(ElementLoad::new("q", e, load), None).unwrap();
        let case = d.active_load_case().unwrap();
        (d, e, case)
    }

    fn solved(d: &Domain, segments: usize) -> LinearStaticSolver {
        let mut solver = LinearStaticSolver::new(SolverOptions::default().with_segments(segments));
        solver.solve(d).unwrap();
        solver
    }

    #[test]
    fn test_uniform_load_diagrams() {
        let (d, e, case) = simply_supported(ElementLoadValue::uniform(LoadDirection::Z, 10.0));
        let solver = solved(&d, 4);

        let v = solver.element_shear_force(&d, e, case).unwrap();
        assert_eq!(v.len(), 5);
        assert_relative_eq!(v.values[0], 20.0, epsilon = 1e-6);
        assert_relative_eq!(v.values[4], -20.0, epsilon = 1e-6);
        assert_eq!(v.labels, vec![true, false, false, false, true]);

        let m = solver.element_moment(&d, e, case).unwrap();
        assert_relative_eq!(m.values[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(m.values[2], -20.0, epsilon = 1e-6);

        let n = solver.element_normal_force(&d, e, case).unwrap();
        assert!(n.values.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_point_force_splits_shear() {
        let (d, e, case) = simply_supported(ElementLoadValue::point(0.0, 8.0, 1.0));
        let solver = solved(&d, 4);

        let v = solver.element_shear_force(&d, e, case).unwrap();
        // the regular sample at x = 1 is replaced by a left and right limit
        assert_eq!(v.len(), 6);
        assert_eq!(v.x[1], 1.0);
        assert_eq!(v.x[2], 1.0);
        assert_relative_eq!(v.values[1], 6.0, epsilon = 1e-6);
        assert_relative_eq!(v.values[2], -2.0, epsilon = 1e-6);
        assert!(v.labels[1] && v.labels[2]);

        let m = solver.element_moment(&d, e, case).unwrap();
        assert_eq!(m.len(), 5);
        assert_relative_eq!(m.extreme().unwrap().abs(), 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_deflection_matches_end_values() {
        let (d, e, case) = simply_supported(ElementLoadValue::uniform(LoadDirection::Z, 10.0));
        let solver = solved(&d, 10);
        let defl = solver.element_deflection(&d, e, case).unwrap();
        assert_eq!(defl.x.len(), 11);
        assert_relative_eq!(defl.w[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(defl.w[10], 0.0, epsilon = 1e-12);

        let view = d.element_view(e).unwrap();
        let ei = view.material.e * view.section.iy;
        assert_relative_eq!(defl.w[5], 5.0 * 10.0 * 4.0_f64.powi(4) / (384.0 * ei), max_relative = 1e-6);
    }

    #[test]
    fn test_deflection_has_vertex_under_point_force() {
        let (d, e, case) = simply_supported(ElementLoadValue::point(0.0, 8.0, 1.3));
        let solver = solved(&d, 4);
        let defl = solver.element_deflection(&d, e, case).unwrap();
        assert_eq!(defl.x, vec![0.0, 1.0, 1.3, 2.0, 3.0, 4.0]);

        let view = d.element_view(e).unwrap();
        let ei = view.material.e * view.section.iy;
        let (a, b) = (1.3, 2.7);
        assert_relative_eq!(defl.w[2], 8.0 * a * a * b * b / (3.0 * ei * 4.0), max_relative = 1e-4);
    }

    #[test]
    fn test_grid_diagrams_not_supported() {
        let mut d = Domain::new("grid", Formulation::Grid2d);
        let a = d
            .add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::fixed()))
            .unwrap();
        let b: NodeId = d.add_node(Node::new("b", 0.0, 3.0, 0.0)).unwrap();
        let mat = d.material_id("DefaultMat").unwrap();
        let cs = d.cross_section_id("DefaultCS").unwrap();
        let e = d.add_element(Element::new("e", a, b, mat, cs)).unwrap();
        let case = d.active_load_case().unwrap();

        let solver = solved(&d, 4);
        assert!(solver.element_end_values(&d, e, case).is_ok());
        assert!(matches!(
            solver.element_moment(&d, e, case),
            Err(FEAError::NotSupported(_))
        ));
    }
}
