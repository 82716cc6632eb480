//! Linear static solver
//!
//! Equations are numbered free DOFs first, then supported DOFs, both in
//! node registry order. The stiffness matrix is kept in three blocks
//! (`Kuu`, `Kup`, `Kpp`) and every load case is solved at once as one
//! column of the right-hand side.

use std::collections::HashMap;

use super::{Formulation, SolverOptions, SolverState};
use crate::domain::{Domain, ElementId, Handle, LoadCaseId, NodeId};
use crate::error::{FEAError, FEAResult};
use crate::math::{self, Mat, Vec6, Vector};

/// Global stiffness matrix split by free (`u`) and prescribed (`p`) DOFs
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    pub kuu: Mat,
    pub kup: Mat,
    pub kpp: Mat,
}

impl AssembledSystem {
    pub(crate) fn zeros(neq: usize, pneq: usize) -> Self {
        Self {
            kuu: Mat::zeros(neq, neq),
            kup: Mat::zeros(neq, pneq),
            kpp: Mat::zeros(pneq, pneq),
        }
    }

    /// Scatter-add an element matrix given its six code numbers
    pub(crate) fn add(&mut self, k: &math::Mat6, codes: &[usize; 6], neq: usize) {
        for (i, &gi) in codes.iter().enumerate() {
            for (j, &gj) in codes.iter().enumerate() {
                match (gi < neq, gj < neq) {
                    (true, true) => self.kuu[(gi, gj)] += k[(i, j)],
                    (true, false) => self.kup[(gi, gj - neq)] += k[(i, j)],
                    (false, false) => self.kpp[(gi - neq, gj - neq)] += k[(i, j)],
                    // lower-left block is the transpose of kup
                    (false, true) => {}
                }
            }
        }
    }
}

/// Non-fatal findings of a solve
#[derive(Debug, Clone, PartialEq)]
pub enum SolverWarning {
    /// Displacements above the configured limit, usually a missing support
    HugeDisplacement { max: f64, nodes: Vec<String> },
    /// Two distinct nodes closer than the coincidence tolerance
    CoincidentNodes { first: String, second: String },
}

/// Summary of a successful solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Number of free equations
    pub neq: usize,
    /// Number of prescribed equations
    pub pneq: usize,
    /// Number of load cases solved
    pub load_cases: usize,
    pub warnings: Vec<SolverWarning>,
}

#[derive(Debug, Clone)]
struct CaseResult {
    /// Displacements, free part first
    r: Vector,
    /// Applied loads on free rows, reactions on prescribed rows
    f: Vector,
}

/// Linear static solver for plane frames and grids
#[derive(Debug, Clone, Default)]
pub struct LinearStaticSolver {
    pub options: SolverOptions,
    state: SolverState,
    revision: Option<u64>,
    formulation: Formulation,
    neq: usize,
    pneq: usize,
    locations: HashMap<NodeId, [usize; 3]>,
    /// Owner node and local DOF of every equation
    equations: Vec<(NodeId, usize)>,
    system: Option<AssembledSystem>,
    results: HashMap<LoadCaseId, CaseResult>,
}

impl LinearStaticSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn is_solved(&self) -> bool {
        self.state == SolverState::Solved
    }

    /// Number of free equations
    pub fn neq(&self) -> usize {
        self.neq
    }

    /// Number of prescribed equations
    pub fn pneq(&self) -> usize {
        self.pneq
    }

    /// Equation numbers of the three DOFs of `node`
    pub fn location(&self, node: NodeId) -> Option<[usize; 3]> {
        self.locations.get(&node).copied()
    }

    /// Assembled stiffness blocks of the last successful assembly
    pub fn system(&self) -> Option<&AssembledSystem> {
        self.system.as_ref()
    }

    /// Solve every load case of `domain`
    pub fn solve(&mut self, domain: &Domain) -> FEAResult<SolveReport> {
        self.clear();
        match self.run(domain) {
            Ok(report) => {
                self.state = SolverState::Solved;
                self.revision = Some(domain.revision());
                log::info!(
                    "solved {} load case(s) of '{}' with {} free equations",
                    report.load_cases,
                    domain.label,
                    report.neq
                );
                Ok(report)
            }
            Err(err) => {
                log::error!("static solve of '{}' failed: {err}", domain.label);
                self.clear();
                self.state = SolverState::Failed;
                Err(err)
            }
        }
    }

    fn clear(&mut self) {
        self.state = SolverState::Unsolved;
        self.revision = None;
        self.neq = 0;
        self.pneq = 0;
        self.locations.clear();
        self.equations.clear();
        self.system = None;
        self.results.clear();
    }

    fn run(&mut self, domain: &Domain) -> FEAResult<SolveReport> {
        self.number_equations(domain);
        self.state = SolverState::Numbered;
        log::info!("numbered {} free and {} prescribed equations", self.neq, self.pneq);

        let system = self.assemble_stiffness(domain)?;
        self.check_diagonal(domain, &system.kuu)?;
        self.state = SolverState::Assembled;

        let cases: Vec<LoadCaseId> = domain.load_cases().map(|(id, _)| id).collect();
        let (fu, fp_loads, rp) = self.assemble_load_vectors(domain, &cases)?;

        let rhs = &fu - &system.kup * &rp;
        let ru = if self.neq == 0 || cases.is_empty() {
            Mat::zeros(self.neq, cases.len())
        } else {
            math::solve_linear_system(&system.kuu, &rhs).ok_or(FEAError::SingularMatrix)?
        };

        // reactions, less the loads applied directly on the supports
        let fp = system.kup.transpose() * &ru + &system.kpp * &rp - fp_loads;

        for (col, case) in cases.iter().enumerate() {
            let r = Vector::from_iterator(
                self.neq + self.pneq,
                ru.column(col).iter().chain(rp.column(col).iter()).copied(),
            );
            let f = Vector::from_iterator(
                self.neq + self.pneq,
                fu.column(col).iter().chain(fp.column(col).iter()).copied(),
            );
            self.results.insert(*case, CaseResult { r, f });
        }

        let mut warnings = self.check_coincident_nodes(domain);
        warnings.extend(self.check_displacements(domain));
        self.system = Some(system);

        Ok(SolveReport {
            neq: self.neq,
            pneq: self.pneq,
            load_cases: cases.len(),
            warnings,
        })
    }

    /// Assign equation numbers: free DOFs `0..neq`, supported DOFs
    /// `neq..neq + pneq`
    fn number_equations(&mut self, domain: &Domain) {
        self.formulation = domain.formulation();
        let restrained: usize = domain.nodes().map(|(_, n)| n.supports.count()).sum();
        self.pneq = restrained;
        self.neq = 3 * domain.node_count() - restrained;

        let (mut free, mut fixed) = (0, self.neq);
        self.equations = vec![(NodeId::from_index(0), 0); self.neq + self.pneq];
        for (id, node) in domain.nodes() {
            let mut loc = [0; 3];
            for (dof, code) in loc.iter_mut().enumerate() {
                if node.has_prescribed_bc(dof) {
                    *code = fixed;
                    fixed += 1;
                } else {
                    *code = free;
                    free += 1;
                }
                self.equations[*code] = (id, dof);
            }
            self.locations.insert(id, loc);
        }
    }

    pub(crate) fn codes(&self, domain: &Domain, element: ElementId) -> FEAResult<[usize; 6]> {
        let [start, end] = domain.element(element)?.nodes;
        let (a, b) = (self.node_location(start)?, self.node_location(end)?);
        Ok([a[0], a[1], a[2], b[0], b[1], b[2]])
    }

    fn node_location(&self, node: NodeId) -> FEAResult<[usize; 3]> {
        self.locations.get(&node).copied().ok_or(FEAError::NotSolved)
    }

    fn assemble_stiffness(&self, domain: &Domain) -> FEAResult<AssembledSystem> {
        let mut system = AssembledSystem::zeros(self.neq, self.pneq);
        for (id, _) in domain.elements() {
            let k = domain.element_view(id)?.global_stiffness()?;
            system.add(&k, &self.codes(domain, id)?, self.neq);
        }
        log::debug!("assembled {} elements", domain.element_count());
        Ok(system)
    }

    fn check_diagonal(&self, domain: &Domain, kuu: &Mat) -> FEAResult<()> {
        for i in 0..self.neq {
            if kuu[(i, i)] < self.options.zero_diagonal_tolerance {
                let (node, dof) = self.equations[i];
                return Err(FEAError::ZeroStiffnessDiagonal {
                    node: domain.node(node)?.label.clone(),
                    dof: self.formulation.dof_names()[dof].to_string(),
                });
            }
        }
        Ok(())
    }

    /// Load vectors of every case, one column per case: loads on free rows,
    /// loads landing on prescribed rows, prescribed displacements
    fn assemble_load_vectors(&self, domain: &Domain, cases: &[LoadCaseId]) -> FEAResult<(Mat, Mat, Mat)> {
        let (neq, pneq) = (self.neq, self.pneq);
        let mut fu = Mat::zeros(neq, cases.len());
        let mut fp = Mat::zeros(pneq, cases.len());
        let mut rp = Mat::zeros(pneq, cases.len());

        let mut scatter = |col: usize, code: usize, value: f64| {
            if code < neq {
                fu[(code, col)] += value;
            } else {
                fp[(code - neq, col)] += value;
            }
        };

        for (col, &case) in cases.iter().enumerate() {
            let lc = domain.load_case(case)?;
            for (_, load) in lc.nodal_loads() {
                let loc = self.node_location(load.node)?;
                let values = load.value.components(self.formulation);
                for (code, value) in loc.into_iter().zip(values) {
                    scatter(col, code, value);
                }
            }

            for (_, load) in lc.element_loads() {
                let f = domain.element_view(load.element)?.equivalent_nodal_load(&load.value)?;
                for (code, value) in self.codes(domain, load.element)?.into_iter().zip(f.iter()) {
                    scatter(col, code, *value);
                }
            }

            for (_, load) in lc.prescribed_displacements() {
                let loc = self.node_location(load.node)?;
                for (dof, (&code, &value)) in loc.iter().zip(&load.value).enumerate() {
                    if code >= neq {
                        rp[(code - neq, col)] = value;
                    } else if value != 0.0 {
                        log::warn!(
                            "prescribed displacement '{}' on unsupported DOF {} ignored",
                            load.label,
                            self.formulation.dof_names()[dof]
                        );
                    }
                }
            }
        }

        Ok((fu, fp, rp))
    }

    fn check_coincident_nodes(&self, domain: &Domain) -> Vec<SolverWarning> {
        let tol = self.options.coincident_node_tolerance;
        let nodes: Vec<_> = domain.nodes().map(|(_, n)| n).collect();
        let mut warnings = Vec::new();
        for (i, first) in nodes.iter().enumerate() {
            for second in &nodes[i + 1..] {
                if first.distance_to(second) < tol {
                    log::warn!("nodes '{}' and '{}' coincide", first.label, second.label);
                    warnings.push(SolverWarning::CoincidentNodes {
                        first: first.label.clone(),
                        second: second.label.clone(),
                    });
                }
            }
        }
        warnings
    }

    fn check_displacements(&self, domain: &Domain) -> Vec<SolverWarning> {
        let limit = self.options.huge_displacement;
        let mut max = 0.0_f64;
        let mut nodes: Vec<String> = Vec::new();
        for (id, node) in domain.nodes() {
            let Some(loc) = self.locations.get(&id) else {
                continue;
            };
            let peak = self
                .results
                .values()
                .flat_map(|res| loc.iter().map(move |&code| res.r[code].abs()))
                .fold(0.0_f64, f64::max);
            max = max.max(peak);
            if peak > limit {
                nodes.push(node.label.clone());
            }
        }

        if nodes.is_empty() {
            return Vec::new();
        }
        log::warn!(
            "displacement {max:e} exceeds {limit:e} at nodes [{}], check supports",
            nodes.join(", ")
        );
        vec![SolverWarning::HugeDisplacement { max, nodes }]
    }

    /// Fail with `NotSolved` unless the last solve succeeded on the current
    /// revision of `domain`
    pub(crate) fn ensure_current(&self, domain: &Domain) -> FEAResult<()> {
        if self.state == SolverState::Solved && self.revision == Some(domain.revision()) {
            Ok(())
        } else {
            Err(FEAError::NotSolved)
        }
    }

    fn case_result(&self, domain: &Domain, case: LoadCaseId) -> FEAResult<&CaseResult> {
        self.ensure_current(domain)?;
        self.results
            .get(&case)
            .ok_or(FEAError::InvalidHandle("Load case"))
    }

    /// Full displacement vector of `case` in equation order
    pub fn displacements(&self, domain: &Domain, case: LoadCaseId) -> FEAResult<&Vector> {
        Ok(&self.case_result(domain, case)?.r)
    }

    /// Full force vector of `case`: applied loads on free equations,
    /// reactions on prescribed ones
    pub fn forces(&self, domain: &Domain, case: LoadCaseId) -> FEAResult<&Vector> {
        Ok(&self.case_result(domain, case)?.f)
    }

    pub fn node_displacement(&self, domain: &Domain, node: NodeId, case: LoadCaseId) -> FEAResult<[f64; 3]> {
        let r = &self.case_result(domain, case)?.r;
        Ok(self.node_location(node)?.map(|code| r[code]))
    }

    /// Support reactions at `node`; zero on free DOFs
    pub fn node_reactions(&self, domain: &Domain, node: NodeId, case: LoadCaseId) -> FEAResult<[f64; 3]> {
        let f = &self.case_result(domain, case)?.f;
        let neq = self.neq;
        Ok(self
            .node_location(node)?
            .map(|code| if code >= neq { f[code] } else { 0.0 }))
    }

    /// `"<node>_<dof>"` name of every equation
    pub fn dof_names(&self, domain: &Domain) -> FEAResult<Vec<String>> {
        let names = self.formulation.dof_names();
        self.equations
            .iter()
            .map(|&(node, dof)| Ok(format!("{}_{}", domain.node(node)?.label, names[dof])))
            .collect()
    }

    /// Global displacements of the six DOFs of `element`
    pub(crate) fn element_displacements(
        &self,
        domain: &Domain,
        element: ElementId,
        case: LoadCaseId,
    ) -> FEAResult<Vec6> {
        let r = &self.case_result(domain, case)?.r;
        let codes = self.codes(domain, element)?;
        Ok(Vec6::from_iterator(codes.iter().map(|&c| r[c])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, Node, Supports};
    use crate::loads::{NodalLoad, NodalLoadValue};
    use approx::assert_relative_eq;

    fn cantilever() -> (Domain, NodeId, NodeId) {
        let mut d = Domain::new("cantilever", Formulation::Beam2d);
        let a = d
            .add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::fixed()))
            .unwrap();
        let b = d.add_node(Node::new("b", 5.0, 0.0, 0.0)).unwrap();
        let mat = d.material_id("DefaultMat").unwrap();
        let cs = d.cross_section_id("DefaultCS").unwrap();
        d.add_element(Element::new("e", a, b, mat, cs)).unwrap();
        d.add_nodal_load(NodalLoad::new("P", b, NodalLoadValue::frame(0.0, -1000.0, 0.0)), None)
            .unwrap();
        (d, a, b)
    }

    #[test]
    fn test_numbering_free_first() {
        let (d, a, b) = cantilever();
        let mut solver = LinearStaticSolver::default();
        solver.solve(&d).unwrap();
        assert_eq!(solver.neq(), 3);
        assert_eq!(solver.pneq(), 3);
        assert_eq!(solver.location(a), Some([3, 4, 5]));
        assert_eq!(solver.location(b), Some([0, 1, 2]));
        assert_eq!(solver.dof_names(&d).unwrap()[0], "b_x");
    }

    #[test]
    fn test_reaction_balances_load() {
        let (d, a, _) = cantilever();
        let case = d.active_load_case().unwrap();
        let mut solver = LinearStaticSolver::default();
        solver.solve(&d).unwrap();
        let reactions = solver.node_reactions(&d, a, case).unwrap();
        assert_relative_eq!(reactions[1], 1000.0, epsilon = 1e-6);
        // moment of the tip load about the support is balanced
        assert_relative_eq!(reactions[2], -5000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_coincident_nodes_warn() {
        let (mut d, _, _) = cantilever();
        d.add_node(Node::new("ghost", 5.0, 0.0, 0.0005).with_supports(Supports::fixed()))
            .unwrap();
        let mut solver = LinearStaticSolver::default();
        let report = solver.solve(&d).unwrap();
        assert_eq!(
            report.warnings,
            vec![SolverWarning::CoincidentNodes {
                first: "b".to_string(),
                second: "ghost".to_string()
            }]
        );
        assert!(solver.is_solved());
    }

    #[test]
    fn test_stale_after_mutation() {
        let (mut d, _, b) = cantilever();
        let case = d.active_load_case().unwrap();
        let mut solver = LinearStaticSolver::default();
        solver.solve(&d).unwrap();
        assert!(solver.node_displacement(&d, b, case).is_ok());

        d.add_node(Node::new("c", 9.0, 0.0, 0.0).with_supports(Supports::fixed()))
            .unwrap();
        assert!(matches!(
            solver.node_displacement(&d, b, case),
            Err(FEAError::NotSolved)
        ));
    }

    #[test]
    fn test_missing_support_reports_node() {
        let (mut d, _, _) = cantilever();
        d.add_node(Node::new("loose", 9.0, 0.0, 0.0)).unwrap();
        let mut solver = LinearStaticSolver::default();
        let err = solver.solve(&d).unwrap_err();
        match err {
            FEAError::ZeroStiffnessDiagonal { node, .. } => assert_eq!(node, "loose"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(solver.state(), SolverState::Failed);
        assert!(solver.system().is_none());
    }
}
