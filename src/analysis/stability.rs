//! Linear buckling analysis
//!
//! The active load case is solved statically first; the element axial
//! forces then build the initial-stress matrix `Ks` and the generalized
//! problem `Kuu x = lambda Ks x` is reduced to a standard symmetric one
//! through the Cholesky factor of `Kuu`.

use nalgebra::linalg::SymmetricEigen;

use super::{AssembledSystem, LinearStaticSolver, SolveReport, SolverOptions, SolverState};
use crate::domain::{Domain, LoadCaseId};
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, Vector};

/// Critical load factors and buckling modes of the active load case
#[derive(Debug, Clone, Default)]
pub struct LinearStabilitySolver {
    pub options: SolverOptions,
    static_solver: LinearStaticSolver,
    state: SolverState,
    revision: Option<u64>,
    load_case: Option<LoadCaseId>,
    eigenvalues: Vec<f64>,
    modes: Vec<Vector>,
    active: usize,
}

impl LinearStabilitySolver {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            static_solver: LinearStaticSolver::new(options.clone()),
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

    /// The static solver holding the pre-buckling state
    pub fn static_solver(&self) -> &LinearStaticSolver {
        &self.static_solver
    }

    /// Load case the buckling analysis was run for
    pub fn load_case(&self) -> Option<LoadCaseId> {
        self.load_case
    }

    pub fn solve(&mut self, domain: &Domain) -> FEAResult<SolveReport> {
        self.clear();
        match self.run(domain) {
            Ok(report) => {
                self.state = SolverState::Solved;
                self.revision = Some(domain.revision());
                if let Some(first) = self.eigenvalues.first() {
                    log::info!("critical load factor of '{}': {first:.6e}", domain.label);
                }
                Ok(report)
            }
            Err(err) => {
                log::error!("stability solve of '{}' failed: {err}", domain.label);
                self.clear();
                self.state = SolverState::Failed;
                Err(err)
            }
        }
    }

    fn clear(&mut self) {
        self.state = SolverState::Unsolved;
        self.revision = None;
        self.load_case = None;
        self.eigenvalues.clear();
        self.modes.clear();
        self.active = 0;
    }

    fn run(&mut self, domain: &Domain) -> FEAResult<SolveReport> {
        self.static_solver.options = self.options.clone();
        let report = self.static_solver.solve(domain)?;
        let case = domain
            .active_load_case()
            .ok_or_else(|| FEAError::IllPosed("no active load case".to_string()))?;
        if report.neq == 0 {
            return Err(FEAError::IllPosed("structure has no free DOFs".to_string()));
        }

        let ks = self.assemble_initial_stress(domain, case)?;
        let kuu = &self
            .static_solver
            .system()
            .ok_or(FEAError::NotSolved)?
            .kuu;
        let (eigenvalues, modes) = self.solve_eigenproblem(kuu, &ks)?;

        let neq = report.neq;
        let total = neq + report.pneq;
        self.modes = modes
            .into_iter()
            .map(|m| Vector::from_fn(total, |i, _| if i < neq { m[i] } else { 0.0 }))
            .collect();
        self.eigenvalues = eigenvalues;
        self.load_case = Some(case);
        Ok(report)
    }

    fn assemble_initial_stress(&self, domain: &Domain, case: LoadCaseId) -> FEAResult<Mat> {
        let solver = &self.static_solver;
        let mut forces = Vec::with_capacity(domain.element_count());
        for (id, _) in domain.elements() {
            let n = solver.element_end_values(domain, id, case)?.average_axial_force();
            forces.push((id, n));
        }

        let min = forces
            .iter()
            .map(|(_, n)| n.abs())
            .filter(|n| *n > self.options.zero_axial_force)
            .fold(f64::INFINITY, f64::min);
        if !min.is_finite() {
            return Err(FEAError::IllPosed(
                "all axial forces are zero, no buckling is possible".to_string(),
            ));
        }

        let (neq, pneq) = (solver.neq(), solver.pneq());
        let mut system = AssembledSystem::zeros(neq, pneq);
        for (id, n) in forces {
            let n = if n.abs() < min { min.copysign(n) } else { n };
            let ks = domain.element_view(id)?.global_initial_stress(n)?;
            system.add(&ks, &solver.codes(domain, id)?, neq);
        }
        log::debug!("assembled initial stress matrix, smallest axial force {min:e}");
        Ok(system.kuu)
    }

    /// Eigenpairs of `K x = lambda Ks x`, sorted by ascending `|lambda|`
    fn solve_eigenproblem(&self, k: &Mat, ks: &Mat) -> FEAResult<(Vec<f64>, Vec<Vector>)> {
        let chol = k
            .clone()
            .cholesky()
            .ok_or_else(|| FEAError::EigenFailed("stiffness matrix is not positive definite".to_string()))?;
        let l = chol.l();

        let y = l
            .solve_lower_triangular(ks)
            .ok_or_else(|| FEAError::EigenFailed("triangular solve failed".to_string()))?;
        let c = l
            .solve_lower_triangular(&y.transpose())
            .ok_or_else(|| FEAError::EigenFailed("triangular solve failed".to_string()))?;
        let c = (&c + c.transpose()) * 0.5;

        let eigen = SymmetricEigen::try_new(c, f64::EPSILON, 0)
            .ok_or_else(|| FEAError::EigenFailed("symmetric eigensolver did not converge".to_string()))?;

        let mut pairs = Vec::with_capacity(eigen.eigenvalues.len());
        for (i, &mu) in eigen.eigenvalues.iter().enumerate() {
            let lambda = if mu.abs() < self.options.eigen_zero_tolerance {
                f64::INFINITY
            } else {
                1.0 / mu
            };
            let x = l
                .tr_solve_lower_triangular(&eigen.eigenvectors.column(i).into_owned())
                .ok_or_else(|| FEAError::EigenFailed("back substitution failed".to_string()))?;
            pairs.push((lambda, normalized(x)));
        }
        pairs.sort_by(|a, b| a.0.abs().total_cmp(&b.0.abs()));

        Ok(pairs.into_iter().unzip())
    }

    fn ensure_current(&self, domain: &Domain) -> FEAResult<()> {
        if self.state == SolverState::Solved && self.revision == Some(domain.revision()) {
            Ok(())
        } else {
            Err(FEAError::NotSolved)
        }
    }

    /// Critical load factors, smallest magnitude first
    pub fn eigenvalues(&self, domain: &Domain) -> FEAResult<&[f64]> {
        self.ensure_current(domain)?;
        Ok(&self.eigenvalues)
    }

    pub fn active_eigenvalue_index(&self) -> usize {
        self.active
    }

    /// Select the mode reported by the `active_*` queries
    pub fn set_active_eigenvalue(&mut self, index: usize) -> FEAResult<()> {
        if index >= self.eigenvalues.len() {
            return Err(FEAError::InvalidInput(format!(
                "eigenvalue index {index} out of range 0..{}",
                self.eigenvalues.len()
            )));
        }
        self.active = index;
        Ok(())
    }

    pub fn active_eigenvalue(&self, domain: &Domain) -> FEAResult<f64> {
        self.eigenvalues(domain)?
            .get(self.active)
            .copied()
            .ok_or(FEAError::NotSolved)
    }

    /// Mode shape `index` in equation order, prescribed DOFs zero, scaled
    /// to a largest component of magnitude one
    pub fn mode_shape(&self, domain: &Domain, index: usize) -> FEAResult<&Vector> {
        self.ensure_current(domain)?;
        self.modes.get(index).ok_or_else(|| {
            FEAError::InvalidInput(format!(
                "eigenvalue index {index} out of range 0..{}",
                self.modes.len()
            ))
        })
    }

    pub fn active_mode_shape(&self, domain: &Domain) -> FEAResult<&Vector> {
        self.mode_shape(domain, self.active)
    }
}

fn normalized(x: Vector) -> Vector {
    let max = x.amax();
    if max > 0.0 {
        // flip so the largest component is positive
        let peak = x.iter().copied().fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
        x / peak
    } else {
        x
    }
}
