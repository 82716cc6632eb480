//! Mathematical utilities for element matrices, condensation and assembly

pub mod beam2d;
pub mod grid;

use nalgebra::{DMatrix, DVector, Matrix2, Matrix6, Vector6};

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;
pub type Mat2 = Matrix2<f64>;

/// 6x6 matrix for two-node element stiffness
pub type Mat6 = Matrix6<f64>;
/// 6-element vector for element end forces/displacements
pub type Vec6 = Vector6<f64>;

/// Partition of the six element DOFs into kept (`a`) and condensed (`b`)
/// sets, with the stiffness blocks needed to eliminate `b`. DOFs in neither
/// set contribute no stiffness.
#[derive(Debug, Clone)]
pub struct Condensation {
    /// Kept DOF indices
    pub a: Vec<usize>,
    /// Condensed DOF indices
    pub b: Vec<usize>,
    pub kaa: Mat,
    pub kab: Mat,
    pub kbb: Mat,
    kbb_inv: Mat,
}

impl Condensation {
    /// Partition `k`; returns `None` when the condensed block is singular
    pub fn new(k: &Mat6, a: &[usize], b: &[usize]) -> Option<Self> {
        let kaa = Mat::from_fn(a.len(), a.len(), |i, j| k[(a[i], a[j])]);
        let kab = Mat::from_fn(a.len(), b.len(), |i, j| k[(a[i], b[j])]);
        let kbb = Mat::from_fn(b.len(), b.len(), |i, j| k[(b[i], b[j])]);
        let kbb_inv = kbb.clone().try_inverse()?;

        Some(Self {
            a: a.to_vec(),
            b: b.to_vec(),
            kaa,
            kab,
            kbb,
            kbb_inv,
        })
    }

    /// Inverse of the condensed block
    pub fn kbb_inv(&self) -> &Mat {
        &self.kbb_inv
    }

    /// Condensed stiffness `Kaa - Kab Kbb^-1 Kab^T` written back into 6x6
    /// with zero rows and columns for the condensed DOFs
    pub fn stiffness(&self) -> Mat6 {
        let reduced = &self.kaa - &self.kab * &self.kbb_inv * self.kab.transpose();
        self.scatter(&reduced)
    }

    /// Condensed fixed-end vector: `f[a] - Kab Kbb^-1 f[b]`, zero on `b`
    pub fn load(&self, f: &Vec6) -> Vec6 {
        let fa = self.gather(f, &self.a);
        let fb = self.gather(f, &self.b);
        let reduced = fa - &self.kab * &self.kbb_inv * fb;

        let mut ret = Vec6::zeros();
        for (i, &ai) in self.a.iter().enumerate() {
            ret[ai] = reduced[i];
        }
        ret
    }

    /// Expansion matrix mapping kept DOFs to all six:
    /// identity on `a`, `-Kbb^-1 Kab^T` on `b`
    pub fn expansion(&self) -> Mat {
        let na = self.a.len();
        let mut tc = Mat::zeros(6, na);
        for (i, &ai) in self.a.iter().enumerate() {
            tc[(ai, i)] = 1.0;
        }
        let lower = -(&self.kbb_inv * self.kab.transpose());
        for (i, &bi) in self.b.iter().enumerate() {
            for j in 0..na {
                tc[(bi, j)] = lower[(i, j)];
            }
        }
        tc
    }

    /// Project a 6x6 matrix onto the kept DOFs (`Tc^T M Tc`)
    pub fn project(&self, m: &Mat6) -> Mat6 {
        let tc = self.expansion();
        let full = Mat::from_fn(6, 6, |i, j| m[(i, j)]);
        let reduced = tc.transpose() * full * &tc;
        self.scatter(&reduced)
    }

    /// Recover condensed end displacements and correct kept end forces for
    /// a fixed-end vector `bl`
    pub fn recover(&self, re: &mut Vec6, fe: &mut Vec6, bl: &Vec6) {
        let re_a = self.gather(re, &self.a);
        let bl_a = self.gather(bl, &self.a);
        let bl_b = self.gather(bl, &self.b);

        let re_b = &self.kbb_inv * (-&bl_b - self.kab.transpose() * re_a);
        for (i, &bi) in self.b.iter().enumerate() {
            re[bi] = re_b[i];
        }

        let correction = bl_a - &self.kab * &self.kbb_inv * bl_b;
        for (i, &ai) in self.a.iter().enumerate() {
            fe[ai] += correction[i];
        }
    }

    fn gather(&self, v: &Vec6, idx: &[usize]) -> Vector {
        Vector::from_iterator(idx.len(), idx.iter().map(|&i| v[i]))
    }

    fn scatter(&self, reduced: &Mat) -> Mat6 {
        let mut full = Mat6::zeros();
        for (i, &ai) in self.a.iter().enumerate() {
            for (j, &aj) in self.a.iter().enumerate() {
                full[(ai, aj)] = reduced[(i, j)];
            }
        }
        full
    }
}

/// Block-diagonal 6x6 transformation built from a 3x3 nodal rotation
pub fn block_transformation(r: &nalgebra::Matrix3<f64>) -> Mat6 {
    let mut t = Mat6::zeros();
    for node in 0..2 {
        let offset = node * 3;
        for row in 0..3 {
            for col in 0..3 {
                t[(offset + row, offset + col)] = r[(row, col)];
            }
        }
    }
    t
}

/// Largest asymmetry `|m_ij - m_ji|` of a square matrix
pub fn max_asymmetry(m: &Mat) -> f64 {
    let mut worst = 0.0_f64;
    for i in 0..m.nrows() {
        for j in (i + 1)..m.ncols() {
            worst = worst.max((m[(i, j)] - m[(j, i)]).abs());
        }
    }
    worst
}

/// Solve `A X = B` for a matrix right-hand side using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Mat) -> Option<Mat> {
    a.clone().lu().solve(b)
}
