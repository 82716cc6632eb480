//! Plane-frame (x-z) Timoshenko beam matrices
//!
//! Local DOF order is `[u1, w1, phi1, u2, w2, phi2]`, with `z` and `w` pointing
//! down and `phi = -dw/dx`.

use super::{block_transformation, Mat2, Mat6, Vec6};
use nalgebra::Matrix3;

/// Kept/condensed DOF sets for the hinge combination, `None` when unhinged
pub fn hinge_sets(start: bool, end: bool) -> Option<(&'static [usize], &'static [usize])> {
    match (start, end) {
        (true, true) => Some((&[0, 1, 3, 4], &[2, 5])),
        (true, false) => Some((&[0, 1, 3, 4, 5], &[2])),
        (false, true) => Some((&[0, 1, 2, 3, 4], &[5])),
        (false, false) => None,
    }
}

/// Shear deformation parameter `12 E Iy / (kappa G A L^2)`
pub fn shear_parameter(e: f64, g: f64, a: f64, iy: f64, kappa: f64, length: f64) -> f64 {
    12.0 * e * iy / (kappa * g * a * length * length)
}

/// Local elastic stiffness matrix with shear deformation
pub fn local_stiffness(e: f64, g: f64, a: f64, iy: f64, kappa: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;
    let phi = shear_parameter(e, g, a, iy, kappa, l);
    let eiy = e * iy / (1.0 + phi);
    let ea_l = e * a / l;

    #[rustfmt::skip]
    let data = [
        ea_l,   0.0,               0.0,                    -ea_l,  0.0,               0.0,
        0.0,    12.0*eiy/l3,       -6.0*eiy/l2,            0.0,    -12.0*eiy/l3,      -6.0*eiy/l2,
        0.0,    -6.0*eiy/l2,       (4.0+phi)*eiy/l,        0.0,    6.0*eiy/l2,        (2.0-phi)*eiy/l,
        -ea_l,  0.0,               0.0,                    ea_l,   0.0,               0.0,
        0.0,    -12.0*eiy/l3,      6.0*eiy/l2,             0.0,    12.0*eiy/l3,       6.0*eiy/l2,
        0.0,    -6.0*eiy/l2,       (2.0-phi)*eiy/l,        0.0,    6.0*eiy/l2,        (4.0+phi)*eiy/l,
    ];

    Mat6::from_row_slice(&data)
}

/// Local initial-stress (geometric) stiffness for axial force `n`,
/// compression positive
pub fn initial_stress(e: f64, g: f64, a: f64, iy: f64, kappa: f64, length: f64, n: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let phi = shear_parameter(e, g, a, iy, kappa, l);
    let phi2 = phi * phi;

    let shear = 6.0 / 5.0 + 2.0 * phi + phi2;
    let diag = 2.0 * l2 / 15.0 + l2 * phi / 6.0 + l2 * phi2 / 12.0;
    let off = -l2 / 30.0 - l2 * phi / 6.0 - l2 * phi2 / 12.0;

    #[rustfmt::skip]
    let data = [
        0.0,  0.0,       0.0,       0.0,  0.0,       0.0,
        0.0,  shear,     -l/10.0,   0.0,  -shear,    -l/10.0,
        0.0,  -l/10.0,   diag,      0.0,  l/10.0,    off,
        0.0,  0.0,       0.0,       0.0,  0.0,       0.0,
        0.0,  -shear,    l/10.0,    0.0,  shear,     l/10.0,
        0.0,  -l/10.0,   off,       0.0,  l/10.0,    diag,
    ];

    let mut ks = Mat6::from_row_slice(&data) * (n / l / (1.0 + phi).powi(2));

    // keep the axial block regular; sign follows the bending terms
    let cc = ks[(1, 1)].abs().min(ks[(2, 2)].abs()) / 1000.0 * n.signum();
    ks[(0, 0)] = cc;
    ks[(0, 3)] = -cc;
    ks[(3, 0)] = -cc;
    ks[(3, 3)] = cc;
    ks
}

/// In-plane rotation `[[c, s], [-s, c]]` taking global (x, z) to local
pub fn rotation(c: f64, s: f64) -> Mat2 {
    Mat2::new(c, s, -s, c)
}

/// Global-to-local transformation for both nodes
pub fn transformation(c: f64, s: f64) -> Mat6 {
    block_transformation(&Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0))
}

/// Clamped-clamped end forces of a uniform load with local components
/// `(px, pz)` per unit length
pub fn fixed_end_uniform(length: f64, px: f64, pz: f64) -> Vec6 {
    let l = length;
    Vec6::new(
        -0.5 * l * px,
        -0.5 * l * pz,
        pz * l * l / 12.0,
        -0.5 * l * px,
        -0.5 * l * pz,
        -pz * l * l / 12.0,
    )
}

/// Clamped-clamped end forces of a point force with local components
/// `(fx, fz)` at distance `a` from the start node
pub fn fixed_end_point(length: f64, a: f64, fx: f64, fz: f64) -> Vec6 {
    let l = length;
    let l2 = l * l;
    let b = l - a;
    Vec6::new(
        -b / l * fx,
        b / l * (a * (a - b) / l2 - 1.0) * fz,
        a * b * b / l2 * fz,
        -a / l * fx,
        a / l * (b * (b - a) / l2 - 1.0) * fz,
        -a * a * b / l2 * fz,
    )
}

/// Clamped-clamped end forces of a temperature change: uniform part `dtc`
/// and through-depth gradient `dtg` over section height `h`
pub fn fixed_end_thermal(e: f64, a: f64, iy: f64, h: f64, alpha: f64, dtc: f64, dtg: f64) -> Vec6 {
    let axial = e * a * alpha * dtc;
    let bending = e * iy * alpha * dtg / h;
    Vec6::new(axial, 0.0, bending, -axial, 0.0, -bending)
}
