//! Grid (x-y plane, out-of-plane loading) beam matrices
//!
//! Local DOF order is `[w1, rx1, ry1, w2, rx2, ry2]`: transverse
//! displacement, torsional rotation and bending rotation at each end.

use super::{block_transformation, Mat6, Vec6};
use nalgebra::Matrix3;

/// Kept/condensed DOF sets for the hinge combination, `None` when unhinged.
///
/// A hinge releases both rotations at its end. With hinges at both ends the
/// torsional DOFs are dropped (outside both sets) instead of condensed, since
/// an element free to twist at both ends carries no torque.
pub fn hinge_sets(start: bool, end: bool) -> Option<(&'static [usize], &'static [usize])> {
    match (start, end) {
        (true, true) => Some((&[0, 3], &[2, 5])),
        (true, false) => Some((&[0, 3, 4, 5], &[1, 2])),
        (false, true) => Some((&[0, 1, 2, 3], &[4, 5])),
        (false, false) => None,
    }
}

/// Local stiffness: Euler-Bernoulli bending plus St. Venant torsion
pub fn local_stiffness(e: f64, g: f64, iy: f64, j: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;
    let eiy = e * iy;
    let gj_l = g * j / l;

    #[rustfmt::skip]
    let data = [
        12.0*eiy/l3,   0.0,    -6.0*eiy/l2,  -12.0*eiy/l3,  0.0,    -6.0*eiy/l2,
        0.0,           gj_l,   0.0,          0.0,           -gj_l,  0.0,
        -6.0*eiy/l2,   0.0,    4.0*eiy/l,    6.0*eiy/l2,    0.0,    2.0*eiy/l,
        -12.0*eiy/l3,  0.0,    6.0*eiy/l2,   12.0*eiy/l3,   0.0,    6.0*eiy/l2,
        0.0,           -gj_l,  0.0,          0.0,           gj_l,   0.0,
        -6.0*eiy/l2,   0.0,    2.0*eiy/l,    6.0*eiy/l2,    0.0,    4.0*eiy/l,
    ];

    Mat6::from_row_slice(&data)
}

/// Global-to-local transformation; `w` is invariant, rotations turn in plane
pub fn transformation(c: f64, s: f64) -> Mat6 {
    block_transformation(&Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c))
}

/// Clamped-clamped end forces of a transverse uniform load `pz`
pub fn fixed_end_uniform(length: f64, pz: f64) -> Vec6 {
    let l = length;
    Vec6::new(
        -0.5 * l * pz,
        0.0,
        pz * l * l / 12.0,
        -0.5 * l * pz,
        0.0,
        -pz * l * l / 12.0,
    )
}

/// Clamped-clamped end forces of a transverse point force `fz` at distance `a`
pub fn fixed_end_point(length: f64, a: f64, fz: f64) -> Vec6 {
    let l = length;
    let l2 = l * l;
    let b = l - a;
    Vec6::new(
        b / l * (a * (a - b) / l2 - 1.0) * fz,
        0.0,
        a * b * b / l2 * fz,
        a / l * (b * (b - a) / l2 - 1.0) * fz,
        0.0,
        -a * a * b / l2 * fz,
    )
}
