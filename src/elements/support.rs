//! Support conditions

use serde::{Deserialize, Serialize};

/// Support flags for the three nodal DOFs, in the order fixed by the
/// domain formulation (`x, z, Y` for plane frames, `z, X, Y` for grids)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supports(pub [bool; 3]);

impl Supports {
    /// No restraints
    pub fn free() -> Self {
        Self([false; 3])
    }

    /// All three DOFs restrained
    pub fn fixed() -> Self {
        Self([true; 3])
    }

    /// Both translations restrained (plane frame pin)
    pub fn pinned() -> Self {
        Self([true, true, false])
    }

    /// Only the second DOF restrained (plane frame roller on a horizontal surface)
    pub fn roller() -> Self {
        Self([false, true, false])
    }

    /// Only the first DOF restrained (grid column support)
    pub fn grid_pin() -> Self {
        Self([true, false, false])
    }

    pub fn new(first: bool, second: bool, third: bool) -> Self {
        Self([first, second, third])
    }

    /// Whether DOF `dof` is restrained; out-of-range indices are free
    pub fn is_restrained(&self, dof: usize) -> bool {
        self.0.get(dof).copied().unwrap_or(false)
    }

    /// Number of restrained DOFs
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&s| s).count()
    }
}
