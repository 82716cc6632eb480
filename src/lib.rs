//! Frame FEA - a finite element engine for plane frames and grids
//!
//! This library provides linear analysis of two-dimensional beam structures:
//! - Plane frames in the x-z plane with Timoshenko beam elements
//! - Grids in the x-y plane loaded out of plane (bending and torsion)
//! - End hinges through static condensation
//! - Nodal loads, element loads (uniform, point force, temperature) and
//!   prescribed support displacements, grouped in load cases
//! - Linear static analysis of every load case at once
//! - Linear buckling analysis (critical load factors and mode shapes)
//!
//! ## Example
//! ```rust
//! use frame_fea::prelude::*;
//!
//! let mut domain = Domain::new("cantilever", Formulation::Beam2d);
//! let mat = domain.material_id("DefaultMat").unwrap();
//! let cs = domain.cross_section_id("DefaultCS").unwrap();
//!
//! // Nodes and a single element
//! let a = domain.add_node(Node::new("a", 0.0, 0.0, 0.0).with_supports(Supports::fixed())).unwrap();
//! let b = domain.add_node(Node::new("b", 5.0, 0.0, 0.0)).unwrap();
//! domain.add_element(Element::new("e1", a, b, mat, cs)).unwrap();
//!
//! // Tip load in the active load case
//! domain.add_nodal_load(NodalLoad::new("P", b, NodalLoadValue::frame(0.0, -1000.0, 0.0)), None).unwrap();
//!
//! // Analyze
//! let mut solver = LinearStaticSolver::default();
//! solver.solve(&domain).unwrap();
//!
//! // Get results
//! let case = domain.active_load_case().unwrap();
//! let tip = solver.node_displacement(&domain, b, case).unwrap();
//! let reaction = solver.node_reactions(&domain, a, case).unwrap();
//! assert!(tip[1] < 0.0);
//! assert!((reaction[1] - 1000.0).abs() < 1e-6);
//! ```

pub mod analysis;
pub mod domain;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        Formulation, LinearStabilitySolver, LinearStaticSolver, SolveReport, SolverOptions, SolverState,
        SolverWarning,
    };
    pub use crate::domain::{
        CaseLoad, CopiedEntities, CrossSectionId, Domain, DomainSnapshot, ElementId, EntityRef, EntitySnapshot,
        LoadCaseChange, LoadCaseId, MaterialId, NodeId,
    };
    pub use crate::elements::{
        CrossSection, CrossSectionChange, Element, ElementChange, ElementKind, Hinges, Material, MaterialChange,
        Node, NodeChange, Supports,
    };
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::loads::{
        ElementLoad, ElementLoadValue, LoadCase, LoadDirection, LoadKey, NodalLoad, NodalLoadValue,
        PrescribedDisplacement,
    };
    pub use crate::results::{Deflection, Diagram, EndValues};
}
