//! Load types and load cases

mod element_load;
mod load_case;
mod node_load;
mod prescribed;

pub use element_load::{ElementLoad, ElementLoadValue, LoadDirection};
pub use load_case::{LoadCase, LoadKey};
pub use node_load::{NodalLoad, NodalLoadValue};
pub use prescribed::PrescribedDisplacement;
