//! Structural elements module

mod element;
mod material;
mod node;
mod section;
mod support;

pub use element::{Element, ElementChange, ElementKind, ElementView, Hinges};
pub use material::{Material, MaterialChange};
pub use node::{Node, NodeChange};
pub(crate) use node::distance;
pub use section::{CrossSection, CrossSectionChange};
pub use support::Supports;
