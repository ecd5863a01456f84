//! DOR Form - in-memory model of a schema-driven object editor
//!
//! The editor page is modelled as a [`RenderTree`]: containers tagged with
//! schema paths and inputs tagged with form names. This crate builds that
//! tree from a schema and document and maps between its nodes and JSON
//! Pointers in both directions.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod index;
pub mod locate;
pub mod render;
pub mod tree;

// Re-export commonly used items
pub use error::{FormError, Result};
pub use index::PointerIndex;
pub use locate::{form_element_for_pointer, pointer_for_render_node};
pub use render::{FormRenderer, RenderedForm};
pub use tree::{NodeId, NodeKind, RenderNode, RenderTree};
