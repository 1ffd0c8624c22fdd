//! # Weft DOM
//!
//! A minimal in-memory document tree used as the rendering target for the
//! weft binding engine.
//!
//! Every tree mutation the engine performs (insert-before, replace-child,
//! detach, node swaps) goes through this crate, so the binding and
//! reconciliation algorithms never depend on a real host document and can
//! be tested against plain node handles.

pub mod node;

pub use node::{Attribute, Node, NodeKind};
