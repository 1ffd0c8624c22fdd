//! # Weft Engine
//!
//! The binding engine: scans a host tree for prefixed directive
//! attributes, compiles them into a live [`Section`], and keeps the tree
//! in sync with the data graph through path bindings.
//!
//! The pipeline:
//!
//! 1. [`scan`] walks the tree and yields hooks — one per directive
//!    attribute, highest priority first on each element — through a
//!    shared stream so nested compilers consume exactly the hooks inside
//!    their subtree.
//! 2. [`parse`] turns hooks into directive instances plus one
//!    [`binding::PathBinding`] each, collected into a [`Section`].
//! 3. Directives react to resolved values: leaf directives mutate their
//!    element, block directives (`if`, `each-*`) own nested sections and
//!    stamp, toggle, or reconcile them.
//!
//! [`Weft`] ties it together and is the entry point for host code.

pub mod binding;
pub mod config;
pub mod directives;
pub mod error;
pub mod filters;
pub mod parse;
pub mod scan;
pub mod section;
pub mod weft;

pub use config::{Config, DirectiveSet};
pub use directives::Directive;
pub use error::{EngineError, EngineResult};
pub use filters::FilterSet;
pub use parse::Details;
pub use section::Section;
pub use weft::Weft;


#[cfg(test)]
mod tests_each;


#[cfg(test)]
mod tests_lifecycle;
