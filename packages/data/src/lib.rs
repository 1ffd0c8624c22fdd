//! # Weft Data
//!
//! The application data graph and its reactive access layer.
//!
//! Three pieces live here:
//!
//! - [`Value`] — a dynamically typed value graph. Lists, objects, and
//!   functions are shared handles and compare by identity; scalars compare
//!   by value. This equality is what the engine's list reconciler uses to
//!   decide whether a rendered item can be reused.
//! - [`DataView`] — a chain of lookup scopes over the graph. The root view
//!   answers every key from the underlying data; a scoped view intercepts
//!   one introduced name (a loop variable, say) and forwards everything
//!   else to its parent, without mutating the graph.
//! - [`Watch`] — the change-notification registry. Mutations flow through
//!   [`Watch::set`] (or [`Watch::touch`] after an in-place mutation), and
//!   subscribed callbacks fire synchronously.

pub mod value;
pub mod view;
pub mod watch;

pub use value::{FuncRef, ListRef, ObjectRef, Value};
pub use view::{scope, DataRef, DataView, Root, Scoped};
pub use watch::{SubId, Watch};


#[cfg(test)]
mod tests_watch;
