//! The built-in directive catalog.
//!
//! A directive is a named behavior bound to a prefixed attribute. Its
//! constructor receives the element and a [`crate::parse::Details`]
//! context; the compiler then re-invokes [`Directive::execute`] with the
//! freshly resolved expression value on every observed change.

use std::rc::Rc;

use weft_data::Value;
use weft_dom::Node;

use crate::config::DirectiveSet;
use crate::error::EngineResult;
use crate::parse::Details;

mod basic;
mod conditional;
mod each;
mod input;

pub use basic::{AttrDirective, ClassDirective, OnDirective, TextDirective};
pub use conditional::IfDirective;
pub use each::EachDirective;
pub use input::ValueDirective;

/// A live directive instance.
pub trait Directive {
    /// Reacts to a freshly resolved value. Failures here are structural
    /// (a template that no longer compiles) and are logged by the caller.
    fn execute(&mut self, value: Value) -> EngineResult<()>;

    /// Runs once after every sibling directive in the section exists.
    fn initialize(&mut self) {}

    fn connect(&mut self) {}

    fn disconnect(&mut self) {}
}

pub type Builder = Rc<dyn Fn(&Node, Details) -> EngineResult<Box<dyn Directive>>>;

/// A closure-backed directive with no lifecycle hooks, for host code and
/// tests that just want to observe resolved values.
pub struct SimpleDirective {
    elem: Node,
    f: Rc<dyn Fn(&Node, &Value)>,
}

impl SimpleDirective {
    pub fn new(elem: Node, f: Rc<dyn Fn(&Node, &Value)>) -> Self {
        SimpleDirective { elem, f }
    }
}

impl Directive for SimpleDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        (self.f)(&self.elem, &value);
        Ok(())
    }
}

/// Registers the default catalog. Priorities put block directives ahead
/// of everything else on the same element: `each-*` wins over `if`,
/// which wins over `value` and the zero-priority leaf directives.
pub fn register_defaults(set: &mut DirectiveSet) {
    set.register("text", 0, |elem, _details| {
        Ok(Box::new(TextDirective::new(elem.clone())))
    });

    set.register("attr-*", 0, |elem, details| {
        Ok(Box::new(AttrDirective::new(elem.clone(), details.param)))
    });

    set.register("class-*", 0, |elem, details| {
        Ok(Box::new(ClassDirective::new(elem.clone(), details.param)))
    });

    set.register("on-*", 0, |elem, details| {
        Ok(Box::new(OnDirective::new(elem.clone(), &details.param)))
    });

    set.register("value", 100, |elem, details| {
        Ok(Box::new(ValueDirective::new(elem.clone(), details)))
    });

    set.register("if", 200, |elem, details| {
        Ok(Box::new(IfDirective::new(elem.clone(), &details)?))
    });

    set.register("each-*", 300, |elem, details| {
        Ok(Box::new(EachDirective::new(elem.clone(), &details)?))
    });
}
