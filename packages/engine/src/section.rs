use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;
use weft_dom::Node;

use crate::binding::PathBinding;
use crate::directives::Directive;

pub type DirectiveHandle = Rc<RefCell<Box<dyn Directive>>>;

/// A compiled, live region of the tree: the root element plus the
/// bindings and directive instances compiled beneath it.
///
/// Lifecycle: constructed → `connect` ⇄ `disconnect` → `destroy`.
/// Connect and disconnect are symmetric and repeatable; destroy is
/// terminal, and using a destroyed section is a programmer error that
/// panics rather than operating on released state.
pub struct Section {
    pub root: Node,
    pub(crate) bindings: Vec<PathBinding>,
    pub(crate) directives: Vec<DirectiveHandle>,
    destroyed: bool,
}

impl Section {
    pub(crate) fn new(root: Node) -> Section {
        Section {
            root,
            bindings: Vec::new(),
            directives: Vec::new(),
            destroyed: false,
        }
    }

    /// Post-construction hook, run once after every sibling directive in
    /// the section exists.
    pub(crate) fn initialize(&mut self) {
        for directive in &self.directives {
            directive.borrow_mut().initialize();
        }
    }

    /// Connects every binding (firing each once for the eager initial
    /// render) and then every directive, in registration order.
    pub fn connect(&mut self) {
        assert!(!self.destroyed, "section connected after destroy");
        for binding in &self.bindings {
            binding.connect();
            binding.trigger();
        }
        for directive in &self.directives {
            match directive.try_borrow_mut() {
                Ok(mut directive) => directive.connect(),
                Err(_) => warn!("skipped connect of a directive already executing"),
            }
        }
    }

    /// Tears down every observation and notifies directives; the subtree
    /// stays in the tree. Idempotent.
    pub fn disconnect(&mut self) {
        if self.destroyed {
            return;
        }
        for binding in &self.bindings {
            binding.disconnect();
        }
        for directive in &self.directives {
            match directive.try_borrow_mut() {
                Ok(mut directive) => directive.disconnect(),
                Err(_) => warn!("skipped disconnect of a directive already executing"),
            }
        }
    }

    /// Disconnects, removes the root from the tree, and releases the
    /// compiled collections. Destroying twice panics.
    pub fn destroy(&mut self) {
        assert!(!self.destroyed, "section destroyed twice");
        self.disconnect();
        // Already-detached roots (a clone-replace victim) are fine.
        self.root.detach();
        self.bindings = Vec::new();
        self.directives = Vec::new();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
