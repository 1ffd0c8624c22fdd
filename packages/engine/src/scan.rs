use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use weft_dom::{Attribute, Node};

use crate::config::Config;
use crate::error::EngineResult;

/// A discovered attachment point.
///
/// An element whose tag name itself carries the directive prefix is
/// reported once as a `Component` hook with its full matching-attribute
/// list; any other element is reported one `Directive` hook per matching
/// attribute, in priority order.
#[derive(Clone)]
pub enum Hook {
    Directive { elem: Node, attr: Attribute },
    Component { elem: Node, attrs: Vec<Attribute> },
}

impl Hook {
    pub fn elem(&self) -> &Node {
        match self {
            Hook::Directive { elem, .. } => elem,
            Hook::Component { elem, .. } => elem,
        }
    }
}

/// Pre-order element walk starting at `start`, bounded by `root`: when
/// the sibling search climbs out of an element, it stops as soon as an
/// ancestor falls outside the root.
pub struct DeepWalk {
    root: Node,
    next: Option<Node>,
}

impl DeepWalk {
    /// Walks `root` and everything beneath it.
    pub fn new(root: &Node) -> Self {
        DeepWalk {
            root: root.clone(),
            next: Some(root.clone()),
        }
    }

    /// Walks only the elements beneath `root`.
    pub fn descendants(root: &Node) -> Self {
        DeepWalk {
            root: root.clone(),
            next: root.first_element_child(),
        }
    }

    fn find_next(&self, elem: &Node) -> Option<Node> {
        if let Some(child) = elem.first_element_child() {
            return Some(child);
        }
        let mut current = elem.clone();
        loop {
            // The bounding root's own siblings are out of scope.
            if current.ptr_eq(&self.root) {
                return None;
            }
            if let Some(sibling) = current.next_element_sibling() {
                return Some(sibling);
            }
            let parent = current.parent()?;
            if !self.root.contains(&parent) {
                return None;
            }
            current = parent;
        }
    }
}

impl Iterator for DeepWalk {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let current = self.next.take()?;
        self.next = self.find_next(&current);
        Some(current)
    }
}

/// A peekable stream of hooks. `peek` is stable until `advance` consumes
/// the current hook.
pub trait Hooks {
    fn peek(&mut self) -> Option<Hook>;
    fn advance(&mut self);
}

enum Pending {
    /// Pull the next element from the walk.
    Exhausted,
    /// The current element is a component hook, not yet consumed.
    Component(Node),
    /// Remaining directive attributes on the current element.
    Attrs(Node, VecDeque<Attribute>),
}

/// Enumerates hooks over an element walk.
///
/// The first element of the walk can be given a fixed attribute list: a
/// cloneable template compiles its clones against the attribute set that
/// was captured with it, never against a fresh scan of the clone root.
pub struct HookStream {
    config: Rc<Config>,
    elems: Box<dyn Iterator<Item = Node>>,
    pending: Pending,
}

impl HookStream {
    /// A stream that scans every element the walk yields.
    pub fn scan(config: Rc<Config>, elems: impl Iterator<Item = Node> + 'static) -> Self {
        HookStream {
            config,
            elems: Box::new(elems),
            pending: Pending::Exhausted,
        }
    }

    /// A single-element stream over `root` with a caller-supplied
    /// attribute list.
    pub fn with_attrs(config: Rc<Config>, root: &Node, attrs: Vec<Attribute>) -> Self {
        HookStream {
            config,
            elems: Box::new(std::iter::empty()),
            pending: Pending::Attrs(root.clone(), attrs.into()),
        }
    }
}

impl Hooks for HookStream {
    fn peek(&mut self) -> Option<Hook> {
        loop {
            match &self.pending {
                Pending::Component(elem) => {
                    return Some(Hook::Component {
                        elem: elem.clone(),
                        attrs: self.config.matching_attrs(elem),
                    });
                }
                Pending::Attrs(elem, attrs) if !attrs.is_empty() => {
                    return Some(Hook::Directive {
                        elem: elem.clone(),
                        attr: attrs[0].clone(),
                    });
                }
                _ => {
                    let elem = self.elems.next()?;
                    let tag = elem.tag().unwrap_or_default();
                    self.pending = if self.config.is_prefixed(&tag) {
                        Pending::Component(elem)
                    } else {
                        let attrs = self.config.matching_attrs(&elem);
                        // Elements with no matching attributes are skipped
                        // silently on the next loop pass.
                        Pending::Attrs(elem, attrs.into())
                    };
                }
            }
        }
    }

    fn advance(&mut self) {
        match &mut self.pending {
            Pending::Component(_) => self.pending = Pending::Exhausted,
            Pending::Attrs(_, attrs) => {
                attrs.pop_front();
            }
            Pending::Exhausted => {}
        }
    }
}

/// Joins two hook streams, exhausting the first before the second.
pub struct Join {
    first: Box<dyn Hooks>,
    second: Box<dyn Hooks>,
}

impl Join {
    pub fn new(first: impl Hooks + 'static, second: impl Hooks + 'static) -> Self {
        Join {
            first: Box::new(first),
            second: Box::new(second),
        }
    }
}

impl Hooks for Join {
    fn peek(&mut self) -> Option<Hook> {
        self.first.peek().or_else(|| self.second.peek())
    }

    fn advance(&mut self) {
        if self.first.peek().is_some() {
            self.first.advance();
        } else {
            self.second.advance();
        }
    }
}

/// Reads hooks from a shared stream, bounded to a root element.
///
/// Readers over the same stream share consumption: a nested reader drains
/// the hooks inside its element, and the outer reader resumes after them.
/// Enumeration stops — without consuming — as soon as the current hook's
/// element falls outside this reader's root.
#[derive(Clone)]
pub struct Reader {
    hooks: Rc<RefCell<Box<dyn Hooks>>>,
    pub root: Node,
}

impl Reader {
    /// A full scan: the root's live attributes plus a scan of its
    /// descendants.
    pub fn scan(config: &Rc<Config>, root: &Node) -> Reader {
        let attrs = config.matching_attrs(root);
        Reader::exact(config, root, attrs)
    }

    /// An exact scan: a fixed attribute list for the root plus a scan of
    /// its descendants.
    pub fn exact(config: &Rc<Config>, root: &Node, attrs: Vec<Attribute>) -> Reader {
        let join = Join::new(
            HookStream::with_attrs(config.clone(), root, attrs),
            HookStream::scan(config.clone(), DeepWalk::descendants(root)),
        );
        Reader {
            hooks: Rc::new(RefCell::new(Box::new(join))),
            root: root.clone(),
        }
    }

    /// Re-bounds the same stream at an inner element.
    pub fn nested(&self, elem: &Node) -> Reader {
        Reader {
            hooks: self.hooks.clone(),
            root: elem.clone(),
        }
    }

    /// Visits each hook within the root in order. The visit callback may
    /// itself consume from the shared stream through a nested reader.
    pub fn each(
        &self,
        visit: &mut dyn FnMut(Hook) -> EngineResult<()>,
    ) -> EngineResult<()> {
        loop {
            // Hold the borrow only across the peek: the callback may
            // re-enter this stream via a nested reader.
            let hook = self.hooks.borrow_mut().peek();
            let Some(hook) = hook else {
                return Ok(());
            };
            if !self.root.contains(hook.elem()) {
                // Out of bounds for this reader; leave the hook for an
                // outer one.
                return Ok(());
            }
            self.hooks.borrow_mut().advance();
            visit(hook)?;
        }
    }
}
