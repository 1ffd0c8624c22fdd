use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A single element attribute. Order within an element is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

type Listener = Rc<dyn Fn(&Node)>;

/// The payload of a node: an element with a tag, attributes and event
/// listeners, a text run, or a comment.
pub enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<Attribute>,
        listeners: Vec<(String, Listener)>,
    },
    Text(String),
    Comment(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Option<Weak<RefCell<NodeData>>>,
    children: Vec<Node>,
}

/// A cheaply cloneable handle to a tree node.
///
/// Cloning a `Node` clones the handle, not the node; use [`Node::deep_clone`]
/// to copy a subtree. Two handles point at the same node when
/// [`Node::ptr_eq`] holds.
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<NodeData>>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            inner: Rc::new(RefCell::new(NodeData {
                kind,
                parent: None,
                children: Vec::new(),
            })),
        }
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Node::new(NodeKind::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            listeners: Vec::new(),
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Node::new(NodeKind::Text(content.into()))
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Node::new(NodeKind::Comment(content.into()))
    }

    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(self, child: Node) -> Self {
        self.append_child(&child);
        self
    }

    /// Identity comparison: do both handles refer to the same node?
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.inner.borrow().kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.inner.borrow().kind, NodeKind::Text(_))
    }

    /// The tag name, for element nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.inner.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Node { inner })
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    /// Reflexive containment: true when `other` is this node or a
    /// descendant of it.
    pub fn contains(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if self.ptr_eq(&node) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn set_parent(&self, parent: Option<&Node>) {
        self.inner.borrow_mut().parent = parent.map(|p| Rc::downgrade(&p.inner));
    }

    fn child_index(&self, child: &Node) -> Option<usize> {
        self.inner
            .borrow()
            .children
            .iter()
            .position(|c| c.ptr_eq(child))
    }

    /// Removes this node from its parent, if attached. A no-op on a
    /// detached node.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            if let Some(index) = parent.child_index(self) {
                parent.inner.borrow_mut().children.remove(index);
            }
            self.set_parent(None);
        }
    }

    /// Appends `child` as the last child of this node, detaching it from
    /// any previous parent first.
    pub fn append_child(&self, child: &Node) {
        child.detach();
        child.set_parent(Some(self));
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Inserts `new` into this node's children immediately before
    /// `reference`. Falls back to appending when `reference` is not a
    /// child of this node.
    pub fn insert_before(&self, new: &Node, reference: &Node) {
        new.detach();
        match self.child_index(reference) {
            Some(index) => {
                new.set_parent(Some(self));
                self.inner.borrow_mut().children.insert(index, new.clone());
            }
            None => self.append_child(new),
        }
    }

    /// Replaces the child `old` with `new`, detaching `old`. A no-op when
    /// `old` is not a child of this node.
    pub fn replace_child(&self, new: &Node, old: &Node) {
        let Some(index) = self.child_index(old) else {
            return;
        };
        new.detach();
        old.set_parent(None);
        new.set_parent(Some(self));
        self.inner.borrow_mut().children[index] = new.clone();
    }

    /// Copies this node and its entire subtree. Attributes and text are
    /// copied; event listeners and the parent link are not.
    pub fn deep_clone(&self) -> Node {
        let kind = match &self.inner.borrow().kind {
            NodeKind::Element { tag, attrs, .. } => NodeKind::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                listeners: Vec::new(),
            },
            NodeKind::Text(content) => NodeKind::Text(content.clone()),
            NodeKind::Comment(content) => NodeKind::Comment(content.clone()),
        };
        let clone = Node::new(kind);
        for child in self.children() {
            clone.append_child(&child.deep_clone());
        }
        clone
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        match &self.inner.borrow().kind {
            NodeKind::Element { attrs, .. } => attrs.clone(),
            _ => Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.inner.borrow().kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.clone()),
            _ => None,
        }
    }

    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let NodeKind::Element { attrs, .. } = &mut self.inner.borrow_mut().kind {
            match attrs.iter_mut().find(|attr| attr.name == name) {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute { name, value }),
            }
        }
    }

    pub fn remove_attr(&self, name: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.inner.borrow_mut().kind {
            attrs.retain(|attr| attr.name != name);
        }
    }

    /// Replaces this node's children with a single text node.
    pub fn set_text(&self, content: impl Into<String>) {
        for child in self.children() {
            child.detach();
        }
        self.append_child(&Node::text(content));
    }

    /// For text nodes, rewrites the content in place.
    pub fn set_text_content(&self, content: impl Into<String>) {
        if let NodeKind::Text(existing) = &mut self.inner.borrow_mut().kind {
            *existing = content.into();
        }
    }

    /// Concatenated text of this node and all descendants, in document
    /// order. Comments contribute nothing.
    pub fn text_content(&self) -> String {
        match &self.inner.borrow().kind {
            NodeKind::Text(content) => content.clone(),
            NodeKind::Comment(_) => String::new(),
            NodeKind::Element { .. } => self
                .children()
                .iter()
                .map(Node::text_content)
                .collect::<Vec<_>>()
                .concat(),
        }
    }

    pub fn first_element_child(&self) -> Option<Node> {
        self.children().into_iter().find(Node::is_element)
    }

    /// The next sibling of this node that is an element, if any.
    pub fn next_element_sibling(&self) -> Option<Node> {
        let parent = self.parent()?;
        let index = parent.child_index(self)?;
        parent
            .children()
            .into_iter()
            .skip(index + 1)
            .find(|sibling| sibling.is_element())
    }

    /// Depth-first search for an element whose `id` attribute matches.
    pub fn find_by_id(&self, id: &str) -> Option<Node> {
        if self.attr("id").as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_id(id))
    }

    /// Registers an event listener on an element node.
    pub fn on(&self, event: impl Into<String>, listener: impl Fn(&Node) + 'static) {
        if let NodeKind::Element { listeners, .. } = &mut self.inner.borrow_mut().kind {
            listeners.push((event.into(), Rc::new(listener)));
        }
    }

    /// Fires an event on this node, invoking listeners in registration
    /// order. Listeners run with no borrow held, so they may freely
    /// mutate the tree.
    pub fn emit(&self, event: &str) {
        let matching: Vec<Listener> = match &self.inner.borrow().kind {
            NodeKind::Element { listeners, .. } => listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, listener)| listener.clone())
                .collect(),
            _ => Vec::new(),
        };
        for listener in matching {
            listener(self);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.borrow().kind {
            NodeKind::Text(content) => write!(f, "{}", content),
            NodeKind::Comment(content) => write!(f, "<!--{}-->", content),
            NodeKind::Element { tag, attrs, .. } => {
                write!(f, "<{}", tag)?;
                for attr in attrs {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                write!(f, ">")?;
                for child in &self.inner.borrow().children {
                    write!(f, "{}", child)?;
                }
                write!(f, "</{}>", tag)
            }
        }
    }
}
