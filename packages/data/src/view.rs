use std::rc::Rc;

use crate::value::{ObjectRef, Value};

/// A shared handle to a data view.
pub type DataRef = Rc<dyn DataView>;

/// A layered view over the data graph.
///
/// Implementations differ in exactly one primitive: [`DataView::get_root`],
/// the *owner* lookup. It answers "which object owns this key", not "what
/// is this key's value" — the observation layer needs the owning object to
/// attach its subscription to, even when the keypath threads through scope
/// overrides. The derived operations are implemented once, here.
pub trait DataView {
    /// Returns the object that owns `key` (not the key's value).
    fn get_root(&self, key: &str) -> Value;

    /// Resolves a dotted keypath to a value, short-circuiting to
    /// `Undefined` when any intermediate is absent.
    fn get(&self, keypath: &[String]) -> Value {
        let Some(first) = keypath.first() else {
            return Value::Undefined;
        };
        let mut current = self.get_root(first);
        for key in keypath {
            current = current.member(key);
        }
        current
    }

    /// Calls `visit(owner, key)` for every key in the path *before*
    /// descending through it, so a caller can subscribe to every
    /// intermediate object rather than just the leaf.
    fn each_key(&self, keypath: &[String], visit: &mut dyn FnMut(&Value, &str)) {
        let Some(first) = keypath.first() else {
            return;
        };
        let mut current = self.get_root(first);
        for key in keypath {
            visit(&current, key);
            current = if current.is_absent() {
                Value::Undefined
            } else {
                current.member(key)
            };
        }
    }
}

/// The bottom of the scope chain: owns the full data graph and answers
/// any key with it.
pub struct Root {
    data: Value,
}

impl Root {
    pub fn new(data: Value) -> Self {
        Root { data }
    }

    pub fn shared(data: Value) -> DataRef {
        Rc::new(Root::new(data))
    }
}

impl DataView for Root {
    fn get_root(&self, _key: &str) -> Value {
        self.data.clone()
    }
}

/// A view that introduces one name at the topmost layer and forwards
/// every other lookup to its parent. Immutable once constructed.
pub struct Scoped {
    parent: DataRef,
    key: String,
    value: Value,
}

impl Scoped {
    pub fn new(parent: DataRef, key: impl Into<String>, value: Value) -> Self {
        Scoped {
            parent,
            key: key.into(),
            value,
        }
    }
}

impl DataView for Scoped {
    fn get_root(&self, key: &str) -> Value {
        if key == self.key {
            // A synthetic single-key owner. It is rebuilt on every lookup,
            // so subscriptions against it never fire; introduced names are
            // rebound by recompilation, not notification.
            let owner = ObjectRef::new();
            owner.insert(self.key.clone(), self.value.clone());
            Value::Object(owner)
        } else {
            self.parent.get_root(key)
        }
    }
}

/// Layers a new name over an existing view.
pub fn scope(parent: &DataRef, key: impl Into<String>, value: Value) -> DataRef {
    Rc::new(Scoped::new(parent.clone(), key, value))
}
