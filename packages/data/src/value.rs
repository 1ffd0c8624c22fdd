use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A shared, mutable object: string keys to values.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<HashMap<String, Value>>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stable identity for this object, used by the observation
    /// registry to key subscriptions.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The value at `key`, or `Undefined` when absent.
    pub fn get(&self, key: &str) -> Value {
        self.0
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// Writes `key` without notifying anyone. Observed writes go through
    /// [`crate::Watch::set`].
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }
}

/// A shared, mutable list of values.
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Value {
        self.0
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Value {
        self.0.borrow_mut().pop().unwrap_or(Value::Undefined)
    }

    pub fn remove(&self, index: usize) -> Value {
        let mut items = self.0.borrow_mut();
        if index < items.len() {
            items.remove(index)
        } else {
            Value::Undefined
        }
    }

    pub fn reverse(&self) {
        self.0.borrow_mut().reverse();
    }

    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.borrow_mut();
        if index < items.len() {
            items[index] = value;
        }
    }

    /// A snapshot of the current items. Iteration in the engine always
    /// walks a snapshot, so callbacks that mutate the list mid-walk
    /// cannot corrupt the traversal.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }
}

/// A function value in the data graph. Reading a function-valued leaf
/// calls it with no arguments; publishing through one calls it with the
/// new value.
#[derive(Clone)]
pub struct FuncRef(Rc<dyn Fn(&[Value]) -> Value>);

impl FuncRef {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        FuncRef(Rc::new(f))
    }

    pub fn ptr_eq(&self, other: &FuncRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

/// A value in the application data graph.
///
/// `Undefined` is the absent-value sentinel: looking up a missing key, or
/// descending through an absent intermediate, yields `Undefined` rather
/// than an error.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(ListRef),
    Object(ObjectRef),
    Func(FuncRef),
}

impl Value {
    pub fn object() -> (Value, ObjectRef) {
        let obj = ObjectRef::new();
        (Value::Object(obj.clone()), obj)
    }

    pub fn func(f: impl Fn(&[Value]) -> Value + 'static) -> Value {
        Value::Func(FuncRef::new(f))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Host-style truthiness: absent values, `false`, zero, NaN, and the
    /// empty string are falsy; containers and functions are truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Object(_) | Value::Func(_) => true,
        }
    }

    /// String rendering for directives that write text. Absent values
    /// render as the empty string.
    pub fn display(&self) -> String {
        match self {
            Value::Undefined | Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Str(s) => s.clone(),
            Value::List(items) => items
                .items()
                .iter()
                .map(Value::display)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object]".to_string(),
            Value::Func(_) => "[function]".to_string(),
        }
    }

    /// Member lookup: object keys, list indices, and `length` on lists.
    /// Anything else resolves to `Undefined`.
    pub fn member(&self, key: &str) -> Value {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::List(items) => {
                if key == "length" {
                    Value::Number(items.len() as f64)
                } else if let Ok(index) = key.parse::<usize>() {
                    items.get(index)
                } else {
                    Value::Undefined
                }
            }
            _ => Value::Undefined,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            // NaN is not equal to itself, matching host semantics.
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => write!(f, "List(len={})", items.len()),
            Value::Object(obj) => write!(f, "Object(id={:#x})", obj.id()),
            Value::Func(_) => write!(f, "Func"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                let list = ListRef::new();
                for item in items {
                    list.push(Value::from(item));
                }
                Value::List(list)
            }
            serde_json::Value::Object(entries) => {
                let obj = ObjectRef::new();
                for (key, value) in entries {
                    obj.insert(key, Value::from(value));
                }
                Value::Object(obj)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Func(_) => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let items = items.items();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                let keys = obj.keys();
                let mut map = serializer.serialize_map(Some(keys.len()))?;
                for key in keys {
                    map.serialize_entry(&key, &obj.get(&key))?;
                }
                map.end()
            }
        }
    }
}
