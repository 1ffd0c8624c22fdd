use std::cell::RefCell;
use std::rc::Rc;

use weft_data::Value;
use weft_dom::Node;

use crate::directives::Directive;
use crate::error::EngineResult;

/// `w-text`: renders the resolved value as the element's text content.
pub struct TextDirective {
    elem: Node,
}

impl TextDirective {
    pub fn new(elem: Node) -> Self {
        TextDirective { elem }
    }
}

impl Directive for TextDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        self.elem.set_text(value.display());
        Ok(())
    }
}

/// `w-attr-<name>`: mirrors the resolved value onto an attribute. Falsy
/// values remove the attribute; `true` renders as an empty (boolean)
/// attribute.
pub struct AttrDirective {
    elem: Node,
    name: String,
}

impl AttrDirective {
    pub fn new(elem: Node, name: String) -> Self {
        AttrDirective { elem, name }
    }
}

impl Directive for AttrDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        if !value.truthy() {
            self.elem.remove_attr(&self.name);
        } else if let Value::Bool(true) = value {
            self.elem.set_attr(&self.name, "");
        } else {
            self.elem.set_attr(&self.name, value.display());
        }
        Ok(())
    }
}

/// `w-class-<token>`: toggles one class token by truthiness, preserving
/// any other tokens on the element.
pub struct ClassDirective {
    elem: Node,
    token: String,
}

impl ClassDirective {
    pub fn new(elem: Node, token: String) -> Self {
        ClassDirective { elem, token }
    }
}

impl Directive for ClassDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        let current = self.elem.attr("class").unwrap_or_default();
        let mut tokens: Vec<&str> = current.split_whitespace().collect();
        let present = tokens.contains(&self.token.as_str());

        if value.truthy() && !present {
            tokens.push(&self.token);
        } else if !value.truthy() && present {
            tokens.retain(|token| *token != self.token);
        } else {
            return Ok(());
        }

        let joined = tokens.join(" ");
        if joined.is_empty() {
            self.elem.remove_attr("class");
        } else {
            self.elem.set_attr("class", joined);
        }
        Ok(())
    }
}

/// `w-on-<event>`: calls the resolved function value whenever the
/// element fires the named event. The handler always calls the most
/// recently resolved value, so swapping the function in the data graph
/// re-targets the listener.
pub struct OnDirective {
    latest: Rc<RefCell<Value>>,
}

impl OnDirective {
    pub fn new(elem: Node, event: &str) -> Self {
        let latest = Rc::new(RefCell::new(Value::Undefined));
        {
            let latest = latest.clone();
            elem.on(event, move |_| {
                // Clone the handle out before calling: the function may
                // re-enter and replace the latest value.
                let func = match &*latest.borrow() {
                    Value::Func(f) => Some(f.clone()),
                    _ => None,
                };
                if let Some(f) = func {
                    f.call(&[]);
                }
            });
        }
        OnDirective { latest }
    }
}

impl Directive for OnDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        *self.latest.borrow_mut() = value;
        Ok(())
    }
}
