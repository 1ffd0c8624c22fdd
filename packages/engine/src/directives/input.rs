use weft_data::Value;
use weft_dom::Node;

use crate::directives::Directive;
use crate::error::EngineResult;
use crate::parse::Details;

/// `w-value`: two-way input binding.
///
/// Rendering writes the resolved value into the element's `value`
/// attribute; an `input` event on the element publishes the current
/// attribute back through the expression's keypath. A function-valued
/// leaf is called with no arguments to read and with the new value to
/// write.
pub struct ValueDirective {
    elem: Node,
}

impl ValueDirective {
    pub fn new(elem: Node, details: Details) -> Self {
        {
            let details = details.clone();
            elem.on("input", move |elem| {
                let current = elem.attr("value").unwrap_or_default();
                details.publish(Value::Str(current));
            });
        }
        ValueDirective { elem }
    }
}

impl Directive for ValueDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        let value = match value {
            Value::Func(f) => f.call(&[]),
            other => other,
        };
        self.elem.set_attr("value", value.display());
        Ok(())
    }
}
