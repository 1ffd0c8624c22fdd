use std::collections::HashMap;
use std::rc::Rc;

use weft_data::{DataRef, ListRef, Value};
use weft_expression::Expression;

pub type FilterFn = Rc<dyn Fn(Value, &[Value]) -> Value>;

/// The filter registry. Filters transform a resolved value before the
/// directive sees it; they never mutate the data graph.
#[derive(Clone, Default)]
pub struct FilterSet {
    entries: HashMap<String, FilterFn>,
}

impl FilterSet {
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(Value, &[Value]) -> Value + 'static,
    ) {
        self.entries.insert(name.into(), Rc::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.entries.get(name).cloned()
    }

    pub fn defaults() -> FilterSet {
        let mut filters = FilterSet::default();

        filters.register("uppercase", |value, _| {
            Value::Str(value.display().to_uppercase())
        });

        filters.register("lowercase", |value, _| {
            Value::Str(value.display().to_lowercase())
        });

        filters.register("capitalize", |value, _| {
            let text = value.display();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => {
                    Value::Str(first.to_uppercase().collect::<String>() + chars.as_str())
                }
                None => Value::Str(text),
            }
        });

        filters.register("not", |value, _| Value::Bool(!value.truthy()));

        filters.register("eq", |value, args| {
            Value::Bool(args.first().map_or(false, |arg| value == *arg))
        });

        // Truncates a list or string to its first `n` items.
        filters.register("limit", |value, args| {
            let n = match args.first() {
                Some(Value::Number(n)) if *n >= 0.0 => *n as usize,
                _ => return value,
            };
            match value {
                Value::List(items) => {
                    let limited = ListRef::new();
                    for item in items.items().into_iter().take(n) {
                        limited.push(item);
                    }
                    Value::List(limited)
                }
                Value::Str(s) => Value::Str(s.chars().take(n).collect()),
                other => other,
            }
        });

        filters
    }
}

/// Resolves an expression against a data view: keypath lookup, then the
/// filter chain in order. Function-valued leaves pass through intact;
/// directives that read through them (like `value`) call them
/// themselves, which lets `on-*` receive the function without invoking
/// it.
pub fn resolve(expr: &Expression, data: &DataRef, filters: &FilterSet) -> Value {
    let mut value = data.get(&expr.keypath);
    for call in &expr.filters {
        // Unknown filters were rejected at compile time.
        let Some(filter) = filters.get(&call.name) else {
            continue;
        };
        let args: Vec<Value> = call.args.iter().map(|arg| arg.resolve(&**data)).collect();
        value = filter(value, &args);
    }
    value
}
