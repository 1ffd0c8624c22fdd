use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use weft_data::{DataRef, Value, Watch};
use weft_dom::{Attribute, Node};
use weft_expression::Expression;

use crate::binding::PathBinding;
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::filters::resolve;
use crate::scan::{Hook, Reader};
use crate::section::Section;

/// The context handed to a directive constructor.
#[derive(Clone)]
pub struct Details {
    /// The wildcard tail of the directive name: `w-each-name` hands the
    /// each directive `name`. Empty for exact-name directives.
    pub param: String,
    /// The data view active where the directive was found.
    pub data: DataRef,
    nested: Reader,
    config: Rc<Config>,
    expression: Rc<Expression>,
}

impl Details {
    /// Recursively compiles the hooks nested inside this directive's
    /// element, consuming them from the shared scan.
    pub fn parse(&self) -> EngineResult<Section> {
        parse(&self.nested, &self.config, &self.data)
    }

    /// Captures this directive's element as a cloneable template,
    /// consuming its nested hooks from the shared scan.
    pub fn cloneable(&self) -> EngineResult<Cloneable> {
        cloneable(&self.nested, &self.config)
    }

    /// Writes `value` back through this directive's expression: the
    /// keypath's owner object is written (and observers notified), or a
    /// function-valued leaf is called with the new value.
    pub fn publish(&self, value: Value) {
        publish(&self.expression, &self.data, &self.config.watch, value);
    }
}

/// A captured subtree plus the exact attribute set that produced it.
///
/// Shared read-only by every section stamped from it: each clone deep
/// copies the captured root and compiles against the captured attribute
/// list, never against a live scan of the clone root — which is what
/// keeps a repeating directive from re-triggering itself on its own
/// clones.
pub struct Cloneable {
    pub root: Node,
    attrs: Vec<Attribute>,
    config: Rc<Config>,
}

impl Cloneable {
    fn compile(&self, cloned: Node, data: &DataRef) -> EngineResult<Section> {
        let reader = Reader::exact(&self.config, &cloned, self.attrs.clone());
        parse(&reader, &self.config, data)
    }

    /// Stamps a new section into the tree immediately before `marker`.
    pub fn clone_before(&self, marker: &Node, data: &DataRef) -> EngineResult<Section> {
        let cloned = self.root.deep_clone();
        if let Some(parent) = marker.parent() {
            parent.insert_before(&cloned, marker);
        }
        self.compile(cloned, data)
    }

    /// Stamps a new section into the tree position of an existing
    /// section, detaching that section's root.
    pub fn clone_replace(&self, replace: &Section, data: &DataRef) -> EngineResult<Section> {
        let cloned = self.root.deep_clone();
        if let Some(parent) = replace.root.parent() {
            parent.replace_child(&cloned, &replace.root);
        }
        self.compile(cloned, data)
    }
}

/// Compiles the hooks within `reader` into a live [`Section`].
///
/// One directive instance and one path binding per directive hook, in
/// scan order. Unknown directive names are skipped silently; expression
/// and construction failures abort the whole compile.
pub fn parse(reader: &Reader, config: &Rc<Config>, data: &DataRef) -> EngineResult<Section> {
    let mut section = Section::new(reader.root.clone());

    reader.each(&mut |hook| {
        let Hook::Directive { elem, attr } = hook else {
            // Component hooks are recognized by the scanner but have no
            // compiler here.
            debug!("skipping component hook");
            return Ok(());
        };

        let Some(stripped) = config.strip(&attr.name) else {
            return Ok(());
        };
        let Some((entry, param)) = config.directives.lookup(stripped) else {
            debug!(attr = %attr.name, "no directive registered; skipping");
            return Ok(());
        };

        let expression =
            Rc::new(
                Expression::parse(&attr.value).map_err(|source| EngineError::Expression {
                    attr: attr.value.clone(),
                    source,
                })?,
            );
        for filter in &expression.filters {
            if !config.filters.contains(&filter.name) {
                return Err(EngineError::UnknownFilter {
                    name: filter.name.clone(),
                });
            }
        }

        debug!(attr = %attr.name, "compiling directive hook");

        let details = Details {
            param,
            data: data.clone(),
            nested: reader.nested(&elem),
            config: config.clone(),
            expression: expression.clone(),
        };
        let instance = Rc::new(RefCell::new((entry.build)(&elem, details)?));
        section.directives.push(instance.clone());

        // One binding per hook: observe every key along the path, and on
        // each change re-resolve and re-execute. A directive that is
        // already mid-execute is not re-entered.
        let action = {
            let data = data.clone();
            let config = config.clone();
            let expression = expression.clone();
            move || {
                let value = resolve(&expression, &data, &config.filters);
                match instance.try_borrow_mut() {
                    Ok(mut directive) => {
                        if let Err(error) = directive.execute(value) {
                            tracing::error!(%error, "directive execute failed");
                        }
                    }
                    Err(_) => warn!("skipped re-entrant directive execute"),
                }
            }
        };
        section.bindings.push(PathBinding::new(
            config.watch.clone(),
            data.clone(),
            expression.keypath.clone(),
            action,
        ));

        Ok(())
    })?;

    section.initialize();
    Ok(section)
}

/// Harvests the attribute list present on the reader's root element —
/// descendant hooks are consumed but not captured; clones rescan their
/// own descendants — and returns the template.
pub fn cloneable(reader: &Reader, config: &Rc<Config>) -> EngineResult<Cloneable> {
    let mut attrs = Vec::new();
    reader.each(&mut |hook| {
        if let Hook::Directive { elem, attr } = hook {
            if elem.ptr_eq(&reader.root) {
                attrs.push(attr);
            }
        }
        Ok(())
    })?;

    Ok(Cloneable {
        root: reader.root.clone(),
        attrs,
        config: config.clone(),
    })
}

fn publish(expr: &Expression, data: &DataRef, watch: &Rc<Watch>, value: Value) {
    let Some((last, ancestors)) = expr.keypath.split_last() else {
        return;
    };
    let Some(first) = expr.keypath.first() else {
        return;
    };
    let mut owner = data.get_root(first);
    for key in ancestors {
        owner = owner.member(key);
    }
    let Value::Object(obj) = owner else {
        // Publishing through an absent path degrades to a no-op.
        return;
    };
    match obj.get(last) {
        Value::Func(f) => {
            f.call(&[value]);
        }
        _ => watch.set(&obj, last, value),
    }
}
