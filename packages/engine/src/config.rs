use std::collections::HashMap;
use std::rc::Rc;

use weft_data::{Value, Watch};
use weft_dom::{Attribute, Node};

use crate::directives::{Builder, Directive, SimpleDirective};
use crate::error::EngineResult;
use crate::filters::FilterSet;
use crate::parse::Details;

/// A registered directive: its scan priority and its builder.
#[derive(Clone)]
pub struct Entry {
    pub priority: i32,
    pub build: Builder,
}

/// The directive registry.
///
/// Names ending in `-*` are wildcards: `each-*` matches `each-name` and
/// hands `name` to the directive as its parameter. Exact names win over
/// wildcard stems; among wildcard candidates the longest stem wins.
#[derive(Clone, Default)]
pub struct DirectiveSet {
    entries: HashMap<String, Entry>,
}

impl DirectiveSet {
    pub fn register(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        build: impl Fn(&Node, Details) -> EngineResult<Box<dyn Directive>> + 'static,
    ) {
        self.entries.insert(
            name.into(),
            Entry {
                priority,
                build: Rc::new(build),
            },
        );
    }

    /// Registers a one-off directive backed by a plain closure, invoked
    /// with the element and each resolved value.
    pub fn register_fn(&mut self, name: impl Into<String>, f: impl Fn(&Node, &Value) + 'static) {
        let f = Rc::new(f);
        self.register(name, 0, move |elem, _details| {
            Ok(Box::new(SimpleDirective::new(elem.clone(), f.clone())) as Box<dyn Directive>)
        });
    }

    /// Resolves a stripped attribute name to its entry plus the wildcard
    /// tail (the directive's parameter; empty for exact matches).
    pub fn lookup(&self, name: &str) -> Option<(Entry, String)> {
        if let Some(entry) = self.entries.get(name) {
            return Some((entry.clone(), String::new()));
        }

        let mut best: Option<(&str, &Entry)> = None;
        for (registered, entry) in &self.entries {
            let Some(stem) = registered.strip_suffix("-*") else {
                continue;
            };
            let tail_matches = name
                .strip_prefix(stem)
                .and_then(|rest| rest.strip_prefix('-'))
                .is_some();
            if tail_matches && best.map_or(true, |(s, _)| stem.len() > s.len()) {
                best = Some((stem, entry));
            }
        }

        best.map(|(stem, entry)| (entry.clone(), name[stem.len() + 1..].to_string()))
    }

    pub fn priority(&self, name: &str) -> i32 {
        self.lookup(name).map(|(entry, _)| entry.priority).unwrap_or(0)
    }
}

/// A per-bind snapshot of the engine configuration: later registry edits
/// on the owning [`crate::Weft`] never affect an already-bound tree.
pub struct Config {
    pub prefix: String,
    pub directives: DirectiveSet,
    pub filters: FilterSet,
    pub watch: Rc<Watch>,
}

impl Config {
    /// Strips the directive prefix, or `None` for unrelated names.
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(&self.prefix)
    }

    pub fn is_prefixed(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// The priority of an (unstripped) attribute name; unknown and
    /// unprefixed names sort as 0.
    pub fn attr_priority(&self, name: &str) -> i32 {
        self.strip(name)
            .map(|stripped| self.directives.priority(stripped))
            .unwrap_or(0)
    }

    /// The element's prefixed attributes, sorted descending by directive
    /// priority. The sort is stable: equal priorities keep attribute
    /// order.
    pub fn matching_attrs(&self, elem: &Node) -> Vec<Attribute> {
        let mut attrs: Vec<Attribute> = elem
            .attributes()
            .into_iter()
            .filter(|attr| self.is_prefixed(&attr.name))
            .collect();
        attrs.sort_by_key(|attr| std::cmp::Reverse(self.attr_priority(&attr.name)));
        attrs
    }
}
