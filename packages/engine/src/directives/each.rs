use tracing::debug;
use weft_data::{scope, DataRef, Value};
use weft_dom::Node;

use crate::directives::Directive;
use crate::error::{EngineError, EngineResult};
use crate::parse::{Cloneable, Details};
use crate::section::Section;

/// Swaps the tree positions of two nodes via a temporary placeholder.
/// Works for any two attached nodes; neither node needs to know about
/// the other.
fn swap_nodes(one: &Node, two: &Node) {
    let placeholder = Node::comment("");
    if let Some(parent) = two.parent() {
        parent.replace_child(&placeholder, two);
    }
    if let Some(parent) = one.parent() {
        parent.replace_child(two, one);
    }
    if let Some(parent) = placeholder.parent() {
        parent.replace_child(one, &placeholder);
    }
}

/// `w-each-<name>`: repeats its element once per item of a list value,
/// scoping `<name>` to the item in each stamped section.
///
/// The reconciler keeps two index-aligned arrays — the last rendered
/// values and their sections — and matches a new sequence against them
/// with a forward scan: an item found later in the old order is swapped
/// into place (preserving its rendered nodes), an unchanged item costs
/// nothing, and only genuinely new items are cloned and compiled.
/// Duplicate values match their first forward occurrence; identity is
/// positional, not keyed.
pub struct EachDirective {
    /// Persistent empty text node marking the end of the rendered run;
    /// created once at construction, never recreated.
    end: Node,
    template: Cloneable,
    param: String,
    data: DataRef,
    values: Vec<Value>,
    sections: Vec<Section>,
    connected: bool,
}

impl EachDirective {
    pub fn new(elem: Node, details: &Details) -> EngineResult<Self> {
        if details.param.is_empty() {
            return Err(EngineError::directive(
                "each",
                "missing item name after `each-`",
            ));
        }
        let end = Node::text("");
        let template = details.cloneable()?;
        if let Some(parent) = elem.parent() {
            parent.replace_child(&end, &elem);
        }
        Ok(EachDirective {
            end,
            template,
            param: details.param.clone(),
            data: details.data.clone(),
            values: Vec::new(),
            sections: Vec::new(),
            // Subsections are connected as they are created, so the
            // enclosing section's connect pass has nothing left to do.
            connected: true,
        })
    }
}

impl Directive for EachDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        // Anything that is not a list renders as an empty sequence.
        let items = match value {
            Value::List(list) => list.items(),
            _ => Vec::new(),
        };

        let mut i = 0;
        for item in items {
            // Forward-only search: entries before `i` are already
            // settled.
            let found = self.values[i..]
                .iter()
                .position(|existing| *existing == item)
                .map(|offset| offset + i);

            match found {
                Some(found) if found > i => {
                    // Reuse the existing rendering by moving it into
                    // place. Both arrays mutate together, keeping them
                    // index-aligned after this single step.
                    debug!(from = found, to = i, "each: swapping sections");
                    swap_nodes(&self.sections[i].root, &self.sections[found].root);
                    self.sections.swap(i, found);
                    self.values.swap(i, found);
                }
                Some(_) => {
                    // Unchanged at this position.
                }
                None => {
                    debug!(index = i, "each: creating section");
                    let scoped = scope(&self.data, self.param.clone(), item.clone());
                    if i < self.sections.len() {
                        // A stale section occupies this slot: splice the
                        // clone into its position, then destroy it.
                        let fresh = self.template.clone_replace(&self.sections[i], &scoped)?;
                        let mut stale = std::mem::replace(&mut self.sections[i], fresh);
                        self.values[i] = item.clone();
                        stale.destroy();
                    } else {
                        let fresh = self.template.clone_before(&self.end, &scoped)?;
                        self.sections.push(fresh);
                        self.values.push(item.clone());
                    }
                    // While the whole directive is disconnected (an
                    // enclosing section mid-reconnect), the pending
                    // connect pass will pick this row up instead.
                    if self.connected {
                        self.sections[i].connect();
                    }
                }
            }

            i += 1;
        }

        // Surplus renderings beyond the new length are destroyed.
        while self.sections.len() > i {
            self.values.pop();
            if let Some(mut stale) = self.sections.pop() {
                stale.destroy();
            }
        }

        Ok(())
    }

    fn connect(&mut self) {
        if self.connected {
            return;
        }
        self.connected = true;
        for section in &mut self.sections {
            section.connect();
        }
    }

    fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        for section in &mut self.sections {
            section.disconnect();
        }
    }
}
