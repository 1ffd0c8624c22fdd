use weft_data::Value;
use weft_dom::Node;

use crate::directives::Directive;
use crate::error::EngineResult;
use crate::parse::Details;
use crate::section::Section;

/// `w-if`: toggles a nested section in and out of the tree.
///
/// The nested section is compiled once at construction. A comment marker
/// left in the tree records the detach position, so re-attachment lands
/// the element back where it came from; re-attachment reconnects the
/// section, which re-fires its bindings against the current data.
pub struct IfDirective {
    marker: Node,
    section: Section,
    attached: bool,
}

impl IfDirective {
    pub fn new(elem: Node, details: &Details) -> EngineResult<Self> {
        let marker = Node::comment("");
        if let Some(parent) = elem.parent() {
            parent.insert_before(&marker, &elem);
        }
        let section = details.parse()?;
        Ok(IfDirective {
            marker,
            section,
            attached: true,
        })
    }
}

impl Directive for IfDirective {
    fn execute(&mut self, value: Value) -> EngineResult<()> {
        if value.truthy() && !self.attached {
            if let Some(parent) = self.marker.parent() {
                parent.insert_before(&self.section.root, &self.marker);
            }
            self.attached = true;
            self.section.connect();
        } else if !value.truthy() && self.attached {
            self.section.disconnect();
            self.section.root.detach();
            self.attached = false;
        }
        Ok(())
    }

    fn connect(&mut self) {
        if self.attached {
            self.section.connect();
        }
    }

    fn disconnect(&mut self) {
        if self.attached {
            self.section.disconnect();
        }
    }
}
