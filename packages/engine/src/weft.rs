use std::rc::Rc;

use tracing::debug;
use weft_data::{DataRef, Root, Value, Watch};
use weft_dom::Node;

use crate::config::{Config, DirectiveSet};
use crate::directives::register_defaults;
use crate::error::EngineResult;
use crate::filters::FilterSet;
use crate::parse;
use crate::scan::Reader;
use crate::section::Section;

/// Default attribute prefix marking a directive.
pub const PREFIX: &str = "w-";

/// The binding engine.
///
/// Owns the directive and filter registries plus the shared change
/// notifier; [`Weft::bind`] compiles a host subtree against a data value
/// and hands back the live [`Section`]. Registries can keep being edited
/// between binds — each bind snapshots them.
pub struct Weft {
    pub prefix: String,
    pub directives: DirectiveSet,
    pub filters: FilterSet,
    pub watch: Rc<Watch>,
}

impl Weft {
    pub fn new() -> Weft {
        Weft::with_watch(Rc::new(Watch::default()))
    }

    /// Builds an engine sharing an existing notifier, so sections bound
    /// by separate engines react to the same writes.
    pub fn with_watch(watch: Rc<Watch>) -> Weft {
        let mut directives = DirectiveSet::default();
        register_defaults(&mut directives);
        Weft {
            prefix: PREFIX.to_string(),
            directives,
            filters: FilterSet::defaults(),
            watch,
        }
    }

    fn config(&self) -> Rc<Config> {
        Rc::new(Config {
            prefix: self.prefix.clone(),
            directives: self.directives.clone(),
            filters: self.filters.clone(),
            watch: self.watch.clone(),
        })
    }

    /// Compiles `root` and its descendants against `data`, connects the
    /// resulting section, and fires every binding once.
    ///
    /// The returned [`Section`] owns the live bindings: dropping it
    /// releases every observation, after which the tree stops reacting
    /// to data changes.
    pub fn bind(&self, root: &Node, data: Value) -> EngineResult<Section> {
        debug!("binding tree");
        let view: DataRef = Rc::new(Root::new(data));
        let config = self.config();
        let reader = Reader::scan(&config, root);
        let mut section = parse::parse(&reader, &config, &view)?;
        section.connect();
        Ok(section)
    }
}

impl Default for Weft {
    fn default() -> Weft {
        Weft::new()
    }
}
