use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::value::{ObjectRef, Value};

/// Identifies one subscription for later disconnection.
pub type SubId = u64;

struct Sub {
    id: SubId,
    object: usize,
    key: String,
    callback: Weak<dyn Fn()>,
}

/// The change-notification registry.
///
/// Subscriptions are keyed by object identity plus key name. Notification
/// is synchronous, and delivery is safe against re-entrant mutation of the
/// registry: the matching list is snapshotted up front and every entry is
/// re-checked for liveness immediately before its callback runs, so a
/// callback that disconnects another subscription (or its own) suppresses
/// that stale delivery.
///
/// Callbacks are held weakly — the subscriber keeps the owning `Rc`, and a
/// dropped subscriber can never fire again.
#[derive(Default)]
pub struct Watch {
    subs: RefCell<Vec<Sub>>,
    next_id: Cell<SubId>,
}

impl Watch {
    pub fn new() -> Rc<Watch> {
        Rc::new(Watch::default())
    }

    /// Registers `callback` to fire when `key` changes on `object`.
    pub fn connect(&self, object: &ObjectRef, key: &str, callback: &Rc<dyn Fn()>) -> SubId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subs.borrow_mut().push(Sub {
            id,
            object: object.id(),
            key: key.to_string(),
            callback: Rc::downgrade(callback),
        });
        id
    }

    /// Removes one subscription. Unknown ids are ignored, so disconnect
    /// is idempotent.
    pub fn disconnect(&self, id: SubId) {
        self.subs.borrow_mut().retain(|sub| sub.id != id);
    }

    /// Writes `key` on `object` and notifies its subscribers.
    pub fn set(&self, object: &ObjectRef, key: &str, value: Value) {
        object.insert(key, value);
        self.touch(object, key);
    }

    /// Notifies subscribers of `key` on `object` without writing — for
    /// callers that mutated a shared list or object in place.
    pub fn touch(&self, object: &ObjectRef, key: &str) {
        let matching: Vec<(SubId, Weak<dyn Fn()>)> = self
            .subs
            .borrow()
            .iter()
            .filter(|sub| sub.object == object.id() && sub.key == key)
            .map(|sub| (sub.id, sub.callback.clone()))
            .collect();

        debug!(key, subscribers = matching.len(), "notifying watchers");

        for (id, callback) in matching {
            // The subscription may have been torn down by an earlier
            // callback in this same delivery.
            let live = self.subs.borrow().iter().any(|sub| sub.id == id);
            if !live {
                continue;
            }
            if let Some(callback) = callback.upgrade() {
                callback();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn sub_count(&self) -> usize {
        self.subs.borrow().len()
    }
}
