use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_data::{DataRef, SubId, Value, Watch};

/// A reactive link from one keypath to one callback.
///
/// While connected, the binding observes every object along its keypath —
/// not just the leaf owner — so replacing an intermediate object also
/// re-fires it. Every notification first re-subscribes along the possibly
/// restructured path, then runs the callback.
///
/// Disconnection is synchronous: the observation registry holds the
/// notify closure weakly and delivery re-checks liveness, so once
/// `disconnect` returns no callback of this binding can run again.
pub struct PathBinding {
    inner: Rc<BindingInner>,
}

struct BindingInner {
    watch: Rc<Watch>,
    data: DataRef,
    keypath: Vec<String>,
    action: Box<dyn Fn()>,
    subs: RefCell<Vec<SubId>>,
    connected: Cell<bool>,
    /// The strong handle to the notify closure registered with the
    /// watch; dropping the binding drops the closure.
    notify: RefCell<Option<Rc<dyn Fn()>>>,
}

impl PathBinding {
    pub fn new(
        watch: Rc<Watch>,
        data: DataRef,
        keypath: Vec<String>,
        action: impl Fn() + 'static,
    ) -> PathBinding {
        let inner = Rc::new(BindingInner {
            watch,
            data,
            keypath,
            action: Box::new(action),
            subs: RefCell::new(Vec::new()),
            connected: Cell::new(false),
            notify: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let notify: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                if inner.connected.get() {
                    inner.resubscribe();
                    (inner.action)();
                }
            }
        });
        *inner.notify.borrow_mut() = Some(notify);

        PathBinding { inner }
    }

    /// Starts observing the keypath. Does not fire; callers that want the
    /// eager initial evaluation follow up with [`PathBinding::trigger`].
    pub fn connect(&self) {
        self.inner.connected.set(true);
        self.inner.resubscribe();
    }

    /// Runs the callback once, if connected.
    pub fn trigger(&self) {
        if self.inner.connected.get() {
            (self.inner.action)();
        }
    }

    /// Stops observing. Idempotent.
    pub fn disconnect(&self) {
        self.inner.connected.set(false);
        self.inner.clear_subs();
    }
}

impl BindingInner {
    fn clear_subs(&self) {
        for id in self.subs.borrow_mut().drain(..) {
            self.watch.disconnect(id);
        }
    }

    fn resubscribe(&self) {
        self.clear_subs();
        let Some(notify) = self.notify.borrow().clone() else {
            return;
        };
        let mut subs = Vec::new();
        self.data.each_key(&self.keypath, &mut |owner, key| {
            if let Value::Object(obj) = owner {
                subs.push(self.watch.connect(obj, key, &notify));
            }
        });
        *self.subs.borrow_mut() = subs;
    }
}

impl Drop for PathBinding {
    fn drop(&mut self) {
        self.inner.clear_subs();
    }
}
