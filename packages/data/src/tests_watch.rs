use std::cell::RefCell;
use std::rc::Rc;

use crate::{ObjectRef, Value, Watch};

fn counted_callback(counter: &Rc<RefCell<u32>>) -> Rc<dyn Fn()> {
    let counter = counter.clone();
    Rc::new(move || *counter.borrow_mut() += 1)
}

#[test]
fn test_set_writes_and_notifies() {
    let watch = Watch::new();
    let obj = ObjectRef::new();
    let fired = Rc::new(RefCell::new(0));
    let callback = counted_callback(&fired);

    watch.connect(&obj, "name", &callback);
    watch.set(&obj, "name", Value::from("Lug"));

    assert_eq!(obj.get("name"), Value::from("Lug"));
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn test_touch_notifies_without_writing() {
    let watch = Watch::new();
    let obj = ObjectRef::new();
    obj.insert("names", Value::from("x"));

    let fired = Rc::new(RefCell::new(0));
    let callback = counted_callback(&fired);
    watch.connect(&obj, "names", &callback);

    watch.touch(&obj, "names");
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(obj.get("names"), Value::from("x"));
}

#[test]
fn test_notification_is_scoped_to_object_and_key() {
    let watch = Watch::new();
    let obj = ObjectRef::new();
    let other = ObjectRef::new();

    let fired = Rc::new(RefCell::new(0));
    let callback = counted_callback(&fired);
    watch.connect(&obj, "name", &callback);

    watch.set(&obj, "age", Value::Number(9.0));
    watch.set(&other, "name", Value::from("x"));
    assert_eq!(*fired.borrow(), 0);

    watch.set(&obj, "name", Value::from("y"));
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn test_disconnect_stops_delivery() {
    let watch = Watch::new();
    let obj = ObjectRef::new();
    let fired = Rc::new(RefCell::new(0));
    let callback = counted_callback(&fired);

    let sub = watch.connect(&obj, "name", &callback);
    watch.disconnect(sub);
    watch.set(&obj, "name", Value::from("z"));
    assert_eq!(*fired.borrow(), 0);

    // Idempotent.
    watch.disconnect(sub);
}

#[test]
fn test_dropped_callback_never_fires() {
    let watch = Watch::new();
    let obj = ObjectRef::new();
    let fired = Rc::new(RefCell::new(0));

    {
        let callback = counted_callback(&fired);
        watch.connect(&obj, "name", &callback);
        // `callback` dropped here; only the weak handle remains.
    }

    watch.set(&obj, "name", Value::from("z"));
    assert_eq!(*fired.borrow(), 0);
}

#[test]
fn test_callback_disconnecting_a_peer_suppresses_its_delivery() {
    let watch = Watch::new();
    let obj = ObjectRef::new();

    let second_fired = Rc::new(RefCell::new(0));
    let second_cb = counted_callback(&second_fired);
    let second_sub = Rc::new(RefCell::new(None));

    // The first callback tears down the second before it is delivered.
    let first_cb: Rc<dyn Fn()> = {
        let watch = watch.clone();
        let second_sub = second_sub.clone();
        Rc::new(move || {
            if let Some(id) = second_sub.borrow_mut().take() {
                watch.disconnect(id);
            }
        })
    };

    watch.connect(&obj, "k", &first_cb);
    *second_sub.borrow_mut() = Some(watch.connect(&obj, "k", &second_cb));

    watch.touch(&obj, "k");
    assert_eq!(*second_fired.borrow(), 0);
    assert_eq!(watch.sub_count(), 1);
}

#[test]
fn test_reentrant_set_inside_callback() {
    let watch = Watch::new();
    let obj = ObjectRef::new();

    let log = Rc::new(RefCell::new(Vec::new()));
    let cb: Rc<dyn Fn()> = {
        let watch = watch.clone();
        let obj = obj.clone();
        let log = log.clone();
        Rc::new(move || {
            log.borrow_mut().push(obj.get("n").display());
            // Write a second key from inside delivery of the first.
            if obj.get("echo").is_absent() {
                watch.set(&obj, "echo", obj.get("n"));
            }
        })
    };

    watch.connect(&obj, "n", &cb);
    watch.set(&obj, "n", Value::Number(1.0));

    assert_eq!(*log.borrow(), vec!["1"]);
    assert_eq!(obj.get("echo"), Value::Number(1.0));
}
