use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use weft_data::Value;
use weft_dom::Node;

use crate::error::EngineError;
use crate::weft::Weft;

/// Registers a `w-probe` directive that logs every resolved value.
fn probed(weft: &mut Weft) -> Rc<RefCell<Vec<Value>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    {
        let log = log.clone();
        weft.directives.register_fn("probe", move |_elem, value| {
            log.borrow_mut().push(value.clone());
        });
    }
    log
}

fn root_object(data: &Value) -> weft_data::ObjectRef {
    match data {
        Value::Object(obj) => obj.clone(),
        _ => panic!("expected object data"),
    }
}

#[test]
fn bind_fires_every_binding_once() {
    let mut weft = Weft::new();
    let log = probed(&mut weft);

    let root = Node::element("div").with_attr("w-probe", "name");
    let _section = weft
        .bind(&root, Value::from(json!({ "name": "alice" })))
        .unwrap();

    assert_eq!(*log.borrow(), [Value::from("alice")]);
}

#[test]
fn set_refires_the_binding_with_the_new_value() {
    let mut weft = Weft::new();
    let log = probed(&mut weft);

    let data = Value::from(json!({ "name": "alice" }));
    let obj = root_object(&data);
    let root = Node::element("div").with_attr("w-probe", "name");
    // The returned section owns the live bindings for this test's span.
    let _section = weft.bind(&root, data).unwrap();

    weft.watch.set(&obj, "name", Value::from("bob"));
    assert_eq!(*log.borrow(), [Value::from("alice"), Value::from("bob")]);
}

#[test]
fn disconnected_sections_ignore_writes() {
    let mut weft = Weft::new();
    let log = probed(&mut weft);

    let data = Value::from(json!({ "name": "alice" }));
    let obj = root_object(&data);
    let root = Node::element("div").with_attr("w-probe", "name");
    let mut section = weft.bind(&root, data).unwrap();

    section.disconnect();
    section.disconnect(); // idempotent
    weft.watch.set(&obj, "name", Value::from("bob"));
    assert_eq!(log.borrow().len(), 1);

    // Reconnecting re-fires eagerly with the current value.
    section.connect();
    assert_eq!(*log.borrow(), [Value::from("alice"), Value::from("bob")]);
}

#[test]
fn replacing_an_intermediate_object_refires_the_leaf_binding() {
    let mut weft = Weft::new();
    let log = probed(&mut weft);

    let data = Value::from(json!({ "user": { "name": "alice" } }));
    let obj = root_object(&data);
    let root = Node::element("div").with_attr("w-probe", "user.name");
    let _section = weft.bind(&root, data).unwrap();

    let replacement = Value::from(json!({ "name": "carol" }));
    let replacement_obj = root_object(&replacement);
    weft.watch.set(&obj, "user", replacement);
    assert_eq!(log.borrow().last(), Some(&Value::from("carol")));

    // The binding followed the restructured path: writes through the
    // new intermediate notify it too.
    weft.watch.set(&replacement_obj, "name", Value::from("dave"));
    assert_eq!(log.borrow().last(), Some(&Value::from("dave")));
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn destroy_detaches_the_root_and_stops_updates() {
    let mut weft = Weft::new();
    let log = probed(&mut weft);

    let data = Value::from(json!({ "name": "alice" }));
    let obj = root_object(&data);
    let inner = Node::element("span").with_attr("w-probe", "name");
    let outer = Node::element("div").with_child(inner.clone());

    let mut section = weft.bind(&inner, data).unwrap();
    section.destroy();

    assert!(section.is_destroyed());
    assert!(inner.parent().is_none());
    assert!(!outer.contains(&inner));

    weft.watch.set(&obj, "name", Value::from("bob"));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
#[should_panic(expected = "section destroyed twice")]
fn destroying_twice_panics() {
    let weft = Weft::new();
    let root = Node::element("div").with_attr("w-text", "name");
    let mut section = weft
        .bind(&root, Value::from(json!({ "name": "x" })))
        .unwrap();
    section.destroy();
    section.destroy();
}

#[test]
fn unknown_directive_attributes_are_skipped() {
    let weft = Weft::new();
    let root = Node::element("div")
        .with_attr("w-nope", "name")
        .with_attr("w-text", "name");
    let _section = weft
        .bind(&root, Value::from(json!({ "name": "hi" })))
        .unwrap();
    assert_eq!(root.text_content(), "hi");
}

#[test]
fn unknown_filter_fails_the_bind() {
    let weft = Weft::new();
    let root = Node::element("div").with_attr("w-text", "name | sideways");
    let Err(err) = weft.bind(&root, Value::from(json!({ "name": "hi" }))) else {
        panic!("bind accepted an unknown filter");
    };
    assert!(matches!(err, EngineError::UnknownFilter { name } if name == "sideways"));
}

#[test]
fn malformed_expression_fails_the_bind() {
    let weft = Weft::new();
    let root = Node::element("div").with_attr("w-text", "name |");
    let Err(err) = weft.bind(&root, Value::from(json!({ "name": "hi" }))) else {
        panic!("bind accepted a malformed expression");
    };
    assert!(matches!(err, EngineError::Expression { .. }));
}

#[test]
fn directive_construction_failure_fails_the_bind() {
    let weft = Weft::new();
    // `each-` with no loop variable name after the stem.
    let root = Node::element("ul")
        .with_child(Node::element("li").with_attr("w-each-", "names"));
    let Err(err) = weft.bind(&root, Value::from(json!({ "names": ["a"] }))) else {
        panic!("bind accepted an each directive without an item name");
    };
    assert!(matches!(err, EngineError::Directive { name, .. } if name == "each"));
}

#[test]
fn engines_sharing_a_watch_react_to_the_same_writes() {
    let mut first = Weft::new();
    let log = probed(&mut first);
    let second = Weft::with_watch(first.watch.clone());

    let data = Value::from(json!({ "name": "alice" }));
    let obj = root_object(&data);

    let probe_root = Node::element("div").with_attr("w-probe", "name");
    let _probe_section = first.bind(&probe_root, data.clone()).unwrap();

    let text_root = Node::element("div").with_attr("w-text", "name");
    let _text_section = second.bind(&text_root, data).unwrap();

    first.watch.set(&obj, "name", Value::from("bob"));
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(text_root.text_content(), "bob");
}
