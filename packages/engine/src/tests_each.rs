use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use weft_data::{ListRef, ObjectRef, Value};
use weft_dom::Node;

use crate::section::Section;
use crate::weft::Weft;

fn root_object(data: &Value) -> ObjectRef {
    match data {
        Value::Object(obj) => obj.clone(),
        _ => panic!("expected object data"),
    }
}

fn list(obj: &ObjectRef, key: &str) -> ListRef {
    match obj.get(key) {
        Value::List(list) => list,
        other => panic!("expected list at {key}, got {other:?}"),
    }
}

fn element_children(node: &Node) -> Vec<Node> {
    node.children()
        .into_iter()
        .filter(|child| child.is_element())
        .collect()
}

fn texts(node: &Node) -> Vec<String> {
    element_children(node)
        .iter()
        .map(|child| child.text_content())
        .collect()
}

/// Counts how many times any stamped row re-executes its probe, which
/// exposes whether the reconciler recompiled rows it should have reused.
fn counted(weft: &mut Weft) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    {
        let count = count.clone();
        weft.directives.register_fn("count", move |_elem, _value| {
            *count.borrow_mut() += 1;
        });
    }
    count
}

/// The section is returned alongside the handles: it owns the live
/// bindings, so each test keeps it for its whole span.
fn bind_names(weft: &Weft, names: &[&str]) -> (Node, ObjectRef, ListRef, Section) {
    let data = Value::from(json!({ "names": names }));
    let obj = root_object(&data);
    let items = list(&obj, "names");
    let root = Node::element("ul").with_child(
        Node::element("li")
            .with_attr("w-each-name", "names")
            .with_attr("w-text", "name")
            .with_attr("w-count", "name"),
    );
    let section = weft.bind(&root, data).unwrap();
    (root, obj, items, section)
}

#[test]
fn renders_one_section_per_item_in_order() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, _obj, _items, _section) = bind_names(&weft, &["a", "b", "c"]);

    assert_eq!(texts(&root), ["a", "b", "c"]);
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn reversing_reuses_every_rendered_node() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, items, _section) = bind_names(&weft, &["a", "b", "c"]);

    let before = element_children(&root);
    items.reverse();
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["c", "b", "a"]);
    let after = element_children(&root);
    assert!(after[0].ptr_eq(&before[2]));
    assert!(after[1].ptr_eq(&before[1]));
    assert!(after[2].ptr_eq(&before[0]));
    // Pure reordering: no row was recompiled or re-rendered.
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn rotation_is_swaps_only() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, items, _section) = bind_names(&weft, &["a", "b", "c"]);
    let before = element_children(&root);

    // [a, b, c] -> [c, a, b]
    let c = items.pop();
    let a = items.remove(0);
    let b = items.pop();
    items.push(c);
    items.push(a);
    items.push(b);
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["c", "a", "b"]);
    let after = element_children(&root);
    assert!(after[0].ptr_eq(&before[2]));
    assert!(after[1].ptr_eq(&before[0]));
    assert!(after[2].ptr_eq(&before[1]));
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn push_appends_a_new_section() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, items, _section) = bind_names(&weft, &["a", "b"]);
    let before = element_children(&root);

    items.push(Value::from("c"));
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["a", "b", "c"]);
    // The existing rows were not touched.
    let after = element_children(&root);
    assert!(after[0].ptr_eq(&before[0]));
    assert!(after[1].ptr_eq(&before[1]));
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn shrinking_destroys_surplus_sections() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, items, _section) = bind_names(&weft, &["a", "b", "c"]);
    let before = element_children(&root);

    items.pop();
    items.pop();
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["a"]);
    assert!(before[1].parent().is_none());
    assert!(before[2].parent().is_none());
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn churn_reuses_survivors_and_replaces_the_rest() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, items, _section) = bind_names(&weft, &["a", "b", "c"]);
    let before = element_children(&root);

    // [a, b, c] -> [b, d]: b survives by swap, d is freshly stamped in
    // place of a stale row, c falls off the end.
    items.remove(0);
    items.pop();
    items.push(Value::from("d"));
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["b", "d"]);
    let after = element_children(&root);
    assert!(after[0].ptr_eq(&before[1]));
    assert!(!after[1].ptr_eq(&before[0]) && !after[1].ptr_eq(&before[2]));
    // Exactly one new row rendered.
    assert_eq!(*count.borrow(), 4);
}

#[test]
fn duplicate_values_each_get_a_section() {
    let weft = Weft::new();
    let (root, obj, items, _section) = bind_names(&weft, &["x", "x"]);
    assert_eq!(texts(&root), ["x", "x"]);

    items.push(Value::from("x"));
    weft.watch.touch(&obj, "names");
    assert_eq!(texts(&root), ["x", "x", "x"]);
}

#[test]
fn growth_with_swap_and_duplicates() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, items, _section) = bind_names(&weft, &["a", "b"]);
    let before = element_children(&root);

    // [a, b] -> [b, a, c, a]: one swap, two creates, one of them a
    // duplicate of a surviving value.
    let a = items.remove(0);
    items.push(a.clone());
    items.push(Value::from("c"));
    items.push(a);
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["b", "a", "c", "a"]);
    let after = element_children(&root);
    assert!(after[0].ptr_eq(&before[1]));
    assert!(after[1].ptr_eq(&before[0]));
    assert_eq!(*count.borrow(), 4);

    // [b, a, c, a] -> [b]: the survivor keeps its node, the rest die.
    items.pop();
    items.pop();
    items.pop();
    weft.watch.touch(&obj, "names");

    assert_eq!(texts(&root), ["b"]);
    assert!(element_children(&root)[0].ptr_eq(&before[1]));
    assert_eq!(*count.borrow(), 4);
}

#[test]
fn object_items_scope_the_loop_variable() {
    let weft = Weft::new();
    let data = Value::from(json!({
        "site": "weft",
        "users": [
            { "name": "alice" },
            { "name": "bob" },
        ],
    }));
    let obj = root_object(&data);
    let users = list(&obj, "users");

    let root = Node::element("ul").with_child(
        Node::element("li")
            .with_attr("w-each-user", "users")
            .with_attr("w-attr-title", "site")
            .with_attr("w-text", "user.name"),
    );
    let _section = weft.bind(&root, data).unwrap();

    assert_eq!(texts(&root), ["alice", "bob"]);
    // Names outside the loop scope still resolve through to the root.
    for child in element_children(&root) {
        assert_eq!(child.attr("title").as_deref(), Some("weft"));
    }

    // Identity matching: reordering object items moves their rows.
    let before = element_children(&root);
    users.reverse();
    weft.watch.touch(&obj, "users");
    assert_eq!(texts(&root), ["bob", "alice"]);
    assert!(element_children(&root)[0].ptr_eq(&before[1]));
}

#[test]
fn editing_an_item_rerenders_only_its_row() {
    let weft = Weft::new();
    let data = Value::from(json!({ "users": [{ "name": "alice" }, { "name": "bob" }] }));
    let obj = root_object(&data);
    let users = list(&obj, "users");
    let first = match users.get(0) {
        Value::Object(user) => user,
        _ => panic!("expected object item"),
    };

    let root = Node::element("ul").with_child(
        Node::element("li")
            .with_attr("w-each-user", "users")
            .with_attr("w-text", "user.name"),
    );
    let _section = weft.bind(&root, data).unwrap();

    let before = element_children(&root);
    weft.watch.set(&first, "name", Value::from("alicia"));
    assert_eq!(texts(&root), ["alicia", "bob"]);
    // Same rows: the list itself was never reconciled.
    assert!(element_children(&root)[0].ptr_eq(&before[0]));
}

#[test]
fn non_list_values_render_nothing() {
    let mut weft = Weft::new();
    let count = counted(&mut weft);
    let (root, obj, _items, _section) = bind_names(&weft, &["a", "b"]);
    assert_eq!(*count.borrow(), 2);

    // Replacing the list with any non-iterable value destroys every
    // section and renders nothing.
    let non_iterables = [
        Value::Undefined,
        Value::Null,
        Value::Bool(true),
        Value::Number(5.0),
        Value::from("oops"),
        Value::from(json!({ "0": "x" })),
    ];
    for value in non_iterables {
        weft.watch.set(&obj, "names", value);
        assert_eq!(texts(&root), Vec::<String>::new());
    }

    // And a later list value builds them back up.
    let fresh = ListRef::new();
    fresh.push(Value::from("z"));
    weft.watch.set(&obj, "names", Value::List(fresh));
    assert_eq!(texts(&root), ["z"]);
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn each_under_if_survives_a_toggle() {
    let weft = Weft::new();
    let data = Value::from(json!({ "show": true, "names": ["a", "b"] }));
    let obj = root_object(&data);

    let block = Node::element("section").with_attr("w-if", "show").with_child(
        Node::element("li")
            .with_attr("w-each-name", "names")
            .with_attr("w-text", "name"),
    );
    let root = Node::element("div").with_child(block.clone());
    let _section = weft.bind(&root, data).unwrap();
    assert_eq!(texts(&block), ["a", "b"]);

    weft.watch.set(&obj, "show", Value::Bool(false));
    assert!(!root.contains(&block));

    // List edits made while hidden render on re-attachment.
    list(&obj, "names").push(Value::from("c"));
    weft.watch.set(&obj, "show", Value::Bool(true));
    assert!(root.contains(&block));
    assert_eq!(texts(&block), ["a", "b", "c"]);
}
