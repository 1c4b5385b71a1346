//! Tests for longer mutation sequences
//!
//! This tests:
//! - Insert / move / remove chains keep the tree consistent
//! - Failed mutations leave no trace
//! - Observers see exactly the successful changes
//! - Scoped rules follow renames and removals

use pagecraft_editor::{
    BlockRegistry, DeviceManager, Document, DocumentChange, EditorError, Mutation, NodeSpec,
    StyleTarget, ROOT_ID,
};
use std::cell::RefCell;
use std::rc::Rc;

fn doc() -> Document {
    Document::new(DeviceManager::default())
}

fn tags(doc: &Document, parent: &str) -> Vec<String> {
    doc.children(parent)
        .unwrap()
        .iter()
        .map(|id| doc.node(id).unwrap().tag().unwrap_or("#text").to_string())
        .collect()
}

#[test]
fn test_insert_move_remove_chain() {
    let mut doc = doc();
    let list = doc
        .insert(ROOT_ID, 0, "<ul><li>One</li><li>Two</li><li>Three</li></ul>")
        .unwrap();
    let aside = doc.insert(ROOT_ID, 1, "<aside></aside>").unwrap();
    let items = doc.children(&list).unwrap().to_vec();

    doc.move_node(&items[0], &list, 2).unwrap();
    doc.move_node(&items[1], &aside, 0).unwrap();
    doc.validate_tree().unwrap();

    assert_eq!(doc.children(&list).unwrap(), &[items[2].clone(), items[0].clone()]);
    assert_eq!(doc.parent(&items[1]), Some(aside.as_str()));

    doc.remove(&list).unwrap();
    doc.validate_tree().unwrap();
    assert!(!doc.contains(&items[0]));
    assert!(doc.contains(&items[1]));
    assert_eq!(tags(&doc, ROOT_ID), vec!["aside"]);
}

#[test]
fn test_many_random_like_operations_keep_invariants() {
    let mut doc = doc();
    let mut containers = vec![ROOT_ID.to_string()];

    for i in 0..30 {
        let parent = containers[i % containers.len()].clone();
        let len = doc.children(&parent).unwrap().len();
        let id = doc
            .insert(&parent, i % (len + 1), "<div><span>x</span></div>")
            .unwrap();
        containers.push(id);

        if i % 3 == 2 {
            let node = containers[i].clone();
            let target = containers[(i * 7) % containers.len()].clone();
            let len = doc.children(&target).unwrap().len();
            match doc.move_node(&node, &target, len.saturating_sub(1)) {
                Ok(()) | Err(EditorError::CycleDetected { .. }) | Err(EditorError::InvalidOperation(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        doc.validate_tree().unwrap();
    }

    let victim = containers[5].clone();
    if doc.contains(&victim) {
        doc.remove(&victim).unwrap();
    }
    doc.validate_tree().unwrap();
}

#[test]
fn test_move_into_descendant_changes_nothing() {
    let mut doc = doc();
    let outer = doc
        .insert(ROOT_ID, 0, "<section><div><p>deep</p></div></section>")
        .unwrap();
    let inner = doc.children(&outer).unwrap()[0].clone();
    let p = doc.children(&inner).unwrap()[0].clone();
    let before = doc.serialize_markup();
    let version = doc.version();

    for target in [&outer, &inner, &p] {
        let result = doc.move_node(&outer, target, 0);
        assert!(matches!(result, Err(EditorError::CycleDetected { .. })));
    }

    doc.validate_tree().unwrap();
    assert_eq!(doc.serialize_markup(), before);
    assert_eq!(doc.version(), version);
}

#[test]
fn test_move_index_is_checked_after_detaching() {
    let mut doc = doc();
    doc.insert(ROOT_ID, 0, "<a></a><b></b><i></i>").unwrap();
    let a = doc.children(ROOT_ID).unwrap()[0].clone();

    // Three children, one of them moving: valid indices are 0..=2
    assert!(matches!(
        doc.move_node(&a, ROOT_ID, 3),
        Err(EditorError::InvalidIndex { index: 3, len: 2 })
    ));
    doc.move_node(&a, ROOT_ID, 2).unwrap();
    assert_eq!(tags(&doc, ROOT_ID), vec!["b", "i", "a"]);
}

#[test]
fn test_failed_block_parse_is_atomic() {
    let mut registry = BlockRegistry::new();
    registry
        .register(pagecraft_editor::Block::markup(
            "broken",
            "Broken",
            "Basic",
            "<div><p>unterminated</div>",
        ))
        .unwrap();

    let mut doc = Document::starter(DeviceManager::default()).unwrap();
    let before = doc.serialize_markup();

    let err = registry.instantiate("broken", &mut doc, ROOT_ID, 1).unwrap_err();
    assert!(matches!(err, EditorError::Parse(_)));
    assert_eq!(doc.serialize_markup(), before);
    assert_eq!(doc.version(), 0);
}

#[test]
fn test_observers_see_successful_changes_only() {
    let mut doc = doc();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    doc.subscribe(move |change: &DocumentChange| sink.borrow_mut().push(change.clone()));

    let id = doc.insert(ROOT_ID, 0, "<p>hi</p>").unwrap();
    assert!(doc.insert(ROOT_ID, 5, "<p>no</p>").is_err());
    assert!(doc.remove(ROOT_ID).is_err());
    doc.set_style(&id, Some("mobile"), "color", "red").unwrap();
    doc.remove(&id).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert!(matches!(&log[0], DocumentChange::Inserted { node_ids, .. } if node_ids == &vec![id.clone()]));
    assert_eq!(
        log[1],
        DocumentChange::StyleChanged {
            target: StyleTarget::Node(id.clone()),
            device_id: Some("mobile".to_string()),
            property: "color".to_string(),
        }
    );
    assert!(matches!(&log[2], DocumentChange::Removed { removed, .. } if removed.len() == 2));
}

#[test]
fn test_rules_follow_rename_and_removal() {
    let mut doc = doc();
    let id = doc.insert(ROOT_ID, 0, "<section><h2>Title</h2></section>").unwrap();
    doc.set_style(&id, Some("tablet"), "padding", "12px").unwrap();

    doc.set_attribute(&id, "id", "services").unwrap();
    assert!(doc.rules().node_rule(&id, "tablet").is_none());
    assert_eq!(
        doc.rules().node_rule("services", "tablet").unwrap()["padding"],
        "12px"
    );
    assert!(doc
        .serialize_markup()
        .stylesheet
        .contains("@media (max-width: 555px){#services{padding:12px;}}"));

    doc.remove("services").unwrap();
    assert!(doc.rules().scoped.is_empty());
    assert!(doc.serialize_markup().stylesheet.is_empty());
}

#[test]
fn test_mutations_replay_from_json() {
    let mutations = vec![
        Mutation::InsertNodes {
            parent_id: ROOT_ID.to_string(),
            index: 0,
            tree: NodeSpec::element("main").with_id("content").into(),
        },
        Mutation::InsertNodes {
            parent_id: "content".to_string(),
            index: 0,
            tree: NodeSpec::element("h1")
                .with_child(NodeSpec::text("Hello"))
                .into(),
        },
        Mutation::SetStyle {
            target: StyleTarget::Node("content".to_string()),
            device_id: None,
            property: "padding".to_string(),
            value: "24px".to_string(),
        },
    ];

    let json = serde_json::to_string(&mutations).unwrap();
    let replayed: Vec<Mutation> = serde_json::from_str(&json).unwrap();

    let mut doc = doc();
    for mutation in replayed {
        doc.apply(mutation).unwrap();
    }

    assert_eq!(doc.version(), 3);
    let out = doc.serialize_markup();
    assert_eq!(out.markup, r#"<main id="content"><h1>Hello</h1></main>"#);
    assert_eq!(out.stylesheet, "#content{padding:24px;}");
}
