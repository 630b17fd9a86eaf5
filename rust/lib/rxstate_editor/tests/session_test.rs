//! Full editor session through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use rxstate::{paths, Rx, StoreConfig};
use rxstate_editor::actions::*;
use rxstate_editor::{Document, EditorMode, EditorState, HtmlNode, NodeRect, Rect, StoreSchema};
use serde_json::json;

fn document() -> Document {
    Document::from_root(
        HtmlNode::element("n0", "main")
            .with_child(HtmlNode::element("n1", "h1").with_child(HtmlNode::text("n2", "Hi")))
            .with_child(HtmlNode::element("n3", "button").with_attr("class", "btn")),
    )
}

#[test]
fn test_schema_paths_match_state_tree() {
    let schema = paths::<StoreSchema>();
    assert_eq!(schema.selection().selected_id().to_string(), "selection.selectedId");
    assert_eq!(
        schema.editor().document().nodes().to_string(),
        "editor.document.nodes"
    );

    let rx = Rx::with_config(StoreConfig::quiet());
    EditorState::register(&rx).unwrap();
    for key in [
        schema.selection().selected_id().path().clone(),
        schema.selection().node().path().clone(),
        schema.editor().status().path().clone(),
        schema.editor().node_count().path().clone(),
        schema.hover().node_id().path().clone(),
    ] {
        assert!(rx.contains(key.clone()), "{key} should be seeded");
    }
}

#[test]
fn test_select_then_edit_session() {
    let rx = Rx::with_config(StoreConfig::quiet());
    let editor = EditorState::register(&rx).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    rx.tap_actions(move |event| l.borrow_mut().push(event.tag));

    rx.dispatch(LOAD_DOCUMENT.create(document())).unwrap();
    rx.dispatch(HOVER_ENTER.create("n1".into())).unwrap();
    rx.dispatch(SELECT.create(NodeRect::new("n1", Rect::new(0.0, 0.0, 200.0, 40.0))))
        .unwrap();
    rx.dispatch(ENTER_EDIT.create(())).unwrap();

    assert_eq!(editor.status.get(), "Editing: n1");
    assert_eq!(editor.node_count.get(), 4);
    assert_eq!(
        editor.selected_node.get().and_then(|node| node.tag_name),
        Some("h1".to_string())
    );
    assert_eq!(
        *log.borrow(),
        vec![
            "editor.loadDocument",
            "hover.enter",
            "selection.select",
            "editor.enterEdit"
        ]
    );

    let snapshot = rx.snapshot();
    assert_eq!(snapshot["editor"]["mode"], json!("edit"));
    assert_eq!(snapshot["hover"]["nodeId"], json!("n1"));
    assert_eq!(snapshot["selection"]["boundingRects"]["n1"]["width"], json!(200.0));
}

#[test]
fn test_reload_keeps_editor_state() {
    let rx = Rx::with_config(StoreConfig::quiet());
    EditorState::register(&rx).unwrap();
    rx.dispatch(LOAD_DOCUMENT.create(document())).unwrap();
    rx.dispatch(SET_MODE.create(EditorMode::View)).unwrap();

    assert!(rx.reload() > 0);
    assert!(!rx.is_bound("editor.mode"));

    let editor = EditorState::register(&rx).unwrap();
    assert_eq!(editor.mode.get(), EditorMode::View);
    assert_eq!(editor.node_count.get(), 4);

    rx.dispatch(TOGGLE_EDIT.create(true)).unwrap();
    assert_eq!(editor.mode.get(), EditorMode::Edit);
}
