use std::collections::BTreeMap;

use rxstate::{Accessor, Rx, StoreError};
use tracing::debug;

use crate::actions::*;
use crate::schema;
use crate::types::{Document, EditorMode, HtmlNode, NodeRect, Rect};

/// Accessors for every editor binding.
///
/// Bind once per [`Rx`] with [`EditorState::register`]; registering again on
/// the same context returns the same accessors.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub mode: Accessor<EditorMode>,
    pub document: Accessor<Document>,
    pub selected_id: Accessor<Option<String>>,
    pub bounding_rects: Accessor<BTreeMap<String, Rect>>,
    pub hovered_id: Accessor<Option<String>>,
    pub status: Accessor<String>,
    pub node_count: Accessor<usize>,
    pub selected_node: Accessor<Option<HtmlNode>>,
}

impl EditorState {
    /// Bind the editor reducers on `rx`.
    ///
    /// Source bindings go first so the computed ones can read them.
    pub fn register(rx: &Rx) -> Result<Self, StoreError> {
        let paths = schema::store();

        let mode = rx.reducer(paths.editor().mode(), EditorMode::default(), |on| {
            on.on(SET_MODE, |_, mode| *mode);
            on.on(ENTER_EDIT, |_, _| EditorMode::Edit);
            on.on(ENTER_VIEW, |_, _| EditorMode::View);
            on.on(ENTER_SELECT, |_, _| EditorMode::Select);
            on.on(TOGGLE_EDIT, |_, edit| {
                if *edit {
                    EditorMode::Edit
                } else {
                    EditorMode::Select
                }
            });
        })?;

        let document = rx.reducer(paths.editor().document().as_key(), Document::empty(), |on| {
            on.on(LOAD_DOCUMENT, |_, document| document.clone());
        })?;

        let selected_id = rx.reducer(paths.selection().selected_id(), None, |on| {
            on.on(SELECT, |_, target| Some(target.id.clone()));
            on.on(DESELECT, |_, _| None);
        })?;

        let bounding_rects = rx.reducer(paths.selection().bounding_rects(), BTreeMap::new(), |on| {
            on.merge([SELECT, RESIZE, CONTENT_CHANGED], record_rect);
        })?;

        let hovered_id = rx.reducer(paths.hover().node_id(), None, |on| {
            on.on(HOVER_ENTER, |_, id| Some(id.clone()));
            on.on(HOVER_LEAVE, |_, _| None);
        })?;

        let status = rx.reducer(paths.editor().status(), String::new(), |on| {
            on.combine(
                (paths.editor().mode(), paths.selection().selected_id()),
                |(mode, id)| describe(mode, id.as_deref()),
            )
            .distinct();
        })?;

        let node_count = rx.computed(
            paths.editor().node_count(),
            (paths.editor().document().nodes(),),
            |(nodes,): (BTreeMap<String, HtmlNode>,)| nodes.len(),
        )?;

        let selected_node = rx.reducer(paths.selection().node(), None, |on| {
            on.combine(
                (
                    paths.selection().selected_id(),
                    paths.editor().document().nodes(),
                ),
                |(id, nodes)| id.and_then(|id| nodes.get(&id).cloned()),
            );
        })?;

        debug!("editor reducers bound");
        Ok(Self {
            mode,
            document,
            selected_id,
            bounding_rects,
            hovered_id,
            status,
            node_count,
            selected_node,
        })
    }
}

fn record_rect(mut rects: BTreeMap<String, Rect>, target: &NodeRect) -> BTreeMap<String, Rect> {
    rects.insert(target.id.clone(), target.rect);
    rects
}

/// One-line status for the current mode and selection.
pub fn describe(mode: EditorMode, selected: Option<&str>) -> String {
    match (mode, selected) {
        (EditorMode::Edit, Some(id)) => format!("Editing: {id}"),
        (EditorMode::Select, Some(id)) => format!("Selected: {id}"),
        _ => "idle".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxstate::StoreConfig;

    fn setup() -> (Rx, EditorState) {
        let rx = Rx::with_config(StoreConfig::quiet());
        let editor = EditorState::register(&rx).unwrap();
        (rx, editor)
    }

    fn sample_document() -> Document {
        Document::from_root(
            HtmlNode::element("n0", "main")
                .with_child(HtmlNode::element("n1", "h1").with_child(HtmlNode::text("n2", "Title")))
                .with_child(HtmlNode::element("n3", "p")),
        )
    }

    // ========================================================================
    // Mode
    // ========================================================================

    #[test]
    fn mode_defaults_to_select() {
        let (_, editor) = setup();
        assert_eq!(editor.mode.get(), EditorMode::Select);
    }

    #[test]
    fn mode_actions() {
        let (rx, editor) = setup();
        rx.dispatch(ENTER_EDIT.create(())).unwrap();
        assert_eq!(editor.mode.get(), EditorMode::Edit);
        rx.dispatch(ENTER_VIEW.create(())).unwrap();
        assert_eq!(editor.mode.get(), EditorMode::View);
        rx.dispatch(SET_MODE.create(EditorMode::Edit)).unwrap();
        assert_eq!(editor.mode.get(), EditorMode::Edit);
        rx.dispatch(TOGGLE_EDIT.create(false)).unwrap();
        assert_eq!(editor.mode.get(), EditorMode::Select);
        rx.dispatch(TOGGLE_EDIT.create(true)).unwrap();
        assert_eq!(editor.mode.get(), EditorMode::Edit);
        rx.dispatch(ENTER_SELECT.create(())).unwrap();
        assert_eq!(rx.get(schema::store().editor().mode()).unwrap(), EditorMode::Select);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[test]
    fn select_records_id_and_rect() {
        let (rx, editor) = setup();
        let rect = Rect::new(1.0, 2.0, 30.0, 40.0);
        rx.dispatch(SELECT.create(NodeRect::new("n1", rect))).unwrap();

        assert_eq!(editor.selected_id.get().as_deref(), Some("n1"));
        assert_eq!(editor.bounding_rects.get().get("n1"), Some(&rect));
    }

    #[test]
    fn resize_updates_rect_and_deselect_keeps_it() {
        let (rx, editor) = setup();
        rx.dispatch(SELECT.create(NodeRect::new("n1", Rect::default()))).unwrap();
        let bigger = Rect::new(0.0, 0.0, 100.0, 50.0);
        rx.dispatch(RESIZE.create(NodeRect::new("n1", bigger))).unwrap();
        rx.dispatch(DESELECT.create(())).unwrap();

        assert_eq!(editor.selected_id.get(), None);
        assert_eq!(editor.bounding_rects.get().get("n1"), Some(&bigger));
    }

    #[test]
    fn hover_enter_and_leave() {
        let (rx, editor) = setup();
        rx.dispatch(HOVER_ENTER.create("n3".to_string())).unwrap();
        assert_eq!(editor.hovered_id.get().as_deref(), Some("n3"));
        rx.dispatch(HOVER_LEAVE.create(())).unwrap();
        assert_eq!(editor.hovered_id.get(), None);
    }

    // ========================================================================
    // Computed
    // ========================================================================

    #[test]
    fn status_follows_mode_and_selection() {
        let (rx, editor) = setup();
        assert_eq!(editor.status.get(), "idle");

        rx.dispatch(SELECT.create(NodeRect::new("n1", Rect::default()))).unwrap();
        assert_eq!(editor.status.get(), "Selected: n1");
        rx.dispatch(ENTER_EDIT.create(())).unwrap();
        assert_eq!(editor.status.get(), "Editing: n1");
        rx.dispatch(ENTER_VIEW.create(())).unwrap();
        assert_eq!(editor.status.get(), "idle");
    }

    #[test]
    fn node_count_follows_document() {
        let (rx, editor) = setup();
        assert_eq!(editor.node_count.get(), 1);
        rx.dispatch(LOAD_DOCUMENT.create(sample_document())).unwrap();
        assert_eq!(editor.node_count.get(), 4);
        assert_eq!(editor.document.get().root.id, "n0");
    }

    #[test]
    fn selected_node_resolves_against_document() {
        let (rx, editor) = setup();
        rx.dispatch(SELECT.create(NodeRect::new("n3", Rect::default()))).unwrap();
        assert_eq!(editor.selected_node.get(), None);

        rx.dispatch(LOAD_DOCUMENT.create(sample_document())).unwrap();
        let node = editor.selected_node.get().unwrap();
        assert_eq!(node.tag_name.as_deref(), Some("p"));
        assert_eq!(node.parent.as_deref(), Some("n0"));
    }

    #[test]
    fn register_twice_returns_same_accessors() {
        let (rx, editor) = setup();
        let again = EditorState::register(&rx).unwrap();
        assert!(editor.mode.ptr_eq(&again.mode));
        assert!(editor.status.ptr_eq(&again.status));
    }

    #[test]
    fn status_skips_unchanged_text() {
        let (rx, editor) = setup();
        rx.dispatch(SELECT.create(NodeRect::new("n1", Rect::default()))).unwrap();
        let version = editor.status.version();

        // Rewrites the mode with its current value.
        rx.dispatch(ENTER_SELECT.create(())).unwrap();
        assert_eq!(editor.status.get(), "Selected: n1");
        assert_eq!(editor.status.version(), version);
    }

    #[test]
    fn describe_status() {
        assert_eq!(describe(EditorMode::Edit, Some("n1")), "Editing: n1");
        assert_eq!(describe(EditorMode::Edit, None), "idle");
        assert_eq!(describe(EditorMode::View, Some("n1")), "idle");
    }
}
