//! Shape of the editor's state tree.
//!
//! These structs are never instantiated; they only describe which path holds
//! which type. `rxstate::paths::<StoreSchema>()` is the entry point:
//!
//! ```ignore
//! let schema = rxstate::paths::<StoreSchema>();
//! let mode: Key<EditorMode> = schema.editor().mode();   // "editor.mode"
//! let nodes = schema.editor().document().nodes();       // "editor.document.nodes"
//! ```

use std::collections::BTreeMap;

use rxstate::{PathSchema, StatePaths};

use crate::types::{Document, EditorMode, HtmlNode, Rect};

#[derive(StatePaths)]
#[state_path(rename_all = "camelCase")]
pub struct StoreSchema {
    #[state_path(nested)]
    pub selection: SelectionSchema,
    #[state_path(nested)]
    pub editor: EditorSchema,
    #[state_path(nested)]
    pub hover: HoverSchema,
}

#[derive(StatePaths)]
#[state_path(rename_all = "camelCase")]
pub struct SelectionSchema {
    pub selected_id: Option<String>,
    pub bounding_rects: BTreeMap<String, Rect>,
    /// Computed: the selected node, looked up in the document.
    pub node: Option<HtmlNode>,
}

#[derive(StatePaths)]
#[state_path(rename_all = "camelCase")]
pub struct EditorSchema {
    #[state_path(nested)]
    pub document: Document,
    pub mode: EditorMode,
    /// Computed: one-line description of what the user is doing.
    pub status: String,
    /// Computed: number of nodes in the document.
    pub node_count: usize,
}

#[derive(StatePaths)]
#[state_path(rename_all = "camelCase")]
pub struct HoverSchema {
    pub node_id: Option<String>,
}

/// Path accessors for the whole editor state.
pub fn store() -> <StoreSchema as PathSchema>::Paths {
    rxstate::paths::<StoreSchema>()
}
