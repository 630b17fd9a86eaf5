//! Editor actions.

use rxstate::Action;

use crate::types::{Document, EditorMode, NodeRect};

// ============================================================================
// Mode
// ============================================================================

pub const SET_MODE: Action<EditorMode> = Action::define("editor.setMode");
pub const ENTER_EDIT: Action = Action::define("editor.enterEdit");
pub const ENTER_VIEW: Action = Action::define("editor.enterView");
pub const ENTER_SELECT: Action = Action::define("editor.enterSelect");
/// `true` enters edit mode, `false` falls back to select mode.
pub const TOGGLE_EDIT: Action<bool> = Action::define("editor.toggleEdit");

// ============================================================================
// Document
// ============================================================================

pub const LOAD_DOCUMENT: Action<Document> = Action::define("editor.loadDocument");

// ============================================================================
// Selection
// ============================================================================

pub const SELECT: Action<NodeRect> = Action::define("selection.select");
pub const DESELECT: Action = Action::define("selection.deselect");
pub const RESIZE: Action<NodeRect> = Action::define("selection.resize");
pub const CONTENT_CHANGED: Action<NodeRect> = Action::define("selection.contentChanged");

// ============================================================================
// Hover
// ============================================================================

/// Payload is the hovered node's id.
pub const HOVER_ENTER: Action<String> = Action::define("hover.enter");
pub const HOVER_LEAVE: Action = Action::define("hover.leave");
