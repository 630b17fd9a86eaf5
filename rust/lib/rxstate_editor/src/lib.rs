//! Visual HTML editor state built on rxstate.
//!
//! - `schema`: shape of the state tree and its typed paths
//! - `actions`: everything the UI can dispatch
//! - `reducers`: the bindings that turn actions into state
//!
//! ```ignore
//! let rx = Rx::new();
//! let editor = EditorState::register(&rx)?;
//!
//! rx.dispatch(LOAD_DOCUMENT.create(Document::from_root(root)))?;
//! rx.dispatch(SELECT.create(NodeRect::new("n1", rect)))?;
//! rx.dispatch(ENTER_EDIT.create(()))?;
//! assert_eq!(editor.status.get(), "Editing: n1");
//! ```

pub mod actions;
pub mod reducers;
pub mod schema;
pub mod types;

pub use reducers::EditorState;
pub use schema::StoreSchema;
pub use types::{Document, EditorMode, HtmlNode, NodeKind, NodeRect, Rect};
