//! rxstate: path-addressed reactive state.
//!
//! One JSON state tree, mutated only through typed actions and the reducer
//! rules bound to its paths. Derived values are recomputed whenever a path
//! they depend on changes.
//!
//! # Primitives
//!
//! - `dispatch(envelope)`: broadcast an action to the rules bound to its tag
//! - `reducer(path, initial, setup)`: bind rules to a path, get its accessor
//! - `computed(path, deps, compute)`: bind a value derived from other paths
//! - `get(path)` / `read(path)`: read settled state
//! - `subscribe(path)`: observe writes
//!
//! # Path Addressing
//!
//! Paths are dot-separated segment lists: `editor.document.nodes`. A write
//! at a path notifies dependencies at the path itself, at its ancestors
//! (`editor.document`) and at its descendants (`editor.document.nodes.n1`).
//! Matching is per segment, so `editorX.document` is unrelated to `editor`.
//!
//! Typed keys come from string literals or from a schema:
//!
//! ```ignore
//! #[derive(StatePaths)]
//! #[state_path(rename_all = "camelCase")]
//! struct Store {
//!     selected_id: Option<String>,
//!     #[state_path(nested)]
//!     editor: Editor,
//! }
//!
//! let key = rxstate::paths::<Store>().selected_id(); // Key<Option<String>>
//! assert_eq!(key.to_string(), "selectedId");
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rxstate::{Action, Rx};
//!
//! const INCREMENT: Action<i64> = Action::define("counter.increment");
//!
//! let rx = Rx::new();
//! let counter = rx.reducer("counter", 0, |on| {
//!     on.on(INCREMENT, |count, amount| count + amount);
//! })?;
//! let doubled = rx.reducer("doubled", 0, |on| {
//!     on.on_path("counter", |count: i64| count * 2);
//! })?;
//!
//! rx.dispatch(INCREMENT.create(3))?;
//! assert_eq!(doubled.get(), 6);
//! ```

extern crate self as rxstate;

pub mod action;
pub mod app;
mod bus;
pub mod config;
pub mod error;
pub mod path;
pub mod reducer;
mod registry;
pub mod rules;
pub mod store;
mod trie;
pub mod value;

// Re-export primary types at crate root.
pub use action::{Action, ActionEvent, Envelope, Payload};
pub use app::Rx;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use path::{paths, Key, Path, PathSchema};
pub use reducer::Accessor;
pub use registry::Subscription;
pub use rules::{Dependencies, Rules};
pub use store::StateStore;
pub use value::{Change, SubscriptionId};

#[cfg(feature = "derive")]
pub use rxstate_derive::StatePaths;
