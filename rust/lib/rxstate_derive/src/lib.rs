//! rxstate proc macros.
//!
//! - `#[derive(StatePaths)]`: generate typed path accessors for a state schema
//!
//! The generated code refers to `::rxstate`, so use the macro through the
//! `rxstate` re-export.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod paths;

/// Generate typed path accessors for a state schema.
///
/// ```ignore
/// #[derive(StatePaths)]
/// #[state_path(rename_all = "camelCase")]
/// pub struct StoreSchema {
///     pub selected_id: Option<String>,
///     #[state_path(nested)]
///     pub editor: EditorSchema,
///     #[state_path(rename = "hover")]
///     pub hovered: Option<String>,
///     #[state_path(skip)]
///     pub scratch: (),
/// }
/// ```
///
/// Generates:
/// - `pub struct StoreSchemaPaths` with one method per field. Plain fields
///   return `rxstate::Key<FieldType>`; `nested` fields return the field
///   type's own paths node.
/// - `impl rxstate::PathSchema for StoreSchema`
///
/// `rxstate::paths::<StoreSchema>().editor().mode()` then yields the key for
/// `"editor.mode"`.
#[proc_macro_derive(StatePaths, attributes(state_path))]
pub fn derive_state_paths(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    paths::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
