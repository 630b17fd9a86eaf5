//! `#[derive(StatePaths)]` expansion.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr};

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "StatePaths does not support generic schemas",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "StatePaths requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "StatePaths can only be derived for structs",
            ))
        }
    };

    let container = ContainerAttrs::parse(&input.attrs)?;
    let paths_name = format_ident!("{}Paths", name);

    let mut methods = Vec::new();
    for field in fields {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "field must have a name"))?;
        let segment = match attrs.rename {
            Some(rename) => rename,
            None => container.rename_all.apply(&ident.unraw().to_string()),
        };
        let ty = &field.ty;
        let doc = format!("Path `{segment}` below this node.");

        methods.push(if attrs.nested {
            quote! {
                #[doc = #doc]
                pub fn #ident(&self) -> <#ty as ::rxstate::PathSchema>::Paths {
                    <#ty as ::rxstate::PathSchema>::paths_at(self.path.child(#segment))
                }
            }
        } else {
            quote! {
                #[doc = #doc]
                pub fn #ident(&self) -> ::rxstate::Key<#ty> {
                    ::rxstate::Key::new(self.path.child(#segment))
                }
            }
        });
    }

    let struct_doc = format!("Path accessors for [`{name}`].");

    Ok(quote! {
        #[doc = #struct_doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        #vis struct #paths_name {
            path: ::rxstate::Path,
        }

        impl #paths_name {
            /// Path of this node.
            pub fn as_path(&self) -> &::rxstate::Path {
                &self.path
            }

            /// Key for the whole subtree at this node.
            pub fn as_key(&self) -> ::rxstate::Key<#name> {
                ::rxstate::Key::new(self.path.clone())
            }

            #(#methods)*
        }

        impl ::rxstate::PathSchema for #name {
            type Paths = #paths_name;

            fn paths_at(path: ::rxstate::Path) -> Self::Paths {
                #paths_name { path }
            }
        }

        impl ::std::fmt::Display for #paths_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.path, f)
            }
        }

        impl ::std::convert::From<#paths_name> for ::rxstate::Path {
            fn from(node: #paths_name) -> Self {
                node.path
            }
        }

        impl ::std::convert::From<&#paths_name> for ::rxstate::Path {
            fn from(node: &#paths_name) -> Self {
                node.path.clone()
            }
        }
    })
}

// ============================================================================
// Attributes
// ============================================================================

#[derive(Default)]
struct ContainerAttrs {
    rename_all: RenameRule,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("state_path")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename_all = RenameRule::from_lit(&lit)?;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename_all = \"...\"`"))
                }
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    nested: bool,
    skip: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("state_path")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let value = lit.value();
                    if value.is_empty() || value.contains('.') {
                        return Err(syn::Error::new(
                            lit.span(),
                            "rename must be a single non-empty path segment",
                        ));
                    }
                    out.rename = Some(value);
                    Ok(())
                } else if meta.path.is_ident("nested") {
                    out.nested = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename = \"...\"`, `nested` or `skip`"))
                }
            })?;
        }
        Ok(out)
    }
}

// ============================================================================
// Rename rules
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenameRule {
    /// Field name as written.
    #[default]
    None,
    CamelCase,
    PascalCase,
    KebabCase,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "camelCase" => Ok(Self::CamelCase),
            "PascalCase" => Ok(Self::PascalCase),
            "kebab-case" => Ok(Self::KebabCase),
            "snake_case" => Ok(Self::None),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename rule `{other}`, expected camelCase, PascalCase, kebab-case or snake_case"
                ),
            )),
        }
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::None => field.to_string(),
            Self::KebabCase => field.replace('_', "-"),
            Self::CamelCase | Self::PascalCase => {
                let mut out = String::with_capacity(field.len());
                let mut upper = self == Self::PascalCase;
                for ch in field.chars() {
                    if ch == '_' {
                        upper = !out.is_empty();
                    } else if upper {
                        out.extend(ch.to_uppercase());
                        upper = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}
