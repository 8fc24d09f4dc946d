//! Derive macros for Reducible
//!
//! This crate provides procedural macros to reduce boilerplate when writing
//! action enums.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Maps every variant to its `type` string and
//!   implements `reducible_core::action::Action`
//!
//! # Example
//!
//! ```ignore
//! use reducible_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(domain = "todos")]
//! enum TodosAction {
//!     TodoAdded(String),
//!     TodoToggled(u64),
//!
//!     #[action(type = "todos/allCleared")]
//!     ClearAll,
//! }
//!
//! // Generated methods:
//! assert_eq!(TodosAction::TodoAdded("Buy milk".into()).type_name(), "todos/todoAdded");
//! assert_eq!(TodosAction::ClearAll.type_name(), "todos/allCleared");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro for action enums
///
/// Generates:
/// - `type_name()` - The `type` string of this variant
/// - `TYPES` - Every `type` string of the enum, in declaration order
/// - an `impl reducible_core::action::Action` returning `type_name()`
///
/// # Attributes
///
/// - `#[action(domain = "...")]` on the enum - Variants without an explicit
///   type become `"<domain>/<variantInLowerCamelCase>"`
/// - `#[action(type = "...")]` on a variant - Explicit `type` string
///
/// When actions also cross a JSON boundary, give each variant a matching
/// `#[serde(rename = "...")]` so decoding uses the same strings.
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant has no explicit type and the enum has no domain
/// - A type string is empty or used by two variants
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(domain = "counter")]
/// enum CounterAction {
///     Increment,
///     Decrement,
///     IncrementByAmount(i64),
/// }
///
/// assert_eq!(CounterAction::IncrementByAmount(2).type_name(), "counter/incrementByAmount");
/// assert_eq!(CounterAction::TYPES.len(), 3);
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_action(&input) {
        Ok(expanded) => expanded.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand_action(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let domain = parse_action_attr(&input.attrs, "domain")?;

    let mut type_names: Vec<String> = Vec::with_capacity(data_enum.variants.len());
    let mut arms = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;

        let type_name = match parse_action_attr(&variant.attrs, "type")? {
            Some(explicit) => explicit.value(),
            None => match &domain {
                Some(domain) => {
                    format!("{}/{}", domain.value(), lower_camel(&variant_name.to_string()))
                },
                None => {
                    return Err(syn::Error::new_spanned(
                        variant,
                        "Variant needs #[action(type = \"...\")] or the enum needs #[action(domain = \"...\")]",
                    ));
                },
            },
        };

        if type_name.is_empty() {
            return Err(syn::Error::new_spanned(variant, "Action type must not be empty"));
        }

        if type_names.contains(&type_name) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("Action type \"{type_name}\" is used by more than one variant"),
            ));
        }

        arms.push(match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } => #type_name, },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) => #type_name, },
            Fields::Unit => quote! { Self::#variant_name => #type_name, },
        });
        type_names.push(type_name);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // An empty enum has no values to match on
    let type_name_body = if arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#arms)*
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Every action type of this enum, in declaration order
            pub const TYPES: &'static [&'static str] = &[#(#type_names),*];

            /// The action type of this variant
            #[must_use]
            pub const fn type_name(&self) -> &'static str {
                #type_name_body
            }
        }

        impl #impl_generics ::reducible_core::action::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> ::core::option::Option<&str> {
                ::core::option::Option::Some(self.type_name())
            }
        }
    })
}

/// Read `#[action(key = "...")]` from an attribute list
fn parse_action_attr(attrs: &[Attribute], key: &str) -> syn::Result<Option<LitStr>> {
    let mut found = None;

    for attr in attrs.iter().filter(|attr| has_attribute(attr, "action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                found = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported action attribute, expected `{key}`")))
            }
        })?;
    }

    Ok(found)
}

/// Helper function to check if an attribute has a specific name
fn has_attribute(attr: &Attribute, name: &str) -> bool {
    attr.path().is_ident(name)
}

/// `IncrementByAmount` -> `incrementByAmount`
fn lower_camel(ident: &str) -> String {
    let mut chars = ident.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("Increment"), "increment");
        assert_eq!(lower_camel("IncrementByAmount"), "incrementByAmount");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn test_domain_derives_type_names() {
        let input: DeriveInput = syn::parse_quote! {
            #[action(domain = "counter")]
            enum CounterAction {
                Increment,
                IncrementByAmount(i64),
            }
        };

        let expanded = expand_action(&input).map(|tokens| tokens.to_string());
        assert!(matches!(&expanded, Ok(code) if code.contains("\"counter/incrementByAmount\"")));
    }

    #[test]
    fn test_missing_type_is_error() {
        let input: DeriveInput = syn::parse_quote! {
            enum Untyped {
                Increment,
            }
        };
        assert!(expand_action(&input).is_err());
    }

    #[test]
    fn test_duplicate_type_is_error() {
        let input: DeriveInput = syn::parse_quote! {
            enum Twice {
                #[action(type = "a/b")]
                First,
                #[action(type = "a/b")]
                Second,
            }
        };
        assert!(expand_action(&input).is_err());
    }

    #[test]
    fn test_struct_is_error() {
        let input: DeriveInput = syn::parse_quote! {
            struct NotAnEnum;
        };
        assert!(expand_action(&input).is_err());
    }

    #[test]
    fn test_wrong_key_is_error() {
        let input: DeriveInput = syn::parse_quote! {
            enum Wrong {
                #[action(kind = "a/b")]
                First,
            }
        };
        assert!(expand_action(&input).is_err());
    }
}
