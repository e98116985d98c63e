//! Derive macro for exo-changeset record schemas
//!
//! This crate provides `#[derive(Record)]`, which generates the static field
//! table and slot accessor a changeset needs to cast a payload into a struct.
//!
//! # Example
//!
//! ```rust,ignore
//! use exo_changeset::Record;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Post {
//!     title: String,
//!     #[record(rename = "viewCount")]
//!     views: i64,
//!     #[record(readonly)]
//!     slug: String,
//!     #[record(skip)]
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, LitStr};

/// Derive the `Record` trait for a struct with named fields
///
/// ## Field attributes
///
/// - `#[record(rename = "...")]`: payload key for the field (default: the
///   field name)
/// - `#[record(readonly)]`: the field is in the schema, so casts accept and
///   validate it, but it has no slot and apply skips it
/// - `#[record(skip)]`: the field is not part of the schema at all
///
/// # Generated Code
///
/// The macro generates `impl exo_changeset::Record for YourStruct` with
/// `schema()`, `assign()` and `to_params()`. Every field type that takes part
/// must implement `exo_changeset::FieldValue`.
///
/// Enums, unions, tuple structs and unit structs are rejected at compile
/// time: a record must be a struct with named fields.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_record_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed `#[record(...)]` options of one field
#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    readonly: bool,
    skip: bool,
}

fn derive_record_impl(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let name = &input.ident;

    let data_struct = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let named = match &data_struct.fields {
        Fields::Named(named) => named,
        _ => {
            return Err(Error::new_spanned(
                &input,
                "Record can only be derived for structs with named fields",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut assign_arms = Vec::new();
    let mut param_inserts = Vec::new();
    let mut seen_keys = std::collections::HashSet::new();

    for field in &named.named {
        let options = parse_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }

        // Named fields always carry an ident
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let key = options.rename.unwrap_or_else(|| ident.to_string());

        if !seen_keys.insert(key.clone()) {
            return Err(Error::new_spanned(
                field,
                format!(
                    "Duplicate record key \"{}\" - each field must have a unique key",
                    key
                ),
            ));
        }

        descriptors.push(quote! {
            ::exo_changeset::FieldDescriptor::of::<#ty>(#key)
        });

        if !options.readonly {
            assign_arms.push(quote! {
                #key => ::exo_changeset::Assign::write(&mut self.#ident, value)
            });
        }

        param_inserts.push(quote! {
            params.insert(
                ::std::string::String::from(#key),
                ::exo_changeset::FieldValue::to_value(&self.#ident),
            );
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::exo_changeset::Record for #name #ty_generics #where_clause {
            fn schema() -> ::exo_changeset::Schema {
                ::exo_changeset::Schema::new(::std::vec![#(#descriptors),*])
            }

            fn assign(
                &mut self,
                field: &str,
                value: &::exo_changeset::Value,
            ) -> ::exo_changeset::Assign {
                let _ = value;
                match field {
                    #(#assign_arms,)*
                    _ => ::exo_changeset::Assign::NoSlot,
                }
            }

            fn to_params(&self) -> ::exo_changeset::Params {
                let mut params = ::exo_changeset::Params::new();
                #(#param_inserts)*
                params
            }
        }
    };

    Ok(expanded)
}

/// Extract `#[record(rename = "...", readonly, skip)]` options
fn parse_field_options(attrs: &[syn::Attribute]) -> Result<FieldOptions, Error> {
    let mut options = FieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                options.rename = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("readonly") {
                options.readonly = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `rename`, `readonly` or `skip`"))
            }
        })?;
    }

    Ok(options)
}
