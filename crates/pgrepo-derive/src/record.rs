//! Record derive macro implementation
//!
//! - `attrs`: struct and field attribute parsing

mod attrs;

use crate::common::syn_types::{is_structured, option_inner};
use attrs::{FieldAttr, table_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Identifier,
    Scalar,
    Structured,
    Timestamp,
}

/// One struct field resolved to its column.
struct Column {
    ident: syn::Ident,
    name: String,
    kind: Kind,
    nullable: bool,
}

fn resolve(field: &syn::Field) -> Result<Column> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let attr = FieldAttr::from_field(field)?;
    let name = attr
        .column
        .clone()
        .unwrap_or_else(|| ident.unraw().to_string());

    let inner = option_inner(&field.ty);
    let nullable = inner.is_some();
    let ty = inner.unwrap_or(&field.ty);

    let kind = if attr.is_id {
        Kind::Identifier
    } else if attr.is_timestamp {
        Kind::Timestamp
    } else if attr.is_structured || is_structured(ty) {
        Kind::Structured
    } else if name == "id" {
        Kind::Identifier
    } else if name == "created_at" || name == "updated_at" {
        Kind::Timestamp
    } else {
        Kind::Scalar
    };

    Ok(Column {
        ident,
        name,
        kind,
        nullable,
    })
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let table = table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let columns = fields.iter().map(resolve).collect::<Result<Vec<_>>>()?;

    let identifiers = columns
        .iter()
        .filter(|c| c.kind == Kind::Identifier)
        .count();
    if identifiers > 1 {
        return Err(syn::Error::new_spanned(
            &input,
            "Record may have at most one identifier field",
        ));
    }
    for (i, c) in columns.iter().enumerate() {
        if columns[..i].iter().any(|prev| prev.name == c.name) {
            return Err(syn::Error::new_spanned(
                &c.ident,
                format!("duplicate column name '{}'", c.name),
            ));
        }
    }

    let descriptors = columns.iter().map(|c| {
        let column = &c.name;
        let base = match c.kind {
            Kind::Identifier => quote! { pgrepo::FieldDescriptor::identifier(#column) },
            Kind::Scalar => quote! { pgrepo::FieldDescriptor::scalar(#column) },
            Kind::Structured => quote! { pgrepo::FieldDescriptor::structured(#column) },
            Kind::Timestamp => quote! { pgrepo::FieldDescriptor::timestamp(#column) },
        };
        if c.nullable {
            quote! { #base.nullable() }
        } else {
            base
        }
    });

    let field_extracts = columns.iter().map(|c| {
        let ident = &c.ident;
        let column = &c.name;
        quote! { #ident: row.try_get(#column)? }
    });

    let column_consts = columns.iter().map(|c| {
        let const_name = format_ident!("COL_{}", c.ident.unraw().to_string().to_uppercase());
        let column = &c.name;
        quote! { pub const #const_name: &'static str = #column; }
    });

    Ok(quote! {
        impl #impl_generics pgrepo::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;
            const FIELDS: &'static [pgrepo::FieldDescriptor] = &[
                #(#descriptors),*
            ];

            fn from_row(row: &pgrepo::Row) -> pgrepo::OrmResult<Self> {
                ::std::result::Result::Ok(Self {
                    #(#field_extracts),*
                })
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #(#column_consts)*
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn kinds(input: DeriveInput) -> Vec<(String, Kind, bool)> {
        let Data::Struct(data) = &input.data else {
            panic!("expected struct");
        };
        data.fields
            .iter()
            .map(|f| {
                let c = resolve(f).unwrap();
                (c.name, c.kind, c.nullable)
            })
            .collect()
    }

    #[test]
    fn infers_kinds_from_names_and_types() {
        let input: DeriveInput = parse_quote! {
            struct Example {
                id: String,
                created_at: DateTime<Utc>,
                updated_at: DateTime<Utc>,
                flag: bool,
                metadata: Json<Metadata>,
                note: Option<String>,
            }
        };
        assert_eq!(
            kinds(input),
            vec![
                ("id".to_string(), Kind::Identifier, false),
                ("created_at".to_string(), Kind::Timestamp, false),
                ("updated_at".to_string(), Kind::Timestamp, false),
                ("flag".to_string(), Kind::Scalar, false),
                ("metadata".to_string(), Kind::Structured, false),
                ("note".to_string(), Kind::Scalar, true),
            ]
        );
    }

    #[test]
    fn attributes_override_inference() {
        let input: DeriveInput = parse_quote! {
            struct Account {
                #[orm(id, column = "account_id")]
                key: String,
                #[orm(timestamp)]
                seen: Option<DateTime<Utc>>,
                #[orm(structured)]
                raw: String,
            }
        };
        assert_eq!(
            kinds(input),
            vec![
                ("account_id".to_string(), Kind::Identifier, false),
                ("seen".to_string(), Kind::Timestamp, true),
                ("raw".to_string(), Kind::Structured, false),
            ]
        );
    }

    #[test]
    fn conflicting_markers_are_rejected() {
        let field: syn::Field = parse_quote! {
            #[orm(id, structured)]
            key: String
        };
        assert!(resolve(&field).is_err());
    }

    #[test]
    fn table_is_required() {
        let input: DeriveInput = parse_quote! {
            struct NoTable { id: String }
        };
        let err = expand(input).unwrap_err();
        assert!(err.to_string().contains("orm(table"));
    }

    #[test]
    fn two_identifiers_are_rejected() {
        let input: DeriveInput = parse_quote! {
            #[orm(table = "t")]
            struct Twice {
                id: String,
                #[orm(id)]
                other: String,
            }
        };
        assert!(expand(input).is_err());
    }

    #[test]
    fn expansion_names_table_and_columns() {
        let input: DeriveInput = parse_quote! {
            #[orm(table = "examples")]
            struct Example {
                id: String,
                flag: bool,
            }
        };
        let out = expand(input).unwrap().to_string();
        assert!(out.contains("\"examples\""));
        assert!(out.contains("COL_FLAG"));
        assert!(out.contains("identifier"));
    }
}
