//! Attribute parsing for the Record derive.
//!
//! Handles struct-level `#[orm(table = "...")]` and field-level
//! `#[orm(id, timestamp, structured, column = "...")]`.

use syn::{DeriveInput, LitStr, Result};

/// Extract table name from struct-level `#[orm(table = "...")]` attribute.
pub(super) fn table_name(input: &DeriveInput) -> Result<String> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute, expected `table = \"...\"`"))
            }
        })?;
    }

    match table {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(syn::Error::new_spanned(
            input,
            "Record requires #[orm(table = \"table_name\")] attribute",
        )),
    }
}

/// Field-level `#[orm(...)]` markers.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub is_id: bool,
    pub is_timestamp: bool,
    pub is_structured: bool,
    pub column: Option<String>,
}

impl FieldAttr {
    pub(super) fn from_field(field: &syn::Field) -> Result<Self> {
        let mut out = FieldAttr::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    out.is_id = true;
                } else if meta.path.is_ident("timestamp") {
                    out.is_timestamp = true;
                } else if meta.path.is_ident("structured") {
                    out.is_structured = true;
                } else if meta.path.is_ident("column") {
                    let value: LitStr = meta.value()?.parse()?;
                    out.column = Some(value.value());
                } else {
                    return Err(meta.error(
                        "unsupported field attribute, expected `id`, `timestamp`, `structured` or `column = \"...\"`",
                    ));
                }
                Ok(())
            })?;
        }

        let markers = [out.is_id, out.is_timestamp, out.is_structured]
            .iter()
            .filter(|m| **m)
            .count();
        if markers > 1 {
            return Err(syn::Error::new_spanned(
                field,
                "at most one of `id`, `timestamp`, `structured` may be given",
            ));
        }
        Ok(out)
    }
}
