//! Derive macro for pgrepo
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod record;

/// Derive the `Record` shape descriptor and row decoding for a struct.
///
/// # Example
///
/// ```ignore
/// use pgrepo::{Json, Record};
///
/// #[derive(Record)]
/// #[orm(table = "examples")]
/// struct Example {
///     id: String,
///     created_at: DateTime<Utc>,
///     updated_at: DateTime<Utc>,
///     flag: bool,
///     metadata: Json<Metadata>,
/// }
/// ```
///
/// # Generated
///
/// - `impl pgrepo::Record` with `TABLE`, `FIELDS` and `from_row`
/// - `COL_*: &'static str` - Column name constants
///
/// # Field kinds
///
/// A field named `id` is the identifier; `created_at` / `updated_at` are
/// timestamps; `Json<_>` and `serde_json::Value` fields are structured;
/// everything else is scalar. `Option<_>` fields are nullable.
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (required)
/// - `#[orm(id)]` - Mark field as the identifier
/// - `#[orm(timestamp)]` - Server-maintained timestamp
/// - `#[orm(structured)]` - Structured (JSON) value
/// - `#[orm(column = "name")]` - Map field to a different column name
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
