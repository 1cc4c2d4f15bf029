//! Bound parameter values and row cells.
//!
//! [`Value`] is what travels next to SQL text as a bound parameter, and what a
//! [`Row`](crate::row::Row) holds per column. It implements `ToSql`, adapting
//! itself to the parameter type Postgres inferred for the placeholder (e.g. an
//! `Int` bound to an `integer` column is sent as 4 bytes, a `Text` bound to a
//! `uuid` column is parsed first).
//!
//! Column types without a dedicated variant are carried as [`RawValue`]: the
//! server's binary encoding plus its type. A raw cell only fails when a field
//! asks to decode it, and it can be bound back to a column of the same type.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::ops::{Deref, DerefMut};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};
use uuid::Uuid;

/// A single SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    /// Arbitrary precision number (`numeric`).
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Bytes(Vec<u8>),
    /// Structured data, stored as `json`/`jsonb`.
    Json(serde_json::Value),
    /// A cell of a type with no dedicated variant.
    Raw(RawValue),
}

/// Undecoded binary cell together with its Postgres type.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValue {
    ty: Type,
    bytes: Vec<u8>,
}

impl RawValue {
    pub fn new(ty: Type, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            ty,
            bytes: bytes.into(),
        }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Binary wire encoding of the cell.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<'a> FromSql<'a> for RawValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self::new(ty.clone(), raw))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl Value {
    /// Serialize any `Serialize` type into a [`Value::Json`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> OrmResult<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Short type name used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Decimal(_) => "numeric",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Bytes(_) => "bytea",
            Value::Json(_) => "json",
            Value::Raw(_) => "raw",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*v as f64).to_sql_checked(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from(*v).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::try_from(*v)?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(v) => {
                if *ty == Type::UUID {
                    Uuid::parse_str(v)?.to_sql_checked(ty, out)
                } else if *ty == Type::NUMERIC {
                    v.parse::<Decimal>()?.to_sql_checked(ty, out)
                } else if *ty == Type::DATE {
                    v.parse::<NaiveDate>()?.to_sql_checked(ty, out)
                } else if *ty == Type::TIME {
                    v.parse::<NaiveTime>()?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Uuid(v) => {
                if *ty == Type::UUID {
                    v.to_sql_checked(ty, out)
                } else {
                    v.to_string().to_sql_checked(ty, out)
                }
            }
            Value::Timestamp(v) => {
                if *ty == Type::TIMESTAMP {
                    v.naive_utc().to_sql_checked(ty, out)
                } else if *ty == Type::DATE {
                    v.date_naive().to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Decimal(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Time(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Raw(raw) => {
                if *ty != raw.ty {
                    return Err(format!(
                        "cannot bind a raw '{}' value to a '{}' parameter",
                        raw.ty.name(),
                        ty.name()
                    )
                    .into());
                }
                out.extend_from_slice(&raw.bytes);
                Ok(IsNull::No)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<RawValue> for Value {
    fn from(v: RawValue) -> Self {
        Value::Raw(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Decode a [`Value`] into a Rust type.
///
/// The error is a human-readable mismatch description; [`Row::try_get`]
/// attaches the column name.
///
/// [`Row::try_get`]: crate::row::Row::try_get
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, got: &Value) -> String {
    match got {
        Value::Raw(raw) => format!(
            "expected {expected}, got unsupported column type '{}'",
            raw.ty.name()
        ),
        other => format!("expected {expected}, got {}", other.type_name()),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch("int", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|_| format!("value {v} out of range for i32"))
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = i64::from_value(value)?;
        i16::try_from(v).map_err(|_| format!("value {v} out of range for i16"))
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = i64::from_value(value)?;
        u64::try_from(v).map_err(|_| format!("value {v} out of range for u64"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            // Identifiers are strings even when the column is `uuid`.
            Value::Uuid(v) => Ok(v.to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Uuid(v) => Ok(*v),
            Value::Text(v) => Uuid::parse_str(v).map_err(|e| e.to_string()),
            other => Err(mismatch("uuid", other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            other => Err(mismatch("timestamp", other)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Decimal(v) => Ok(*v),
            Value::Int(v) => Ok(Decimal::from(*v)),
            Value::Text(v) => v.parse().map_err(|e: rust_decimal::Error| e.to_string()),
            other => Err(mismatch("numeric", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Date(v) => Ok(*v),
            other => Err(mismatch("date", other)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Time(v) => Ok(*v),
            other => Err(mismatch("time", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bytes(v) => Ok(v.clone()),
            other => Err(mismatch("bytea", other)),
        }
    }
}

impl FromValue for RawValue {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Raw(v) => Ok(v.clone()),
            other => Err(mismatch("raw cell", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            other => Err(mismatch("json", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Typed wrapper for a structured (`json`/`jsonb`) field.
///
/// ```ignore
/// #[derive(Record)]
/// #[orm(table = "examples")]
/// struct Example {
///     id: String,
///     metadata: Json<Meta>,
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Json<T> {
    /// Serialize the wrapped value into a bindable [`Value`].
    pub fn to_value(&self) -> OrmResult<Value> {
        Value::json(&self.0)
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned> FromValue for Json<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => serde_json::from_value(v.clone())
                .map(Json)
                .map_err(|e| e.to_string()),
            other => Err(mismatch("json", other)),
        }
    }
}

impl<T: Serialize> TryFrom<Json<T>> for Value {
    type Error = OrmError;

    fn try_from(v: Json<T>) -> OrmResult<Self> {
        v.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Meta {
        note: String,
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn json_wrapper_round_trips_through_value() {
        let v = Json(Meta { note: "hi".into() }).to_value().unwrap();
        assert_eq!(v, Value::Json(json!({"note": "hi"})));

        let back = Json::<Meta>::from_value(&v).unwrap();
        assert_eq!(back.note, "hi");
    }

    #[test]
    fn string_accepts_uuid_cells() {
        let id = Uuid::new_v4();
        assert_eq!(String::from_value(&Value::Uuid(id)).unwrap(), id.to_string());
    }

    #[test]
    fn mismatch_reports_both_types() {
        let err = bool::from_value(&Value::Text("yes".into())).unwrap_err();
        assert_eq!(err, "expected bool, got text");
    }

    #[test]
    fn narrowing_checks_range() {
        assert_eq!(i32::from_value(&Value::Int(7)).unwrap(), 7);
        assert!(i16::from_value(&Value::Int(i64::from(i16::MAX) + 1)).is_err());
        assert!(u64::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn nullable_decode() {
        assert_eq!(Option::<bool>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(
            Option::<bool>::from_value(&Value::Bool(true)).unwrap(),
            Some(true)
        );
        assert!(bool::from_value(&Value::Null).is_err());
    }

    #[test]
    fn to_sql_narrows_int_for_int4_columns() {
        let mut buf = BytesMut::new();
        let is_null = Value::Int(5).to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(buf.len(), 4);

        let mut buf = BytesMut::new();
        Value::Int(5).to_sql(&Type::INT8, &mut buf).unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn to_sql_parses_text_for_uuid_columns() {
        let id = Uuid::new_v4();
        let mut buf = BytesMut::new();
        Value::Text(id.to_string())
            .to_sql(&Type::UUID, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], id.as_bytes());

        let mut buf = BytesMut::new();
        assert!(
            Value::Text("not-a-uuid".into())
                .to_sql(&Type::UUID, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn to_sql_adapts_to_numeric_columns() {
        let mut buf = BytesMut::new();
        Value::Int(5).to_sql(&Type::NUMERIC, &mut buf).unwrap();
        assert!(!buf.is_empty());

        let mut buf = BytesMut::new();
        Value::Float(1.5).to_sql(&Type::NUMERIC, &mut buf).unwrap();
        assert!(!buf.is_empty());

        let mut from_text = BytesMut::new();
        Value::Text("12.50".into())
            .to_sql(&Type::NUMERIC, &mut from_text)
            .unwrap();
        let mut from_decimal = BytesMut::new();
        Value::Decimal("12.50".parse().unwrap())
            .to_sql(&Type::NUMERIC, &mut from_decimal)
            .unwrap();
        assert_eq!(from_text, from_decimal);

        let mut buf = BytesMut::new();
        assert!(
            Value::Text("twelve".into())
                .to_sql(&Type::NUMERIC, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn to_sql_adapts_to_date_columns() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut expected = BytesMut::new();
        Value::Date(day).to_sql(&Type::DATE, &mut expected).unwrap();

        let mut from_text = BytesMut::new();
        Value::Text("2024-01-01".into())
            .to_sql(&Type::DATE, &mut from_text)
            .unwrap();
        assert_eq!(from_text, expected);

        let noon = day.and_hms_opt(12, 0, 0).unwrap().and_utc();
        let mut from_timestamp = BytesMut::new();
        Value::Timestamp(noon)
            .to_sql(&Type::DATE, &mut from_timestamp)
            .unwrap();
        assert_eq!(from_timestamp, expected);

        let mut buf = BytesMut::new();
        Value::Text("08:30:00".into())
            .to_sql(&Type::TIME, &mut buf)
            .unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn raw_cells_rebind_only_to_their_own_type() {
        let inet = RawValue::new(Type::INET, vec![2u8, 32, 0, 4, 127, 0, 0, 1]);
        let mut buf = BytesMut::new();
        Value::Raw(inet.clone()).to_sql(&Type::INET, &mut buf).unwrap();
        assert_eq!(&buf[..], inet.as_bytes());

        let mut buf = BytesMut::new();
        assert!(Value::Raw(inet).to_sql(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn raw_cells_fail_only_when_decoded() {
        let raw = RawValue::from_sql(&Type::INET, &[2, 32, 0, 4, 127, 0, 0, 1]).unwrap();
        assert_eq!(raw.ty(), &Type::INET);

        let cell = Value::Raw(raw.clone());
        assert_eq!(RawValue::from_value(&cell).unwrap(), raw);
        assert_eq!(
            String::from_value(&cell).unwrap_err(),
            "expected text, got unsupported column type 'inet'"
        );
    }

    #[test]
    fn to_sql_null_and_type_mismatch() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql(&Type::BOOL, &mut buf).unwrap(),
            IsNull::Yes
        ));
        assert!(Value::Bool(true).to_sql(&Type::TEXT, &mut buf).is_err());
    }
}
