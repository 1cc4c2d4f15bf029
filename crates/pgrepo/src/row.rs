//! Result rows and their decoding from `tokio-postgres`.

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, RawValue, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use tokio_postgres::types::{FromSql, Type};

/// A result row: column names mapped to values, in result-set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    /// Get the raw value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Decode a column into `T`, returning [`OrmError::Decode`] on a missing
    /// column or a type mismatch.
    pub fn try_get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))?;
        T::from_value(value).map_err(|message| OrmError::decode(column, message))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, v)| (name.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<&tokio_postgres::Row> for Row {
    type Error = OrmError;

    fn try_from(row: &tokio_postgres::Row) -> OrmResult<Self> {
        let mut columns = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value = decode_cell(row, idx, column.name(), column.type_())?;
            columns.push((column.name().to_string(), value));
        }
        Ok(Self { columns })
    }
}

fn get_opt<'a, T: FromSql<'a>>(
    row: &'a tokio_postgres::Row,
    idx: usize,
    name: &str,
) -> OrmResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| OrmError::decode(name, e.to_string()))
}

fn decode_cell(row: &tokio_postgres::Row, idx: usize, name: &str, ty: &Type) -> OrmResult<Value> {
    let value = if *ty == Type::BOOL {
        get_opt::<bool>(row, idx, name)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        get_opt::<i16>(row, idx, name)?.map(|v| Value::Int(v.into()))
    } else if *ty == Type::INT4 {
        get_opt::<i32>(row, idx, name)?.map(|v| Value::Int(v.into()))
    } else if *ty == Type::INT8 {
        get_opt::<i64>(row, idx, name)?.map(Value::Int)
    } else if *ty == Type::FLOAT4 {
        get_opt::<f32>(row, idx, name)?.map(|v| Value::Float(v.into()))
    } else if *ty == Type::FLOAT8 {
        get_opt::<f64>(row, idx, name)?.map(Value::Float)
    } else if *ty == Type::UUID {
        get_opt::<uuid::Uuid>(row, idx, name)?.map(Value::Uuid)
    } else if *ty == Type::TIMESTAMPTZ {
        get_opt::<DateTime<Utc>>(row, idx, name)?.map(Value::Timestamp)
    } else if *ty == Type::TIMESTAMP {
        get_opt::<NaiveDateTime>(row, idx, name)?.map(|v| Value::Timestamp(v.and_utc()))
    } else if *ty == Type::NUMERIC {
        // NaN and infinities have no Decimal form
        match row.try_get::<_, Option<Decimal>>(idx) {
            Ok(v) => v.map(Value::Decimal),
            Err(_) => get_opt::<RawValue>(row, idx, name)?.map(Value::Raw),
        }
    } else if *ty == Type::DATE {
        get_opt::<NaiveDate>(row, idx, name)?.map(Value::Date)
    } else if *ty == Type::TIME {
        get_opt::<NaiveTime>(row, idx, name)?.map(Value::Time)
    } else if *ty == Type::BYTEA {
        get_opt::<Vec<u8>>(row, idx, name)?.map(Value::Bytes)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        get_opt::<serde_json::Value>(row, idx, name)?.map(Value::Json)
    } else if <String as FromSql<'_>>::accepts(ty) {
        // text, varchar, bpchar, name, citext and other string-like types
        get_opt::<String>(row, idx, name)?.map(Value::Text)
    } else {
        // arrays, enums, network types, ranges: kept undecoded until asked for
        get_opt::<RawValue>(row, idx, name)?.map(Value::Raw)
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_get_decodes_by_name() {
        let row = Row::new().with("id", "a1").with("flag", true);
        assert_eq!(row.try_get::<String>("id").unwrap(), "a1");
        assert!(row.try_get::<bool>("flag").unwrap());
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn raw_cells_only_fail_the_field_that_reads_them() {
        let row = Row::new()
            .with("id", "a1")
            .with("addr", RawValue::new(Type::INET, vec![2u8, 32, 0, 4, 127, 0, 0, 1]));
        assert_eq!(row.try_get::<String>("id").unwrap(), "a1");

        let err = row.try_get::<String>("addr").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Decode error on column 'addr': expected text, got unsupported column type 'inet'"
        );
    }

    #[test]
    fn try_get_missing_column_is_decode_error() {
        let row = Row::new().with("id", "a1");
        match row.try_get::<bool>("flag") {
            Err(OrmError::Decode { column, .. }) => assert_eq!(column, "flag"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn try_get_type_mismatch_names_column() {
        let row = Row::new().with("count", "three");
        let err = row.try_get::<i64>("count").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Decode error on column 'count': expected int, got text"
        );
    }

    #[test]
    fn collect_preserves_column_order() {
        let row: Row = [("b", 1_i64), ("a", 2_i64)].into_iter().collect();
        let names: Vec<_> = row.columns().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
