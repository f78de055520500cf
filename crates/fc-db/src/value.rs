//! Typed row values
//!
//! Rows come back from the database as a map of column name to [`CellValue`].
//! Only the null/non-null distinction matters to verification, but cells keep
//! their shape so reports can show what was found.

use duckdb::types::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One persisted row, keyed by column name
pub type Row = BTreeMap<String, CellValue>;

/// A scalar cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// A single cell: null, a scalar, or a nested list
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Scalar(Scalar),
    Nested(Vec<CellValue>),
}

impl CellValue {
    /// SQL NULL. An empty or all-null list is still a value.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Scalar(Scalar::Text(s.into()))
    }

    pub fn int(v: i64) -> Self {
        CellValue::Scalar(Scalar::Int(v))
    }
}

impl From<Scalar> for CellValue {
    fn from(scalar: Scalar) -> Self {
        CellValue::Scalar(scalar)
    }
}

fn int_or_text<T>(v: T) -> CellValue
where
    T: Copy + ToString + TryInto<i64>,
{
    match v.try_into() {
        Ok(i) => CellValue::int(i),
        Err(_) => CellValue::text(v.to_string()),
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Boolean(b) => Scalar::Bool(b).into(),
            Value::TinyInt(v) => CellValue::int(v.into()),
            Value::SmallInt(v) => CellValue::int(v.into()),
            Value::Int(v) => CellValue::int(v.into()),
            Value::BigInt(v) => CellValue::int(v),
            Value::UTinyInt(v) => CellValue::int(v.into()),
            Value::USmallInt(v) => CellValue::int(v.into()),
            Value::UInt(v) => CellValue::int(v.into()),
            Value::UBigInt(v) => int_or_text(v),
            Value::HugeInt(v) => int_or_text(v),
            Value::Float(v) => Scalar::Float(v.into()).into(),
            Value::Double(v) => Scalar::Float(v).into(),
            Value::Text(s) | Value::Enum(s) => CellValue::text(s),
            Value::List(items) | Value::Array(items) => {
                CellValue::Nested(items.into_iter().map(CellValue::from).collect())
            }
            Value::Union(inner) => CellValue::from(*inner),
            // Timestamps, dates, decimals, blobs, structs and maps only need
            // to be recognisably non-null.
            other => CellValue::text(format!("{:?}", other)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Scalar(Scalar::Bool(b)) => write!(f, "{}", b),
            CellValue::Scalar(Scalar::Int(i)) => write!(f, "{}", i),
            CellValue::Scalar(Scalar::Float(x)) => write!(f, "{}", x),
            CellValue::Scalar(Scalar::Text(s)) => write!(f, "{}", s),
            CellValue::Nested(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_detection() {
        assert!(CellValue::Null.is_null());
        assert!(!CellValue::Nested(vec![]).is_null());
        assert!(!CellValue::Nested(vec![CellValue::Null]).is_null());
        assert!(!CellValue::text("").is_null());
    }

    #[test]
    fn test_from_duckdb_value() {
        assert_eq!(CellValue::from(Value::Null), CellValue::Null);
        assert_eq!(CellValue::from(Value::Int(7)), CellValue::int(7));
        assert_eq!(CellValue::from(Value::UBigInt(u64::MAX)), CellValue::text(u64::MAX.to_string()));
        assert_eq!(
            CellValue::from(Value::List(vec![Value::Text("a".into()), Value::Null])),
            CellValue::Nested(vec![CellValue::text("a"), CellValue::Null])
        );
    }

    #[test]
    fn test_display() {
        let nested = CellValue::Nested(vec![CellValue::int(1), CellValue::Null]);
        assert_eq!(nested.to_string(), "[1, null]");
    }
}
