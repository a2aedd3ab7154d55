//! 把查询结果装入 Rust 值。

use crate::runner::{DriverError, Rows};
use crate::value::SqlValue;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading rows: {0}")]
    Rows(DriverError),
    #[error("decode column '{column}': {message}")]
    Decode { column: String, message: String },
    #[error("column index {0} out of range")]
    ColumnIndex(usize),
    #[error("no such column '{0}'")]
    ColumnName(String),
}

/// 结果集中的一行。列名在同一结果集的所有行之间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_index<T: FromValue>(&self, idx: usize) -> Result<T, LoadError> {
        let v = self.values.get(idx).ok_or(LoadError::ColumnIndex(idx))?;
        T::from_value(v).map_err(|message| LoadError::Decode {
            column: self.columns.get(idx).cloned().unwrap_or_default(),
            message,
        })
    }

    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, LoadError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| LoadError::ColumnName(column.to_string()))?;
        self.get_index(idx)
    }
}

/// 单个列值到 Rust 类型的转换。
pub trait FromValue: Sized {
    fn from_value(v: &SqlValue) -> Result<Self, String>;
}

fn mismatch(want: &str, got: &SqlValue) -> String {
    format!("cannot convert {got:?} to {want}")
}

impl FromValue for SqlValue {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        Ok(v.clone())
    }
}

impl FromValue for bool {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::I64(n) => Ok(*n != 0),
            SqlValue::U64(n) => Ok(*n != 0),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::I64(n) => Ok(*n),
            SqlValue::U64(n) => i64::try_from(*n).map_err(|e| e.to_string()),
            SqlValue::Bool(b) => Ok(i64::from(*b)),
            other => Err(mismatch("i64", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        let n = i64::from_value(v)?;
        i32::try_from(n).map_err(|e| e.to_string())
    }
}

impl FromValue for u64 {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::U64(n) => Ok(*n),
            SqlValue::I64(n) => u64::try_from(*n).map_err(|e| e.to_string()),
            other => Err(mismatch("u64", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::F64(n) => Ok(*n),
            SqlValue::I64(n) => Ok(*n as f64),
            SqlValue::U64(n) => Ok(*n as f64),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::String(s) => Ok(s.to_string()),
            SqlValue::Bytes(b) => String::from_utf8(b.clone()).map_err(|e| e.to_string()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::Bytes(b) => Ok(b.clone()),
            SqlValue::String(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch("Vec<u8>", other)),
        }
    }
}

impl FromValue for OffsetDateTime {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::DateTime(t) => Ok(*t),
            other => Err(mismatch("OffsetDateTime", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(v: &SqlValue) -> Result<Self, String> {
        match v {
            SqlValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// 整行到 Rust 类型的转换。单值类型取第一列。
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, LoadError>;
}

impl<T: FromValue> FromRow for T {
    fn from_row(row: &Row) -> Result<Self, LoadError> {
        row.get_index(0)
    }
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self, LoadError> {
        Ok(row.clone())
    }
}

/// 查询结果的装载目标，返回装入的行数。
pub trait Load {
    fn load(&mut self, rows: &mut dyn Rows) -> Result<usize, LoadError>;
}

/// 追加全部行。
impl<T: FromRow> Load for Vec<T> {
    fn load(&mut self, rows: &mut dyn Rows) -> Result<usize, LoadError> {
        let columns: Arc<[String]> = rows.columns().into();
        let mut n = 0;
        while let Some(values) = rows.next_row() {
            let row = Row::new(columns.clone(), values.map_err(LoadError::Rows)?);
            self.push(T::from_row(&row)?);
            n += 1;
        }
        Ok(n)
    }
}

/// 只取第一行；没有行时保持 `None`。
impl<T: FromRow> Load for Option<T> {
    fn load(&mut self, rows: &mut dyn Rows) -> Result<usize, LoadError> {
        let columns: Arc<[String]> = rows.columns().into();
        match rows.next_row() {
            None => Ok(0),
            Some(values) => {
                let row = Row::new(columns, values.map_err(LoadError::Rows)?);
                *self = Some(T::from_row(&row)?);
                Ok(1)
            }
        }
    }
}
