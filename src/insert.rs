//! InsertStmt：构建 INSERT 语句。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::dialect::Dialect;
use crate::interpolate::InterpolateError;
use crate::macros::{IntoStrings, collect_into_strings};
use crate::modifiers::{Arg, Raw, expr};
use crate::session::Binding;

#[derive(Debug, Clone, Default)]
pub struct InsertStmt {
    raw: Option<Raw>,

    table: String,
    columns: Vec<String>,
    values: Vec<Vec<Arg>>,
    ignore: bool,
    returning: Vec<String>,

    pub(crate) binding: Option<Binding>,
}

impl InsertStmt {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn by_sql(
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> Self {
        Self {
            raw: Some(expr(query, args)),
            ..Self::default()
        }
    }

    pub(crate) fn bind(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn columns<T: IntoStrings>(&mut self, cols: T) -> &mut Self {
        self.columns.extend(collect_into_strings(cols));
        self
    }

    /// 追加一行值，数量需与列数一致。
    pub fn values(&mut self, row: impl IntoIterator<Item = impl Into<Arg>>) -> &mut Self {
        self.values.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// 同时追加列与第一行中对应的值。
    pub fn pair(&mut self, column: impl Into<String>, value: impl Into<Arg>) -> &mut Self {
        self.columns.push(column.into());
        match self.values.first_mut() {
            Some(row) => row.push(value.into()),
            None => self.values.push(vec![value.into()]),
        }
        self
    }

    /// 忽略唯一键冲突：MySQL `INSERT IGNORE`、SQLite `INSERT OR IGNORE`、
    /// PostgreSQL `ON CONFLICT DO NOTHING`。ClickHouse 无此语义。
    pub fn ignore(&mut self) -> &mut Self {
        self.ignore = true;
        self
    }

    pub fn returning<T: IntoStrings>(&mut self, cols: T) -> &mut Self {
        self.returning.extend(collect_into_strings(cols));
        self
    }
}

impl Builder for InsertStmt {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }
        if self.table.is_empty() {
            return Err(InterpolateError::TableNotSpecified);
        }
        if self.columns.is_empty() {
            return Err(InterpolateError::ColumnNotSpecified);
        }
        if self.values.is_empty() {
            return Err(InterpolateError::ValueNotSpecified);
        }

        buf.write_str(if self.ignore {
            dialect.prepare_insert_ignore()
        } else {
            "INSERT"
        });
        buf.write_str(" INTO ");
        buf.write_str(&dialect.quote_ident(&self.table));

        let cols: Vec<String> = self.columns.iter().map(|c| dialect.quote_ident(c)).collect();
        buf.write_str(" (");
        buf.write_joined(&cols, ", ");
        buf.write_str(") VALUES ");

        for (i, row) in self.values.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(InterpolateError::ColumnCountMismatch {
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_char('(');
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    buf.write_str(", ");
                }
                buf.write_placeholder(v.clone());
            }
            buf.write_char(')');
        }

        if self.ignore && dialect == Dialect::PostgreSQL {
            buf.write_str(" ON CONFLICT DO NOTHING");
        }

        if !self.returning.is_empty() {
            let cols: Vec<String> = self
                .returning
                .iter()
                .map(|c| dialect.quote_ident(c))
                .collect();
            buf.write_str(" RETURNING ");
            buf.write_joined(&cols, ", ");
        }
        Ok(())
    }
}
