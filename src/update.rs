//! UpdateStmt：构建 UPDATE 语句。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::condition::{BoolOp, Condition, build_combined};
use crate::dialect::Dialect;
use crate::interpolate::InterpolateError;
use crate::modifiers::{Arg, Raw, expr};
use crate::session::Binding;

#[derive(Debug, Clone, Default)]
pub struct UpdateStmt {
    raw: Option<Raw>,

    table: String,
    assignments: Vec<(String, Arg)>,
    where_cond: Vec<Condition>,
    limit: Option<u64>,

    pub(crate) binding: Option<Binding>,
}

impl UpdateStmt {
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

    /// `column = value`。值可以是 `expr("count + ?", [1])` 之类的表达式。
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Arg>) -> &mut Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// 按迭代顺序追加多个赋值；需要稳定输出时传入 `BTreeMap`。
    pub fn set_map<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Arg>,
    {
        for (k, v) in pairs {
            self.assignments.push((k.into(), v.into()));
        }
        self
    }

    pub fn where_(
        &mut self,
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> &mut Self {
        self.where_cond.push(expr(query, args).into());
        self
    }

    pub fn where_cond(&mut self, cond: impl Into<Condition>) -> &mut Self {
        self.where_cond.push(cond.into());
        self
    }

    /// 仅 MySQL 与 SQLite 渲染。
    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }
}

impl Builder for UpdateStmt {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }
        if self.table.is_empty() {
            return Err(InterpolateError::TableNotSpecified);
        }
        if self.assignments.is_empty() {
            return Err(InterpolateError::ValueNotSpecified);
        }

        buf.write_str("UPDATE ");
        buf.write_str(&dialect.quote_ident(&self.table));
        buf.write_str(" SET ");
        for (i, (col, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_str(&dialect.quote_ident(col));
            buf.write_str(" = ");
            buf.write_placeholder(value.clone());
        }

        if !self.where_cond.is_empty() {
            buf.write_str(" WHERE ");
            build_combined(dialect, buf, BoolOp::And, &self.where_cond)?;
        }

        if let Some(n) = self.limit
            && dialect.supports_mutation_limit()
        {
            buf.write_str(" LIMIT ");
            buf.write_str(&n.to_string());
        }
        Ok(())
    }
}
