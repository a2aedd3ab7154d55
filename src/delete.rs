//! DeleteStmt：构建 DELETE 语句。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::condition::{BoolOp, Condition, build_combined};
use crate::dialect::Dialect;
use crate::interpolate::InterpolateError;
use crate::modifiers::{Arg, Raw, expr};
use crate::session::Binding;

#[derive(Debug, Clone, Default)]
pub struct DeleteStmt {
    raw: Option<Raw>,

    table: String,
    where_cond: Vec<Condition>,
    limit: Option<u64>,

    pub(crate) binding: Option<Binding>,
}

impl DeleteStmt {
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

impl Builder for DeleteStmt {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }
        if self.table.is_empty() {
            return Err(InterpolateError::TableNotSpecified);
        }

        buf.write_str("DELETE FROM ");
        buf.write_str(&dialect.quote_ident(&self.table));

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
