//! SelectStmt：构建 SELECT 语句。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::condition::{BoolOp, Condition, build_combined};
use crate::dialect::Dialect;
use crate::interpolate::InterpolateError;
use crate::macros::{IntoStrings, collect_into_strings};
use crate::modifiers::{Arg, Ident, Raw, expr, raw};
use crate::session::Binding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: String,
    on: Condition,
}

#[derive(Debug, Clone)]
enum OrderItem {
    Raw(Raw),
    Asc(String),
    Desc(String),
}

#[derive(Debug, Clone, Default)]
pub struct SelectStmt {
    raw: Option<Raw>,

    distinct: bool,
    columns: Vec<Arg>,
    table: Option<Arg>,
    table_alias: Option<String>,
    joins: Vec<Join>,

    where_cond: Vec<Condition>,
    group_by: Vec<String>,
    having_cond: Vec<Condition>,
    order_by: Vec<OrderItem>,
    limit: Option<u64>,
    offset: Option<u64>,
    for_update: bool,

    pub(crate) binding: Option<Binding>,
}

impl SelectStmt {
    /// `SELECT cols`；列名按方言加引号。
    pub fn new<T: IntoStrings>(columns: T) -> Self {
        Self {
            columns: collect_into_strings(columns)
                .into_iter()
                .map(|c| Arg::from(Ident(c)))
                .collect(),
            ..Self::default()
        }
    }

    /// 直接使用原始 SQL，忽略其它子句。
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

    /// 追加列名，按方言加引号。
    pub fn column<T: IntoStrings>(&mut self, columns: T) -> &mut Self {
        self.columns.extend(
            collect_into_strings(columns)
                .into_iter()
                .map(|c| Arg::from(Ident(c))),
        );
        self
    }

    /// 追加一个表达式列，例如 `raw("COUNT(*)")` 或子查询。
    pub fn column_expr(&mut self, expr: impl Into<Arg>) -> &mut Self {
        self.columns.push(expr.into());
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(Ident(table.into()).into());
        self.table_alias = None;
        self
    }

    /// `FROM (subquery) AS alias`。
    pub fn from_select(&mut self, sub: SelectStmt, alias: impl Into<String>) -> &mut Self {
        self.table = Some(Arg::builder(sub));
        self.table_alias = Some(alias.into());
        self
    }

    pub fn join(&mut self, table: impl Into<String>, on: impl Into<Condition>) -> &mut Self {
        self.join_with(JoinKind::Inner, table, on)
    }

    pub fn left_join(&mut self, table: impl Into<String>, on: impl Into<Condition>) -> &mut Self {
        self.join_with(JoinKind::Left, table, on)
    }

    pub fn right_join(&mut self, table: impl Into<String>, on: impl Into<Condition>) -> &mut Self {
        self.join_with(JoinKind::Right, table, on)
    }

    pub fn full_join(&mut self, table: impl Into<String>, on: impl Into<Condition>) -> &mut Self {
        self.join_with(JoinKind::Full, table, on)
    }

    fn join_with(
        &mut self,
        kind: JoinKind,
        table: impl Into<String>,
        on: impl Into<Condition>,
    ) -> &mut Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: on.into(),
        });
        self
    }

    /// 追加 `AND` 连接的原始条件，`?` 与 `args` 一一对应。
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

    pub fn group_by<T: IntoStrings>(&mut self, cols: T) -> &mut Self {
        self.group_by.extend(collect_into_strings(cols));
        self
    }

    pub fn having(
        &mut self,
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> &mut Self {
        self.having_cond.push(expr(query, args).into());
        self
    }

    pub fn having_cond(&mut self, cond: impl Into<Condition>) -> &mut Self {
        self.having_cond.push(cond.into());
        self
    }

    /// 原样写入的排序表达式。
    pub fn order_by(&mut self, order: impl Into<String>) -> &mut Self {
        self.order_by.push(OrderItem::Raw(raw(order)));
        self
    }

    pub fn order_asc(&mut self, col: impl Into<String>) -> &mut Self {
        self.order_by.push(OrderItem::Asc(col.into()));
        self
    }

    pub fn order_desc(&mut self, col: impl Into<String>) -> &mut Self {
        self.order_by.push(OrderItem::Desc(col.into()));
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// 按页取数，`page` 从 1 开始。
    pub fn paginate(&mut self, page: u64, per_page: u64) -> &mut Self {
        self.limit = Some(per_page);
        self.offset = Some(page.saturating_sub(1).saturating_mul(per_page));
        self
    }

    /// `FOR UPDATE`；SQLite 不支持行锁，渲染时忽略。
    pub fn for_update(&mut self) -> &mut Self {
        self.for_update = true;
        self
    }
}

impl From<SelectStmt> for Arg {
    fn from(v: SelectStmt) -> Self {
        Arg::builder(v)
    }
}

impl Builder for SelectStmt {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }
        if self.columns.is_empty() {
            return Err(InterpolateError::ColumnNotSpecified);
        }

        buf.write_str("SELECT ");
        if self.distinct {
            buf.write_str("DISTINCT ");
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_placeholder(col.clone());
        }

        if let Some(table) = &self.table {
            buf.write_str(" FROM ");
            buf.write_placeholder(table.clone());
            if let Some(alias) = &self.table_alias {
                buf.write_str(" AS ");
                buf.write_str(&dialect.quote_ident(alias));
            }
        }

        for join in &self.joins {
            buf.write_char(' ');
            buf.write_str(join.kind.as_str());
            buf.write_char(' ');
            buf.write_str(&dialect.quote_ident(&join.table));
            buf.write_str(" ON ");
            join.on.build(dialect, buf)?;
        }

        if !self.where_cond.is_empty() {
            buf.write_str(" WHERE ");
            build_combined(dialect, buf, BoolOp::And, &self.where_cond)?;
        }

        if !self.group_by.is_empty() {
            buf.write_str(" GROUP BY ");
            let cols: Vec<String> = self
                .group_by
                .iter()
                .map(|c| dialect.quote_ident(c))
                .collect();
            buf.write_joined(&cols, ", ");
        }

        if !self.having_cond.is_empty() {
            buf.write_str(" HAVING ");
            build_combined(dialect, buf, BoolOp::And, &self.having_cond)?;
        }

        if !self.order_by.is_empty() {
            buf.write_str(" ORDER BY ");
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    buf.write_str(", ");
                }
                match item {
                    OrderItem::Raw(r) => r.build(dialect, buf)?,
                    OrderItem::Asc(c) => {
                        buf.write_str(&dialect.quote_ident(c));
                        buf.write_str(" ASC");
                    }
                    OrderItem::Desc(c) => {
                        buf.write_str(&dialect.quote_ident(c));
                        buf.write_str(" DESC");
                    }
                }
            }
        }

        if let Some(n) = self.limit {
            buf.write_str(" LIMIT ");
            buf.write_str(&n.to_string());
        }
        if let Some(n) = self.offset {
            buf.write_str(" OFFSET ");
            buf.write_str(&n.to_string());
        }

        if self.for_update && dialect != Dialect::SQLite {
            buf.write_str(" FOR UPDATE");
        }
        Ok(())
    }
}
