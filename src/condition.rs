//! Condition：WHERE / HAVING 条件表达式节点。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::dialect::Dialect;
use crate::interpolate::InterpolateError;
use crate::modifiers::{Arg, Raw};

/// 比较运算符。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
}

impl CompareOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// 条件节点。列名总是按方言加引号，值总是经由占位符绑定。
#[derive(Debug, Clone)]
pub enum Condition {
    Compare {
        column: String,
        op: CompareOp,
        value: Arg,
    },
    Null {
        column: String,
        negated: bool,
    },
    /// `values` 必须是列表、子查询或原始片段。
    In {
        column: String,
        values: Arg,
        negated: bool,
    },
    Combine {
        op: BoolOp,
        children: Vec<Condition>,
    },
    Expr(Raw),
}

impl Condition {
    /// 比较、NULL 判断与 IN 不需要额外括号。
    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Self::Compare { .. } | Self::Null { .. } | Self::In { .. }
        )
    }
}

fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Arg>) -> Condition {
    Condition::Compare {
        column: column.into(),
        op,
        value: value.into(),
    }
}

/// `column = value`；值为 NULL 时生成 `IS NULL`，值为列表时生成 `IN`。
pub fn eq(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    let column = column.into();
    match value.into() {
        v if v.is_null() => Condition::Null {
            column,
            negated: false,
        },
        v @ Arg::List(_) => Condition::In {
            column,
            values: v,
            negated: false,
        },
        v => compare(column, CompareOp::Eq, v),
    }
}

/// `column <> value`；值为 NULL 时生成 `IS NOT NULL`，值为列表时生成 `NOT IN`。
pub fn neq(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    let column = column.into();
    match value.into() {
        v if v.is_null() => Condition::Null {
            column,
            negated: true,
        },
        v @ Arg::List(_) => Condition::In {
            column,
            values: v,
            negated: true,
        },
        v => compare(column, CompareOp::Neq, v),
    }
}

pub fn gt(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    compare(column, CompareOp::Gt, value)
}

pub fn gte(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    compare(column, CompareOp::Gte, value)
}

pub fn lt(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    compare(column, CompareOp::Lt, value)
}

pub fn lte(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    compare(column, CompareOp::Lte, value)
}

pub fn like(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    compare(column, CompareOp::Like, value)
}

pub fn not_like(column: impl Into<String>, value: impl Into<Arg>) -> Condition {
    compare(column, CompareOp::NotLike, value)
}

pub fn is_null(column: impl Into<String>) -> Condition {
    Condition::Null {
        column: column.into(),
        negated: false,
    }
}

pub fn is_not_null(column: impl Into<String>) -> Condition {
    Condition::Null {
        column: column.into(),
        negated: true,
    }
}

/// `column IN (...)`。空列表渲染为恒假的 `1 = 0`。
pub fn in_(column: impl Into<String>, values: impl Into<Arg>) -> Condition {
    Condition::In {
        column: column.into(),
        values: values.into(),
        negated: false,
    }
}

/// `column NOT IN (...)`。空列表渲染为恒真的 `1 = 1`。
pub fn not_in(column: impl Into<String>, values: impl Into<Arg>) -> Condition {
    Condition::In {
        column: column.into(),
        values: values.into(),
        negated: true,
    }
}

pub fn and(children: impl IntoIterator<Item = impl Into<Condition>>) -> Condition {
    Condition::Combine {
        op: BoolOp::And,
        children: children.into_iter().map(Into::into).collect(),
    }
}

pub fn or(children: impl IntoIterator<Item = impl Into<Condition>>) -> Condition {
    Condition::Combine {
        op: BoolOp::Or,
        children: children.into_iter().map(Into::into).collect(),
    }
}

impl From<Raw> for Condition {
    fn from(v: Raw) -> Self {
        Self::Expr(v)
    }
}

/// 不带参数的原始条件，例如 JOIN 的 `"u.id = o.user_id"`。
impl From<&str> for Condition {
    fn from(v: &str) -> Self {
        Self::Expr(crate::modifiers::raw(v))
    }
}

impl From<String> for Condition {
    fn from(v: String) -> Self {
        Self::Expr(crate::modifiers::raw(v))
    }
}

impl From<Condition> for Arg {
    fn from(v: Condition) -> Self {
        Arg::Builder(Box::new(v))
    }
}

impl Builder for Condition {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        match self {
            Self::Compare { column, op, value } => {
                buf.write_str(&dialect.quote_ident(column));
                buf.write_char(' ');
                buf.write_str(op.as_str());
                buf.write_char(' ');
                buf.write_placeholder(value.clone());
            }
            Self::Null { column, negated } => {
                buf.write_str(&dialect.quote_ident(column));
                buf.write_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::In {
                column,
                values,
                negated,
            } => build_in(dialect, buf, column, values, *negated)?,
            Self::Combine { op, children } => build_combined(dialect, buf, *op, children)?,
            Self::Expr(raw) => raw.build(dialect, buf)?,
        }
        Ok(())
    }
}

fn build_in(
    dialect: Dialect,
    buf: &mut Buffer,
    column: &str,
    values: &Arg,
    negated: bool,
) -> Result<(), InterpolateError> {
    let keyword = if negated { " NOT IN " } else { " IN " };
    match values {
        Arg::List(items) if items.is_empty() => {
            buf.write_str(if negated { "1 = 1" } else { "1 = 0" });
        }
        Arg::List(_) | Arg::Builder(_) => {
            buf.write_str(&dialect.quote_ident(column));
            buf.write_str(keyword);
            buf.write_placeholder(values.clone());
        }
        Arg::Raw(_) => {
            buf.write_str(&dialect.quote_ident(column));
            buf.write_str(keyword);
            buf.write_char('(');
            buf.write_placeholder(values.clone());
            buf.write_char(')');
        }
        Arg::Value(_) | Arg::Valuer(_) => return Err(InterpolateError::NotEnumerable),
    }
    Ok(())
}

pub(crate) fn build_combined(
    dialect: Dialect,
    buf: &mut Buffer,
    op: BoolOp,
    children: &[Condition],
) -> Result<(), InterpolateError> {
    match children {
        [] => Err(InterpolateError::EmptyCondition),
        [only] => only.build(dialect, buf),
        _ => {
            for (i, c) in children.iter().enumerate() {
                if i > 0 {
                    buf.write_str(op.as_str());
                }
                let wrap = !c.is_atomic();
                if wrap {
                    buf.write_char('(');
                }
                c.build(dialect, buf)?;
                if wrap {
                    buf.write_char(')');
                }
            }
            Ok(())
        }
    }
}
