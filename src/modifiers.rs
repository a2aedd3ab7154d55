//! 参数类型 `Arg` 与辅助构造函数（原始片段、列表、标识符）。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::dialect::Dialect;
use crate::interpolate::InterpolateError;
use crate::value::SqlValue;
use crate::valuer::SqlValuer;

/// Raw：带有自身 `?` 标记与参数的原始 SQL 片段。
///
/// 插值时片段内的标记数必须与 `args` 数量一致；参数仍按普通规则绑定，
/// 只有 `query` 文本本身会原样进入最终 SQL。
#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    pub(crate) query: String,
    pub(crate) args: Vec<Arg>,
}

impl Raw {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl Builder for Raw {
    fn build(&self, _dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        buf.write_placeholder(Arg::Raw(self.clone()));
        Ok(())
    }

    fn nested_parens(&self) -> bool {
        false
    }
}

/// Expr：创建一个带参数的原始片段，例如 `expr("a = ? OR b = ?", [1, 2])`。
pub fn expr(query: impl Into<String>, args: impl IntoIterator<Item = impl Into<Arg>>) -> Raw {
    Raw {
        query: query.into(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

/// 不带参数的原始片段。
pub fn raw(query: impl Into<String>) -> Raw {
    Raw {
        query: query.into(),
        args: Vec::new(),
    }
}

/// List：标记为参数列表，插值时展开成 `(?, ?, ?)`。
pub fn list<T: FlattenIntoArgs>(values: T) -> Arg {
    let mut out = Vec::new();
    values.flatten_into(&mut out);
    Arg::List(out)
}

/// Ident：按方言加引号的标识符节点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(pub String);

impl Builder for Ident {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        buf.write_str(&dialect.quote_ident(&self.0));
        Ok(())
    }

    fn nested_parens(&self) -> bool {
        false
    }
}

pub fn ident(name: impl Into<String>) -> Ident {
    Ident(name.into())
}

/// 插值器能够识别的全部参数形态。
#[derive(Clone)]
pub enum Arg {
    Value(SqlValue),
    Valuer(Box<dyn SqlValuer>),
    /// 展开为括号包裹、逗号分隔的参数序列。
    List(Vec<Arg>),
    Raw(Raw),
    Builder(Box<dyn Builder>),
}

impl Arg {
    pub fn null() -> Self {
        Self::Value(SqlValue::Null)
    }

    pub fn builder(b: impl Builder + 'static) -> Self {
        Self::Builder(Box::new(b))
    }

    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Self::Value(SqlValue::Null))
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Valuer(v) => f.debug_tuple("Valuer").field(v).finish(),
            Self::List(args) => f.debug_tuple("List").field(args).finish(),
            Self::Raw(r) => f.debug_tuple("Raw").field(r).finish(),
            Self::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Raw(a), Self::Raw(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Box<dyn Builder>> for Arg {
    fn from(v: Box<dyn Builder>) -> Self {
        Self::Builder(v)
    }
}

impl From<Box<dyn SqlValuer>> for Arg {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

impl From<Raw> for Arg {
    fn from(v: Raw) -> Self {
        Self::Raw(v)
    }
}

impl From<Ident> for Arg {
    fn from(v: Ident) -> Self {
        Self::Builder(Box::new(v))
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        SqlValue::I64(v).into()
    }
}
impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        SqlValue::I64(v as i64).into()
    }
}
impl From<u64> for Arg {
    fn from(v: u64) -> Self {
        SqlValue::U64(v).into()
    }
}
impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        SqlValue::U64(v as u64).into()
    }
}
impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v).into()
    }
}
impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        SqlValue::F64(v).into()
    }
}
impl From<&'static str> for Arg {
    fn from(v: &'static str) -> Self {
        SqlValue::from(v).into()
    }
}
impl From<String> for Arg {
    fn from(v: String) -> Self {
        SqlValue::from(v).into()
    }
}
impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v).into()
    }
}
impl From<time::OffsetDateTime> for Arg {
    fn from(v: time::OffsetDateTime) -> Self {
        SqlValue::from(v).into()
    }
}

impl<T> From<Option<T>> for Arg
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        SqlValue::from_option(v).into()
    }
}

/// 把标量、`Vec` 与数组递归展开为参数序列。
pub trait FlattenIntoArgs {
    fn flatten_into(self, out: &mut Vec<Arg>);
}

impl<T: Into<Arg>> FlattenIntoArgs for T {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        out.push(self.into());
    }
}

impl<T: FlattenIntoArgs> FlattenIntoArgs for Vec<T> {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        for v in self {
            v.flatten_into(out);
        }
    }
}

impl<T: FlattenIntoArgs, const N: usize> FlattenIntoArgs for [T; N] {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        for v in self {
            v.flatten_into(out);
        }
    }
}
