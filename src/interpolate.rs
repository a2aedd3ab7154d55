//! 插值：把 builder 树与参数列表转换为方言 SQL 文本和有序绑定参数。
//!
//! 模板中的通用标记是 `?`。每个标记按参数形态处理：
//! - `Builder`：渲染到新的 Buffer，再递归插值进同一个输出（嵌套时按需加括号）；
//! - `Raw`：用片段自己的参数列表递归插值；
//! - `List`：展开为 `(a, b, c)`，空列表报错；
//! - `NULL`：写入 NULL 字面量，不占绑定位；
//! - 二进制：`ignore_binary` 时绑定，否则写入方言二进制字面量；
//! - 其余标量：写入原生占位符并登记绑定参数。
//!
//! PostgreSQL 的 `$n` 编号基于整个输出已登记的参数个数，因此跨嵌套层级全局递增。

use crate::buffer::Buffer;
use crate::builder::Builder;
use crate::dialect::Dialect;
use crate::modifiers::Arg;
use crate::value::SqlValue;
use crate::valuer::ValuerError;

/// 通用占位标记。
pub const PLACEHOLDER: &str = "?";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InterpolateError {
    #[error("wrong placeholder count: {expected} in template, {actual} args")]
    PlaceholderCount { expected: usize, actual: usize },
    #[error("condition combinator has no children")]
    EmptyCondition,
    #[error("empty list cannot be interpolated")]
    EmptyList,
    #[error("IN requires a list or a subquery")]
    NotEnumerable,
    #[error("table not specified")]
    TableNotSpecified,
    #[error("column not specified")]
    ColumnNotSpecified,
    #[error("value not specified")]
    ValueNotSpecified,
    #[error("column count mismatch: {expected} columns, {actual} values")]
    ColumnCountMismatch { expected: usize, actual: usize },
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    #[error(transparent)]
    Valuer(#[from] ValuerError),
}

/// 单次插值的状态：一个输出 Buffer、一个方言和 `ignore_binary` 开关。
///
/// 不可复用；用 `into_parts` 取出结果。
#[derive(Debug)]
pub struct Interpolator {
    buf: Buffer,
    dialect: Dialect,
    ignore_binary: bool,
}

impl Interpolator {
    pub fn new(dialect: Dialect, ignore_binary: bool) -> Self {
        Self {
            buf: Buffer::new(),
            dialect,
            ignore_binary,
        }
    }

    /// 插值 `query`，`args` 数量必须等于模板中的标记数。
    ///
    /// 模板恰好是单个 `?` 时，其参数视为顶层语句，不加括号。
    pub fn interpolate(&mut self, query: &str, args: &[Arg]) -> Result<(), InterpolateError> {
        self.interpolate_level(query, args, query == PLACEHOLDER)
    }

    fn interpolate_level(
        &mut self,
        query: &str,
        args: &[Arg],
        top_level: bool,
    ) -> Result<(), InterpolateError> {
        let pieces = split_markers(query, self.dialect);
        let markers = pieces.len() - 1;
        if markers != args.len() {
            return Err(InterpolateError::PlaceholderCount {
                expected: markers,
                actual: args.len(),
            });
        }

        for (piece, arg) in pieces.iter().zip(args) {
            self.buf.write_str(piece);
            self.encode_placeholder(arg, top_level)?;
        }
        self.buf.write_str(pieces[markers]);
        Ok(())
    }

    fn encode_placeholder(&mut self, arg: &Arg, top_level: bool) -> Result<(), InterpolateError> {
        match arg {
            Arg::Builder(b) => self.encode_builder(&**b, !top_level && b.nested_parens()),
            Arg::Raw(r) => self.interpolate_level(&r.query, &r.args, false),
            Arg::Valuer(v) => {
                let value = v.value()?;
                self.encode_value(value)
            }
            Arg::List(items) => {
                if items.is_empty() {
                    return Err(InterpolateError::EmptyList);
                }
                self.buf.write_char('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buf.write_str(", ");
                    }
                    self.encode_placeholder(item, false)?;
                }
                self.buf.write_char(')');
                Ok(())
            }
            Arg::Value(v) => self.encode_value(v.clone()),
        }
    }

    /// 以顶层方式插值单个节点，等价于 `interpolate("?", &[builder])`。
    pub fn interpolate_builder(&mut self, builder: &dyn Builder) -> Result<(), InterpolateError> {
        self.encode_builder(builder, false)
    }

    fn encode_builder(&mut self, b: &dyn Builder, paren: bool) -> Result<(), InterpolateError> {
        let mut pbuf = Buffer::new();
        b.build(self.dialect, &mut pbuf)?;
        if paren {
            self.buf.write_char('(');
        }
        let (sql, values) = pbuf.into_parts();
        self.interpolate_level(&sql, &values, false)?;
        if paren {
            self.buf.write_char(')');
        }
        Ok(())
    }

    fn encode_value(&mut self, value: SqlValue) -> Result<(), InterpolateError> {
        match value {
            SqlValue::Null => self.buf.write_str(self.dialect.null()),
            SqlValue::Bytes(b) if !self.ignore_binary => {
                self.buf.write_str(&self.dialect.encode_bytes(&b))
            }
            v => {
                let n = self.buf.value_count() + 1;
                self.buf.write_str(&self.dialect.placeholder(n));
                self.buf.write_value(v);
            }
        }
        Ok(())
    }

    /// 当前已累积的文本（出错时为部分结果）。
    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        let (sql, args) = self.buf.into_parts();
        let values = args
            .into_iter()
            .filter_map(|a| match a {
                Arg::Value(v) => Some(v),
                _ => None,
            })
            .collect();
        (sql, values)
    }
}

/// 以引号外的 `?` 切分模板，返回 `标记数 + 1` 段。
fn split_markers(query: &str, dialect: Dialect) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaping = false;
    let mut start = 0usize;

    for (i, c) in query.char_indices() {
        if escaping {
            escaping = false;
            continue;
        }

        match c {
            '\\' if quote.is_some_and(|q| dialect.backslash_escapes(q)) => {
                escaping = true;
            }
            '\'' | '"' | '`' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
            }
            '?' if quote.is_none() => {
                pieces.push(&query[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    pieces.push(&query[start..]);
    pieces
}

/// 把所有值直接写成字面量，得到一条完整的 SQL（只用于日志与调试，不用于执行）。
pub fn interpolate_for_dialect(
    query: &str,
    args: &[Arg],
    dialect: Dialect,
) -> Result<String, InterpolateError> {
    let mut i = Interpolator::new(dialect, false);
    i.interpolate(query, args)?;
    let (sql, values) = i.into_parts();
    dialect.inline(&sql, &values)
}

impl Dialect {
    /// 用 `values` 的字面量替换 `sql` 中的原生占位符。
    pub fn inline(self, sql: &str, values: &[SqlValue]) -> Result<String, InterpolateError> {
        match self {
            Dialect::PostgreSQL => postgresql_inline(sql, values),
            Dialect::MySQL | Dialect::SQLite | Dialect::ClickHouse => {
                question_mark_inline(self, sql, values)
            }
        }
    }

    /// 单个值的字面量编码。
    pub fn encode_literal(self, out: &mut String, v: &SqlValue) -> Result<(), InterpolateError> {
        match v {
            SqlValue::Null => out.push_str(self.null()),
            SqlValue::Bool(b) => out.push_str(self.encode_bool(*b)),
            SqlValue::I64(n) => out.push_str(&n.to_string()),
            SqlValue::U64(n) => out.push_str(&n.to_string()),
            SqlValue::F64(n) if !n.is_finite() => {
                return Err(InterpolateError::UnsupportedValue(n.to_string()));
            }
            SqlValue::F64(n) => out.push_str(&n.to_string()),
            SqlValue::String(s) => out.push_str(&self.encode_string(s)),
            SqlValue::Bytes(b) => out.push_str(&self.encode_bytes(b)),
            SqlValue::DateTime(dt) => out.push_str(&self.encode_time(dt)?),
        }
        Ok(())
    }
}

fn question_mark_inline(
    dialect: Dialect,
    query: &str,
    values: &[SqlValue],
) -> Result<String, InterpolateError> {
    let mut out = String::with_capacity(query.len() + values.len() * 20);
    let mut quote: Option<char> = None;
    let mut escaping = false;
    let mut idx = 0usize;

    for c in query.chars() {
        if escaping {
            out.push(c);
            escaping = false;
            continue;
        }

        match c {
            '\\' if quote.is_some_and(|q| dialect.backslash_escapes(q)) => {
                out.push(c);
                escaping = true;
            }
            '\'' | '"' | '`' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
                out.push(c);
            }
            '?' if quote.is_none() => {
                let v = values.get(idx).ok_or(InterpolateError::PlaceholderCount {
                    expected: idx + 1,
                    actual: values.len(),
                })?;
                dialect.encode_literal(&mut out, v)?;
                idx += 1;
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn postgresql_inline(query: &str, values: &[SqlValue]) -> Result<String, InterpolateError> {
    let mut out = String::with_capacity(query.len() + values.len() * 20);
    let mut quote: Option<char> = None; // '\'' | '"' | '$'(dollar-quote)
    let mut dollar_quote: Option<&str> = None;

    let bytes = query.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\'' | b'"' if quote.is_none() || quote == Some(c as char) => {
                quote = if quote.is_some() { None } else { Some(c as char) };
                out.push(c as char);
                i += 1;
            }
            b'$' if quote == Some('$') => {
                if let Some(dq) = dollar_quote
                    && query[i..].starts_with(dq)
                {
                    out.push_str(dq);
                    i += dq.len();
                    quote = None;
                    dollar_quote = None;
                    continue;
                }
                out.push('$');
                i += 1;
            }
            b'$' if quote.is_none() => {
                // $n 占位符
                let mut j = i + 1;
                if j < bytes.len() && bytes[j].is_ascii_digit() && bytes[j] != b'0' {
                    while j < bytes.len() && bytes[j].is_ascii_digit() {
                        j += 1;
                    }
                    let n: usize = query[i + 1..j]
                        .parse()
                        .map_err(|_| InterpolateError::UnsupportedValue(query[i..j].to_string()))?;
                    let v = values.get(n - 1).ok_or(InterpolateError::PlaceholderCount {
                        expected: n,
                        actual: values.len(),
                    })?;
                    Dialect::PostgreSQL.encode_literal(&mut out, v)?;
                    i = j;
                    continue;
                }

                // $tag$ 开始的 dollar quote
                let mut k = i + 1;
                while k < bytes.len() && bytes[k].is_ascii_alphabetic() {
                    k += 1;
                }
                if k < bytes.len() && bytes[k] == b'$' {
                    let dq = &query[i..=k];
                    out.push_str(dq);
                    quote = Some('$');
                    dollar_quote = Some(dq);
                    i = k + 1;
                    continue;
                }

                out.push('$');
                i += 1;
            }
            _ => {
                // 按字符推进，保证多字节 UTF-8 原样复制
                let ch_len = utf8_len(c);
                out.push_str(&query[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    Ok(out)
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
