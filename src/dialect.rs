//! SQL 方言：控制标识符引号、字面量编码与原生占位符。

use crate::interpolate::InterpolateError;
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// 支持的数据库方言。值不可变，可以在线程间随意复制。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySQL,
    PostgreSQL,
    SQLite,
    ClickHouse,
}

const MICROS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");
const MILLIS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");
const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

impl Dialect {
    /// 按驱动名解析方言：`mysql` / `postgres` / `sqlite3` / `clickhouse`。
    pub fn from_driver(driver: &str) -> Option<Self> {
        match driver {
            "mysql" => Some(Self::MySQL),
            "postgres" => Some(Self::PostgreSQL),
            "sqlite3" => Some(Self::SQLite),
            "clickhouse" => Some(Self::ClickHouse),
            _ => None,
        }
    }

    fn quote_char(self) -> char {
        match self {
            Self::MySQL | Self::ClickHouse => '`',
            Self::PostgreSQL | Self::SQLite => '"',
        }
    }

    /// 在 `quote` 引起的内容里 `\` 是否为转义符（模板扫描据此跳过被转义的字符）。
    pub(crate) fn backslash_escapes(self, quote: char) -> bool {
        match self {
            Self::MySQL => matches!(quote, '\'' | '"'),
            Self::ClickHouse => matches!(quote, '\'' | '"' | '`'),
            Self::PostgreSQL | Self::SQLite => false,
        }
    }

    /// 为标识符加引号；`a.b` 逐段加引号，`*` 保持原样，内嵌引号字符会被双写。
    /// ClickHouse 的反引号内 `\` 也是转义符，需写成 `\\`。
    pub fn quote_ident(self, name: &str) -> String {
        let q = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            if part == "*" {
                out.push('*');
                continue;
            }
            out.push(q);
            for ch in part.chars() {
                if ch == q || (ch == '\\' && self.backslash_escapes(q)) {
                    out.push(ch);
                }
                out.push(ch);
            }
            out.push(q);
        }
        out
    }

    /// 第 `n` 个（从 1 开始）绑定参数的原生占位符。
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${n}"),
            Self::MySQL | Self::SQLite | Self::ClickHouse => "?".to_string(),
        }
    }

    pub fn null(self) -> &'static str {
        "NULL"
    }

    pub fn encode_bool(self, b: bool) -> &'static str {
        match (self, b) {
            (Self::PostgreSQL, true) => "TRUE",
            (Self::PostgreSQL, false) => "FALSE",
            (_, true) => "1",
            (_, false) => "0",
        }
    }

    pub fn encode_string(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 3);
        match self {
            Self::SQLite => {
                out.push('\'');
                for ch in s.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
                out.push('\'');
            }
            Self::PostgreSQL | Self::MySQL | Self::ClickHouse => {
                if self == Self::PostgreSQL {
                    out.push('E');
                }
                out.push('\'');
                for ch in s.chars() {
                    match ch {
                        '\u{0000}' => out.push_str("\\0"),
                        '\u{0008}' => out.push_str("\\b"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        '\u{001a}' => out.push_str("\\Z"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        _ => out.push(ch),
                    }
                }
                out.push('\'');
            }
        }
        out
    }

    pub fn encode_bytes(self, data: &[u8]) -> String {
        let mut out = String::with_capacity(data.len() * 2 + 16);
        match self {
            Self::MySQL | Self::SQLite => {
                out.push_str("X'");
                push_hex(&mut out, data);
                out.push('\'');
            }
            Self::PostgreSQL => {
                out.push_str("'\\x");
                push_hex(&mut out, data);
                out.push_str("'::bytea");
            }
            Self::ClickHouse => {
                out.push_str("unhex('");
                push_hex(&mut out, data);
                out.push_str("')");
            }
        }
        out
    }

    /// 时间字面量，四舍五入到微秒。
    pub fn encode_time(self, dt: &time::OffsetDateTime) -> Result<String, InterpolateError> {
        // 上界附近进位会越界，此时直接截断
        let dt = dt
            .checked_add(time::Duration::nanoseconds(500))
            .unwrap_or(*dt);
        let format_err = |e: time::error::Format| InterpolateError::UnsupportedValue(e.to_string());

        let body = match self {
            Self::MySQL | Self::ClickHouse => dt.format(MICROS_FORMAT).map_err(format_err)?,
            Self::SQLite => dt.format(MILLIS_FORMAT).map_err(format_err)?,
            Self::PostgreSQL => {
                let mut s = dt.format(MICROS_FORMAT).map_err(format_err)?;
                s.push_str(&dt.format(OFFSET_FORMAT).map_err(format_err)?);
                s
            }
        };
        Ok(format!("'{body}'"))
    }

    /// 对应 `INSERT ... IGNORE` 语义的动词前缀。
    pub fn prepare_insert_ignore(self) -> &'static str {
        match self {
            Self::MySQL => "INSERT IGNORE",
            Self::SQLite => "INSERT OR IGNORE",
            Self::PostgreSQL | Self::ClickHouse => "INSERT",
        }
    }

    /// 是否支持 `UPDATE/DELETE ... LIMIT n`。
    pub(crate) fn supports_mutation_limit(self) -> bool {
        matches!(self, Self::MySQL | Self::SQLite)
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[((b >> 4) & 0xF) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::ClickHouse => "ClickHouse",
        };
        f.write_str(s)
    }
}
