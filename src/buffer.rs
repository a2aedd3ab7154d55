//! Buffer：一次渲染/插值过程中累积的 SQL 文本与绑定参数。

use crate::modifiers::Arg;

/// 第 N 个登记的参数对应文本中从左到右第 N 个占位符。
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    sql: String,
    values: Vec<Arg>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// 写入 `items`，以 `sep` 分隔。
    pub fn write_joined<S: AsRef<str>>(&mut self, items: &[S], sep: &str) {
        for (i, s) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            self.sql.push_str(s.as_ref());
        }
    }

    /// 登记一个参数；调用方负责在文本中写入与之对应的占位符。
    pub fn write_value(&mut self, arg: impl Into<Arg>) {
        self.values.push(arg.into());
    }

    /// 写入通用占位符 `?` 并登记参数。
    pub fn write_placeholder(&mut self, arg: impl Into<Arg>) {
        self.sql.push('?');
        self.values.push(arg.into());
    }

    pub fn as_str(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[Arg] {
        &self.values
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn into_parts(self) -> (String, Vec<Arg>) {
        (self.sql, self.values)
    }
}
