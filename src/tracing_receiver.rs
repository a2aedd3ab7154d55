//! 基于 `tracing` 的事件接收器。
//!
//! 事件与耗时按配置的级别输出，错误总是 ERROR；每次驱动调用开启一个
//! `dbr.query` span，按 `SpanId` 保存，直到 `span_finish`。

use crate::context::{Context, SpanId};
use crate::event::{EventReceiver, Kvs, TracingEventReceiver};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::Level;

const TARGET: &str = "halo_dbr";

/// 以运行时级别输出 tracing 事件。
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

#[derive(Debug)]
pub struct TracingReceiver {
    /// 事件与耗时的级别。
    pub level: Level,
    /// SQL 截断长度（字节）；`None` 不截断。
    pub max_sql_length: Option<usize>,
    next_span: AtomicU64,
    spans: Mutex<HashMap<SpanId, tracing::Span>>,
}

impl Default for TracingReceiver {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            next_span: AtomicU64::new(1),
            spans: Mutex::new(HashMap::new()),
        }
    }
}

impl TracingReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn render(&self, kvs: &Kvs) -> String {
        let mut out = String::new();
        for (i, (k, v)) in kvs.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(k);
            out.push('=');
            if *k == "sql" {
                out.push_str(&self.truncate_sql(v));
            } else {
                out.push_str(v);
            }
        }
        out
    }

    /// 当前仍未结束的 span 数。
    pub fn open_spans(&self) -> usize {
        self.spans.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn elapsed_nanos(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

/// 在 `max` 字节内截断，不切开多字节字符。
fn truncate_bytes(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl EventReceiver for TracingReceiver {
    fn event(&self, name: &str) {
        emit_at_level!(self.level, target: TARGET, event = name);
    }

    fn event_kv(&self, name: &str, kvs: &Kvs) {
        emit_at_level!(self.level, target: TARGET, event = name, kvs = %self.render(kvs));
    }

    fn event_err(&self, name: &str, err: &(dyn StdError + 'static)) {
        tracing::error!(target: TARGET, event = name, error = %err);
    }

    fn event_err_kv(&self, name: &str, err: &(dyn StdError + 'static), kvs: &Kvs) {
        tracing::error!(
            target: TARGET,
            event = name,
            error = %err,
            kvs = %self.render(kvs),
        );
    }

    fn timing(&self, name: &str, elapsed: Duration) {
        emit_at_level!(
            self.level,
            target: TARGET,
            event = name,
            elapsed_ns = elapsed_nanos(elapsed),
        );
    }

    fn timing_kv(&self, name: &str, elapsed: Duration, kvs: &Kvs) {
        emit_at_level!(
            self.level,
            target: TARGET,
            event = name,
            elapsed_ns = elapsed_nanos(elapsed),
            kvs = %self.render(kvs),
        );
    }
}

impl TracingEventReceiver for TracingReceiver {
    fn span_start(&self, ctx: &Context, event: &str, query: &str) -> Context {
        let id = SpanId(self.next_span.fetch_add(1, Ordering::Relaxed));
        let span = tracing::info_span!(
            target: TARGET,
            "dbr.query",
            event,
            sql = %self.truncate_sql(query),
        );
        self.spans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, span);
        ctx.with_span(id)
    }

    fn span_error(&self, ctx: &Context, err: &(dyn StdError + 'static)) {
        let Some(id) = ctx.span() else {
            return;
        };
        let spans = self.spans.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(span) = spans.get(&id) {
            span.in_scope(|| tracing::error!(target: TARGET, error = %err, "driver call failed"));
        }
    }

    fn span_finish(&self, ctx: &Context) {
        if let Some(id) = ctx.span() {
            self.spans
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truncate_respects_char_boundary() {
        assert_eq!(truncate_bytes("héllo", 2), "h");
        assert_eq!(truncate_bytes("abc", 10), "abc");
    }

    #[test]
    fn elapsed_is_reported_in_nanoseconds() {
        assert_eq!(elapsed_nanos(Duration::from_micros(3)), 3_000);
        assert_eq!(elapsed_nanos(Duration::MAX), u64::MAX);
    }

    #[test]
    fn render_truncates_only_sql() {
        let r = TracingReceiver::new().max_sql_length(6);
        let kvs = Kvs::from([
            ("args", "[1 2]".to_string()),
            ("sql", "SELECT * FROM t".to_string()),
        ]);
        assert_eq!(r.render(&kvs), "args=[1 2] sql=SELECT...");
    }

    #[test]
    fn spans_are_released_on_finish() {
        let r = TracingReceiver::new();
        let ctx = r.span_start(&Context::background(), "dbr.exec", "DELETE FROM t");
        assert!(ctx.span().is_some());
        assert_eq!(r.open_spans(), 1);

        r.span_finish(&ctx);
        assert_eq!(r.open_spans(), 0);
    }
}
