//! 驱动接口与带观测的执行管道。
//!
//! 一次执行分三段：插值（失败上报 `*.interpolate`）、计时（无论成败都上报）、
//! 驱动调用（有 tracer 时包在 span 内）。计时与 span 都由守卫在 drop 时收尾，
//! 因此任何提前返回都不会漏报。

use crate::builder::Builder;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::event::{EventReceiver, Kvs, Receiver, TracingEventReceiver, sql_kvs};
use crate::interpolate::Interpolator;
use crate::load::Load;
use crate::value::{SqlValue, format_values};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;

/// 驱动返回的原始错误，原样交还给调用方。
pub type DriverError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// 查询结果游标。
pub trait Rows {
    fn columns(&self) -> &[String];
    /// 下一行；`None` 表示读完。
    fn next_row(&mut self) -> Option<Result<Vec<SqlValue>, DriverError>>;
}

/// 能执行 SQL 的对象：连接池或事务。
pub trait Runner: Send + Sync {
    fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[SqlValue],
    ) -> Result<ExecResult, DriverError>;

    fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[SqlValue],
    ) -> Result<Box<dyn Rows>, DriverError>;

    fn exec(&self, query: &str, args: &[SqlValue]) -> Result<ExecResult, DriverError> {
        self.exec_context(&Context::background(), query, args)
    }

    fn query(&self, query: &str, args: &[SqlValue]) -> Result<Box<dyn Rows>, DriverError> {
        self.query_context(&Context::background(), query, args)
    }
}

pub trait Database: Runner {
    fn begin(&self, ctx: &Context) -> Result<Arc<dyn Transaction>, DriverError>;
}

pub trait Transaction: Runner {
    fn commit(&self) -> Result<(), DriverError>;
    fn rollback(&self) -> Result<(), DriverError>;
}

/// drop 时上报 `timing_kv`。
struct TimingGuard<'a> {
    receiver: &'a Receiver,
    event: &'static str,
    query: &'a str,
    start: Instant,
}

impl<'a> TimingGuard<'a> {
    fn start(receiver: &'a Receiver, event: &'static str, query: &'a str) -> Self {
        Self {
            receiver,
            event,
            query,
            start: Instant::now(),
        }
    }
}

impl Drop for TimingGuard<'_> {
    fn drop(&mut self) {
        self.receiver
            .timing_kv(self.event, self.start.elapsed(), &sql_kvs(self.query));
    }
}

/// 没有 tracer 时只透传 Context；否则 drop 时结束 span。
struct SpanGuard<'a> {
    tracer: Option<&'a dyn TracingEventReceiver>,
    ctx: Context,
}

impl<'a> SpanGuard<'a> {
    fn start(receiver: &'a Receiver, ctx: &Context, event: &str, query: &str) -> Self {
        match receiver.tracer() {
            Some(t) => Self {
                tracer: Some(t),
                ctx: t.span_start(ctx, event, query),
            },
            None => Self {
                tracer: None,
                ctx: ctx.clone(),
            },
        }
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn error(&self, err: &(dyn StdError + 'static)) {
        if let Some(t) = self.tracer {
            t.span_error(&self.ctx, err);
        }
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        if let Some(t) = self.tracer {
            t.span_finish(&self.ctx);
        }
    }
}

/// 以顶层方式插值整条语句；失败时以部分 SQL 与已收集参数上报。
fn interpolate_statement(
    receiver: &Receiver,
    event: &'static str,
    builder: &dyn Builder,
    dialect: Dialect,
) -> Result<(String, Vec<SqlValue>), Error> {
    let mut i = Interpolator::new(dialect, true);
    let res = i.interpolate_builder(builder);
    let (query, values) = i.into_parts();
    match res {
        Ok(()) => Ok((query, values)),
        Err(e) => {
            let kvs = Kvs::from([("sql", query), ("args", format_values(&values))]);
            receiver.event_err_kv(event, &e, &kvs);
            Err(Error::Interpolate(e))
        }
    }
}

/// 插值并执行写语句。驱动错误原样包在 `Error::Driver` 中返回。
pub fn exec(
    ctx: &Context,
    runner: &dyn Runner,
    receiver: &Receiver,
    builder: &dyn Builder,
    dialect: Dialect,
) -> Result<ExecResult, Error> {
    let (query, values) =
        interpolate_statement(receiver, "dbr.exec.interpolate", builder, dialect)?;

    let _timing = TimingGuard::start(receiver, "dbr.exec", &query);

    let result = {
        let span = SpanGuard::start(receiver, ctx, "dbr.exec", &query);
        runner
            .exec_context(span.context(), &query, &values)
            .inspect_err(|e| span.error(&**e))
    };

    result.map_err(|e| {
        receiver.event_err_kv("dbr.exec.exec", &*e, &sql_kvs(&query));
        Error::Driver(e)
    })
}

/// 插值并执行查询，把结果装入 `dest`，返回装入的行数。
pub fn query<D: Load + ?Sized>(
    ctx: &Context,
    runner: &dyn Runner,
    receiver: &Receiver,
    builder: &dyn Builder,
    dialect: Dialect,
    dest: &mut D,
) -> Result<usize, Error> {
    let (query, values) =
        interpolate_statement(receiver, "dbr.select.interpolate", builder, dialect)?;

    let _timing = TimingGuard::start(receiver, "dbr.select", &query);

    let rows = {
        let span = SpanGuard::start(receiver, ctx, "dbr.select", &query);
        runner
            .query_context(span.context(), &query, &values)
            .inspect_err(|e| span.error(&**e))
    };

    let mut rows = match rows {
        Ok(rows) => rows,
        Err(e) => {
            receiver.event_err_kv("dbr.select.load.query", &*e, &sql_kvs(&query));
            return Err(Error::Driver(e));
        }
    };

    dest.load(&mut *rows).map_err(|e| {
        receiver.event_err_kv("dbr.select.load.scan", &e, &sql_kvs(&query));
        Error::Load(e)
    })
}
