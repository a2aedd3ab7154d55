//! 测试用的假驱动与记录型接收器。

use crate::context::{Context, SpanId};
use crate::event::{EventReceiver, Kvs, TracingEventReceiver};
use crate::runner::{Database, DriverError, ExecResult, Rows, Runner, Transaction};
use crate::value::SqlValue;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fake driver: {0}")]
pub struct FakeError(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: &'static str,
    pub query: String,
    pub args: Vec<SqlValue>,
    pub span: Option<SpanId>,
}

/// 可编排结果的假 runner；Database 与 Transaction 共用。
#[derive(Debug, Default)]
pub struct FakeDb {
    pub fail: Option<String>,
    pub fail_begin: Option<String>,
    pub fail_commit: Option<String>,
    /// 第 N 行读取失败。
    pub fail_row: Option<usize>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    pub calls: Mutex<Vec<Call>>,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl FakeDb {
    pub fn with_rows(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            ..Self::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail: Some(msg.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, ctx: &Context, query: &str, args: &[SqlValue]) {
        self.calls.lock().unwrap().push(Call {
            kind,
            query: query.to_string(),
            args: args.to_vec(),
            span: ctx.span(),
        });
    }

    fn check(&self, ctx: &Context) -> Result<(), DriverError> {
        if let Some(e) = ctx.err() {
            return Err(Box::new(e));
        }
        match &self.fail {
            Some(msg) => Err(Box::new(FakeError(msg.clone()))),
            None => Ok(()),
        }
    }
}

impl Runner for FakeDb {
    fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[SqlValue],
    ) -> Result<ExecResult, DriverError> {
        self.record("exec", ctx, query, args);
        self.check(ctx)?;
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(1),
        })
    }

    fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[SqlValue],
    ) -> Result<Box<dyn Rows>, DriverError> {
        self.record("query", ctx, query, args);
        self.check(ctx)?;
        Ok(Box::new(FakeRows {
            columns: self.columns.clone(),
            rows: self.rows.clone().into(),
            fail_row: self.fail_row,
            read: 0,
        }))
    }
}

/// 通过 Arc 共享，测试结束后仍能检查调用记录。
#[derive(Debug, Default, Clone)]
pub struct SharedDb(pub Arc<FakeDb>);

impl Runner for SharedDb {
    fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[SqlValue],
    ) -> Result<ExecResult, DriverError> {
        self.0.exec_context(ctx, query, args)
    }

    fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[SqlValue],
    ) -> Result<Box<dyn Rows>, DriverError> {
        self.0.query_context(ctx, query, args)
    }
}

impl Database for SharedDb {
    fn begin(&self, ctx: &Context) -> Result<Arc<dyn Transaction>, DriverError> {
        if let Some(msg) = &self.0.fail_begin {
            return Err(Box::new(FakeError(msg.clone())));
        }
        if let Some(e) = ctx.err() {
            return Err(Box::new(e));
        }
        Ok(Arc::new(self.clone()))
    }
}

impl Transaction for SharedDb {
    fn commit(&self) -> Result<(), DriverError> {
        if let Some(msg) = &self.0.fail_commit {
            return Err(Box::new(FakeError(msg.clone())));
        }
        self.0.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&self) -> Result<(), DriverError> {
        self.0.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<SqlValue>>,
    fail_row: Option<usize>,
    read: usize,
}

impl Rows for FakeRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<Result<Vec<SqlValue>, DriverError>> {
        if self.fail_row == Some(self.read) {
            self.read += 1;
            return Some(Err(Box::new(FakeError("broken row".to_string()))));
        }
        self.read += 1;
        self.rows.pop_front().map(Ok)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Event(String),
    EventKv(String, Kvs),
    EventErr(String, String),
    EventErrKv(String, String, Kvs),
    Timing(String),
    TimingKv(String, Kvs),
    SpanStart(SpanId, String, String),
    SpanError(Option<SpanId>, String),
    SpanFinish(Option<SpanId>),
}

/// 记录所有事件与 span 调用，按发生顺序保存。
#[derive(Debug, Default)]
pub struct RecordingReceiver {
    pub log: Mutex<Vec<Recorded>>,
    next_span: AtomicU64,
}

impl RecordingReceiver {
    pub fn log(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    fn push(&self, r: Recorded) {
        self.log.lock().unwrap().push(r);
    }

    pub fn timings(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Timing(n) | Recorded::TimingKv(n, _) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::EventErr(n, _) | Recorded::EventErrKv(n, _, _) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Event(n) | Recorded::EventKv(n, _) => Some(n),
                _ => None,
            })
            .collect()
    }
}

impl EventReceiver for RecordingReceiver {
    fn event(&self, name: &str) {
        self.push(Recorded::Event(name.to_string()));
    }

    fn event_kv(&self, name: &str, kvs: &Kvs) {
        self.push(Recorded::EventKv(name.to_string(), kvs.clone()));
    }

    fn event_err(&self, name: &str, err: &(dyn StdError + 'static)) {
        self.push(Recorded::EventErr(name.to_string(), err.to_string()));
    }

    fn event_err_kv(&self, name: &str, err: &(dyn StdError + 'static), kvs: &Kvs) {
        self.push(Recorded::EventErrKv(
            name.to_string(),
            err.to_string(),
            kvs.clone(),
        ));
    }

    fn timing(&self, name: &str, _elapsed: Duration) {
        self.push(Recorded::Timing(name.to_string()));
    }

    fn timing_kv(&self, name: &str, _elapsed: Duration, kvs: &Kvs) {
        self.push(Recorded::TimingKv(name.to_string(), kvs.clone()));
    }
}

impl TracingEventReceiver for RecordingReceiver {
    fn span_start(&self, ctx: &Context, event: &str, query: &str) -> Context {
        let id = SpanId(self.next_span.fetch_add(1, Ordering::SeqCst) + 1);
        self.push(Recorded::SpanStart(id, event.to_string(), query.to_string()));
        ctx.with_span(id)
    }

    fn span_error(&self, ctx: &Context, err: &(dyn StdError + 'static)) {
        self.push(Recorded::SpanError(ctx.span(), err.to_string()));
    }

    fn span_finish(&self, ctx: &Context) {
        self.push(Recorded::SpanFinish(ctx.span()));
    }
}
