//! 事件接收器：执行管道在各个阶段上报事件、错误与耗时。
//!
//! 所有方法都有空实现，按需覆盖即可；`Receiver` 把普通接收器与
//! 可选的 span 能力放在一起，在 Connection、Session 与 Tx 之间共享同一实例。

use crate::context::Context;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// 事件附带的键值，例如 `{"sql": "..."}`。
pub type Kvs = BTreeMap<&'static str, String>;

pub trait EventReceiver: Send + Sync {
    fn event(&self, _name: &str) {}
    fn event_kv(&self, _name: &str, _kvs: &Kvs) {}
    fn event_err(&self, _name: &str, _err: &(dyn StdError + 'static)) {}
    fn event_err_kv(&self, _name: &str, _err: &(dyn StdError + 'static), _kvs: &Kvs) {}
    fn timing(&self, _name: &str, _elapsed: Duration) {}
    fn timing_kv(&self, _name: &str, _elapsed: Duration, _kvs: &Kvs) {}
}

/// 为单次驱动调用开启、标记与结束 span。
pub trait TracingEventReceiver: Send + Sync {
    /// 返回携带新 span 的派生 Context，驱动调用使用它。
    fn span_start(&self, ctx: &Context, event: &str, query: &str) -> Context;
    fn span_error(&self, ctx: &Context, err: &(dyn StdError + 'static));
    fn span_finish(&self, ctx: &Context);
}

/// 丢弃一切事件。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReceiver;

impl EventReceiver for NullReceiver {}

#[derive(Clone)]
pub enum Receiver {
    Plain(Arc<dyn EventReceiver>),
    Traced(Arc<dyn EventReceiver>, Arc<dyn TracingEventReceiver>),
}

impl Receiver {
    pub fn null() -> Self {
        Self::Plain(Arc::new(NullReceiver))
    }

    pub fn plain<R: EventReceiver + 'static>(r: R) -> Self {
        Self::Plain(Arc::new(r))
    }

    pub fn plain_arc<R: EventReceiver + 'static>(r: Arc<R>) -> Self {
        Self::Plain(r)
    }

    pub fn traced<R: EventReceiver + TracingEventReceiver + 'static>(r: R) -> Self {
        Self::traced_arc(Arc::new(r))
    }

    /// 同一个对象同时承担事件与 span 两种职责。
    pub fn traced_arc<R: EventReceiver + TracingEventReceiver + 'static>(r: Arc<R>) -> Self {
        Self::Traced(r.clone(), r)
    }

    pub fn events(&self) -> &dyn EventReceiver {
        match self {
            Self::Plain(r) | Self::Traced(r, _) => r.as_ref(),
        }
    }

    pub fn tracer(&self) -> Option<&dyn TracingEventReceiver> {
        match self {
            Self::Plain(_) => None,
            Self::Traced(_, t) => Some(t.as_ref()),
        }
    }

    /// 是否指向同一个接收器实例。
    pub fn ptr_eq(&self, other: &Self) -> bool {
        let (Self::Plain(a) | Self::Traced(a, _)) = self;
        let (Self::Plain(b) | Self::Traced(b, _)) = other;
        Arc::ptr_eq(a, b)
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Receiver::Plain"),
            Self::Traced(..) => f.write_str("Receiver::Traced"),
        }
    }
}

impl EventReceiver for Receiver {
    fn event(&self, name: &str) {
        self.events().event(name)
    }

    fn event_kv(&self, name: &str, kvs: &Kvs) {
        self.events().event_kv(name, kvs)
    }

    fn event_err(&self, name: &str, err: &(dyn StdError + 'static)) {
        self.events().event_err(name, err)
    }

    fn event_err_kv(&self, name: &str, err: &(dyn StdError + 'static), kvs: &Kvs) {
        self.events().event_err_kv(name, err, kvs)
    }

    fn timing(&self, name: &str, elapsed: Duration) {
        self.events().timing(name, elapsed)
    }

    fn timing_kv(&self, name: &str, elapsed: Duration, kvs: &Kvs) {
        self.events().timing_kv(name, elapsed, kvs)
    }
}

/// 单个 `sql` 键的 Kvs。
pub(crate) fn sql_kvs(query: &str) -> Kvs {
    Kvs::from([("sql", query.to_string())])
}
