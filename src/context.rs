//! Context：随一次调用传递的取消信号、截止时间与当前 span。
//!
//! 驱动在执行前后检查 `err()`，据此提前返回。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
    span: Option<SpanId>,
}

/// 取消与之关联的 Context 及其所有派生 Context。
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// 永不取消、没有截止时间的根 Context。
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let mut ctx = self.clone();
        ctx.cancel.push(flag.clone());
        (ctx, CancelHandle(flag))
    }

    /// 取更早的截止时间，派生 Context 不会比父级活得更久。
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut ctx = self.clone();
        ctx.deadline = Some(match self.deadline {
            Some(d) if d < deadline => d,
            _ => deadline,
        });
        ctx
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_span(&self, span: SpanId) -> Self {
        let mut ctx = self.clone();
        ctx.span = Some(span);
        ctx
    }

    pub fn span(&self) -> Option<SpanId> {
        self.span
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn err(&self) -> Option<ContextError> {
        if self.cancel.iter().any(|f| f.load(Ordering::SeqCst)) {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}
