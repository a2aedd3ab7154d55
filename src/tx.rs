//! Tx：事务。语句工厂与 Session 相同，只是在事务连接上执行。

use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::event::{EventReceiver, Receiver};
use crate::runner::{Runner, Transaction};
use crate::session::{Binding, SessionRunner};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Tx {
    tx: Arc<dyn Transaction>,
    receiver: Receiver,
    dialect: Dialect,
    ctx: Context,
    done: AtomicBool,
}

impl Tx {
    pub(crate) fn new(
        tx: Arc<dyn Transaction>,
        receiver: Receiver,
        dialect: Dialect,
        ctx: Context,
    ) -> Self {
        Self {
            tx,
            receiver,
            dialect,
            ctx,
            done: AtomicBool::new(false),
        }
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 已经提交或回滚过。
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    fn finish(&self) -> Result<(), Error> {
        if self.done.swap(true, Ordering::SeqCst) {
            return Err(Error::TxDone);
        }
        Ok(())
    }

    pub fn commit(&self) -> Result<(), Error> {
        self.finish()?;
        match self.tx.commit() {
            Ok(()) => {
                self.receiver.event("dbr.commit");
                Ok(())
            }
            Err(e) => {
                self.receiver.event_err("dbr.commit.error", &*e);
                Err(Error::Driver(e))
            }
        }
    }

    pub fn rollback(&self) -> Result<(), Error> {
        self.finish()?;
        match self.tx.rollback() {
            Ok(()) => {
                self.receiver.event("dbr.rollback");
                Ok(())
            }
            Err(e) => {
                self.receiver.event_err("dbr.rollback.error", &*e);
                Err(Error::Driver(e))
            }
        }
    }

    /// 尚未提交时回滚，常放在函数收尾处。已结束的事务什么也不做。
    pub fn rollback_unless_committed(&self) {
        if self.finish().is_err() {
            return;
        }
        match self.tx.rollback() {
            Ok(()) => self.receiver.event("dbr.rollback"),
            Err(e) => self
                .receiver
                .event_err("dbr.rollback_unless_committed", &*e),
        }
    }
}

impl SessionRunner for Tx {
    fn binding(&self) -> Binding {
        let runner: Arc<dyn Runner> = self.tx.clone();
        Binding::new(runner, self.receiver.clone(), self.dialect, self.ctx.clone())
    }
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("dialect", &self.dialect)
            .field("done", &self.is_done())
            .finish_non_exhaustive()
    }
}
