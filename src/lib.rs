//! halo-dbr：方言感知的 SQL 构建与插值，以及带事件上报的执行管道。
//!
//! - builder 树（语句、条件、原始片段）渲染为带通用 `?` 标记的模板；
//! - 插值器把模板转换为目标方言的原生占位符与有序绑定参数；
//! - Session / Tx 执行语句，并向 `EventReceiver` 上报事件、错误与耗时。

pub mod buffer;
pub mod builder;
pub mod condition;
pub mod context;
pub mod delete;
pub mod dialect;
pub mod error;
pub mod event;
pub mod insert;
pub mod interpolate;
pub mod load;
pub mod macros;
pub use crate::macros::*;
pub mod modifiers;
pub mod runner;
pub mod select;
#[cfg(test)]
mod select_tests;
pub mod session;
#[cfg(test)]
mod session_tests;
#[cfg(test)]
mod testutil;
pub mod tracing_receiver;
pub mod tx;
pub mod update;
pub mod value;
pub mod valuer;

pub use crate::buffer::Buffer;
pub use crate::builder::Builder;
pub use crate::condition::{
    BoolOp, CompareOp, Condition, and, eq, gt, gte, in_, is_not_null, is_null, like, lt, lte,
    neq, not_in, not_like, or,
};
pub use crate::context::{CancelHandle, Context, ContextError, SpanId};
pub use crate::delete::DeleteStmt;
pub use crate::dialect::Dialect;
pub use crate::error::Error;
pub use crate::event::{EventReceiver, Kvs, NullReceiver, Receiver, TracingEventReceiver};
pub use crate::insert::InsertStmt;
pub use crate::interpolate::{
    InterpolateError, Interpolator, PLACEHOLDER, interpolate_for_dialect,
};
pub use crate::load::{FromRow, FromValue, Load, LoadError, Row};
pub use crate::modifiers::{Arg, FlattenIntoArgs, Ident, Raw, expr, ident, list, raw};
pub use crate::runner::{Database, DriverError, ExecResult, Rows, Runner, Transaction};
pub use crate::select::{JoinKind, SelectStmt};
pub use crate::session::{
    Binding, Connection, Connector, Executer, Loader, Session, SessionRunner, open,
};
pub use crate::tracing_receiver::TracingReceiver;
pub use crate::tx::Tx;
pub use crate::update::UpdateStmt;
pub use crate::value::{SqlValue, format_values};
pub use crate::valuer::{SqlValuer, ValuerError};

/// 便捷命名空间：允许 `use halo_dbr::dbr::{...}` 形式导入。
pub mod dbr {
    pub use crate::*;
}
