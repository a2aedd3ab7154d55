//! Connection 与 Session：把驱动、方言与事件接收器绑定到语句上。
//!
//! Connection 持有连接池与默认接收器；Session 是轻量的工作单元，
//! 未指定接收器时沿用 Connection 的同一个实例。由 Session 或 Tx 创建的语句
//! 携带 `Binding`，可以直接执行或装载。

use crate::builder::Builder;
use crate::context::Context;
use crate::delete::DeleteStmt;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::event::{EventReceiver, Receiver};
use crate::insert::InsertStmt;
use crate::load::{FromRow, FromValue, Load};
use crate::macros::IntoStrings;
use crate::modifiers::Arg;
use crate::runner::{self, Database, DriverError, ExecResult, Runner};
use crate::select::SelectStmt;
use crate::tx::Tx;
use crate::update::UpdateStmt;
use std::fmt;
use std::sync::Arc;

/// 根据驱动名与 DSN 建立连接池。
pub trait Connector {
    fn connect(&self, driver: &str, dsn: &str) -> Result<Arc<dyn Database>, DriverError>;
}

impl<F> Connector for F
where
    F: Fn(&str, &str) -> Result<Arc<dyn Database>, DriverError>,
{
    fn connect(&self, driver: &str, dsn: &str) -> Result<Arc<dyn Database>, DriverError> {
        self(driver, dsn)
    }
}

/// 打开连接。方言先于连接解析，未知驱动不会触发 `connector`。
pub fn open(
    driver: &str,
    dsn: &str,
    receiver: Option<Receiver>,
    connector: &dyn Connector,
) -> Result<Connection, Error> {
    let Some(dialect) = Dialect::from_driver(driver) else {
        return Err(Error::NotSupported(driver.to_string()));
    };
    let db = connector.connect(driver, dsn).map_err(Error::Driver)?;
    tracing::debug!(target: "halo_dbr", driver, %dialect, "connection opened");
    Ok(Connection::new(db, dialect, receiver.unwrap_or_default()))
}

#[derive(Clone)]
pub struct Connection {
    db: Arc<dyn Database>,
    dialect: Dialect,
    receiver: Receiver,
}

impl Connection {
    pub fn new(db: Arc<dyn Database>, dialect: Dialect, receiver: Receiver) -> Self {
        Self {
            db,
            dialect,
            receiver,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn db(&self) -> &Arc<dyn Database> {
        &self.db
    }

    pub fn new_session(&self, receiver: Option<Receiver>) -> Session {
        self.new_session_context(Context::background(), receiver)
    }

    pub fn new_session_context(&self, ctx: Context, receiver: Option<Receiver>) -> Session {
        Session {
            conn: self.clone(),
            receiver: receiver.unwrap_or_else(|| self.receiver.clone()),
            ctx,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect)
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    conn: Connection,
    receiver: Receiver,
    ctx: Context,
}

impl Session {
    /// 在同一连接上派生新 Session；未指定接收器时沿用当前的。
    pub fn new_session(&self, receiver: Option<Receiver>) -> Session {
        Session {
            conn: self.conn.clone(),
            receiver: receiver.unwrap_or_else(|| self.receiver.clone()),
            ctx: self.ctx.clone(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn dialect(&self) -> Dialect {
        self.conn.dialect
    }

    pub fn begin(&self) -> Result<Tx, Error> {
        match self.conn.db.begin(&self.ctx) {
            Ok(tx) => {
                self.receiver.event("dbr.begin");
                Ok(Tx::new(
                    tx,
                    self.receiver.clone(),
                    self.dialect(),
                    self.ctx.clone(),
                ))
            }
            Err(e) => {
                self.receiver.event_err("dbr.begin.error", &*e);
                Err(Error::Driver(e))
            }
        }
    }
}

/// 语句执行所需的一切：runner、接收器、方言与默认 Context。
#[derive(Clone)]
pub struct Binding {
    runner: Arc<dyn Runner>,
    receiver: Receiver,
    dialect: Dialect,
    ctx: Context,
}

impl Binding {
    pub(crate) fn new(
        runner: Arc<dyn Runner>,
        receiver: Receiver,
        dialect: Dialect,
        ctx: Context,
    ) -> Self {
        Self {
            runner,
            receiver,
            dialect,
            ctx,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    fn exec(&self, ctx: &Context, stmt: &dyn Builder) -> Result<ExecResult, Error> {
        runner::exec(ctx, self.runner.as_ref(), &self.receiver, stmt, self.dialect)
    }

    fn query<D: Load + ?Sized>(
        &self,
        ctx: &Context,
        stmt: &dyn Builder,
        dest: &mut D,
    ) -> Result<usize, Error> {
        runner::query(
            ctx,
            self.runner.as_ref(),
            &self.receiver,
            stmt,
            self.dialect,
            dest,
        )
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("dialect", &self.dialect)
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

/// 语句工厂；Session 与 Tx 都实现它。
pub trait SessionRunner {
    fn binding(&self) -> Binding;

    fn select<T: IntoStrings>(&self, columns: T) -> SelectStmt {
        SelectStmt::new(columns).bind(self.binding())
    }

    fn select_by_sql(
        &self,
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> SelectStmt {
        SelectStmt::by_sql(query, args).bind(self.binding())
    }

    fn insert_into(&self, table: impl Into<String>) -> InsertStmt {
        InsertStmt::new(table).bind(self.binding())
    }

    fn insert_by_sql(
        &self,
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> InsertStmt {
        InsertStmt::by_sql(query, args).bind(self.binding())
    }

    fn update(&self, table: impl Into<String>) -> UpdateStmt {
        UpdateStmt::new(table).bind(self.binding())
    }

    fn update_by_sql(
        &self,
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> UpdateStmt {
        UpdateStmt::by_sql(query, args).bind(self.binding())
    }

    fn delete_from(&self, table: impl Into<String>) -> DeleteStmt {
        DeleteStmt::new(table).bind(self.binding())
    }

    fn delete_by_sql(
        &self,
        query: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<Arg>>,
    ) -> DeleteStmt {
        DeleteStmt::by_sql(query, args).bind(self.binding())
    }
}

impl SessionRunner for Session {
    fn binding(&self) -> Binding {
        let runner: Arc<dyn Runner> = self.conn.db.clone();
        Binding::new(runner, self.receiver.clone(), self.dialect(), self.ctx.clone())
    }
}

/// 执行写语句。
pub trait Executer {
    /// 使用创建语句时的 Context。
    fn exec(&self) -> Result<ExecResult, Error>;
    fn exec_context(&self, ctx: &Context) -> Result<ExecResult, Error>;
}

/// 执行查询并装载结果。
pub trait Loader {
    fn load<D: Load + ?Sized>(&self, dest: &mut D) -> Result<usize, Error>;
    fn load_context<D: Load + ?Sized>(&self, ctx: &Context, dest: &mut D)
    -> Result<usize, Error>;

    /// 第一行；没有行时返回 `Error::NotFound`。
    fn load_struct<T: FromRow>(&self) -> Result<T, Error> {
        let mut one: Option<T> = None;
        self.load(&mut one)?;
        one.ok_or(Error::NotFound)
    }

    fn load_struct_context<T: FromRow>(&self, ctx: &Context) -> Result<T, Error> {
        let mut one: Option<T> = None;
        self.load_context(ctx, &mut one)?;
        one.ok_or(Error::NotFound)
    }

    fn load_structs<T: FromRow>(&self, dest: &mut Vec<T>) -> Result<usize, Error> {
        self.load(dest)
    }

    fn load_structs_context<T: FromRow>(
        &self,
        ctx: &Context,
        dest: &mut Vec<T>,
    ) -> Result<usize, Error> {
        self.load_context(ctx, dest)
    }

    /// 第一行第一列。
    fn load_value<T: FromValue>(&self) -> Result<T, Error> {
        self.load_struct()
    }

    fn load_value_context<T: FromValue>(&self, ctx: &Context) -> Result<T, Error> {
        self.load_struct_context(ctx)
    }

    fn load_values<T: FromValue>(&self, dest: &mut Vec<T>) -> Result<usize, Error> {
        self.load(dest)
    }

    fn load_values_context<T: FromValue>(
        &self,
        ctx: &Context,
        dest: &mut Vec<T>,
    ) -> Result<usize, Error> {
        self.load_context(ctx, dest)
    }
}

macro_rules! impl_executer {
    ($($stmt:ty),+ $(,)?) => {$(
        impl Executer for $stmt {
            fn exec(&self) -> Result<ExecResult, Error> {
                let b = self.binding.as_ref().ok_or(Error::Unbound)?;
                b.exec(&b.ctx, self)
            }

            fn exec_context(&self, ctx: &Context) -> Result<ExecResult, Error> {
                let b = self.binding.as_ref().ok_or(Error::Unbound)?;
                b.exec(ctx, self)
            }
        }
    )+};
}

macro_rules! impl_loader {
    ($($stmt:ty),+ $(,)?) => {$(
        impl Loader for $stmt {
            fn load<D: Load + ?Sized>(&self, dest: &mut D) -> Result<usize, Error> {
                let b = self.binding.as_ref().ok_or(Error::Unbound)?;
                b.query(&b.ctx, self, dest)
            }

            fn load_context<D: Load + ?Sized>(
                &self,
                ctx: &Context,
                dest: &mut D,
            ) -> Result<usize, Error> {
                let b = self.binding.as_ref().ok_or(Error::Unbound)?;
                b.query(ctx, self, dest)
            }
        }
    )+};
}

impl_executer!(InsertStmt, UpdateStmt, DeleteStmt);
impl_loader!(SelectStmt, InsertStmt);
