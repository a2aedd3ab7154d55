//! 统一错误类型。

use crate::interpolate::InterpolateError;
use crate::load::LoadError;
use crate::runner::DriverError;
use std::error::Error as StdError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no dialect for driver '{0}'")]
    NotSupported(String),
    #[error(transparent)]
    Interpolate(#[from] InterpolateError),
    /// 驱动返回的原始错误，未做任何包装转换。
    #[error("{0}")]
    Driver(DriverError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("not found")]
    NotFound,
    #[error("statement is not bound to a session")]
    Unbound,
    #[error("transaction has already been committed or rolled back")]
    TxDone,
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// 驱动原始错误，可进一步 `downcast_ref` 成具体类型。
    pub fn driver_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Driver(e) => Some(&**e),
            _ => None,
        }
    }
}
