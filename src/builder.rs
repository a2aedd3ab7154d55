//! Builder：可嵌套渲染的 SQL 节点。

use crate::buffer::Buffer;
use crate::dialect::Dialect;
use crate::interpolate::{InterpolateError, Interpolator};
use crate::value::SqlValue;
use dyn_clone::DynClone;

/// 所有语句与表达式节点的公共能力：把自身渲染进 `Buffer`。
///
/// 结构部分（关键字、加引号的标识符、运算符、括号）直接写入文本；
/// 其余任何值都写成通用标记 `?` 并通过 `Buffer::write_value` 登记，
/// 由插值器统一转换为方言占位符或 NULL 字面量。
pub trait Builder: DynClone + Send + Sync {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError>;

    /// 作为其它节点的参数嵌套时是否需要括号（顶层渲染从不加括号）。
    fn nested_parens(&self) -> bool {
        true
    }

    /// 渲染为最终 SQL 与绑定参数。
    fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<SqlValue>), InterpolateError>
    where
        Self: Sized,
    {
        let mut i = Interpolator::new(dialect, true);
        i.interpolate_builder(self)?;
        Ok(i.into_parts())
    }
}

dyn_clone::clone_trait_object!(Builder);

impl Builder for Box<dyn Builder> {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<(), InterpolateError> {
        (**self).build(dialect, buf)
    }

    fn nested_parens(&self) -> bool {
        (**self).nested_parens()
    }
}
