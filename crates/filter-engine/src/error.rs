//! 过滤引擎错误类型
//!
//! 匹配入口本身从不失败，这里的错误只来自解析类接口。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("规则解析失败: {0}")]
    ParseError(String),

    #[error("无效的操作符: {0}")]
    UnknownOperator(String),

    #[error("区间表达式格式错误: 字段 {field} 的表达式 '{expression}' 需要 min,max 两部分")]
    MalformedRange { field: String, expression: String },

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
