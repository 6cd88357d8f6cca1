//! 过滤操作符定义
//!
//! 规则在传输格式中以符号字符串携带操作符（如 `"%"`、`"*>"`），
//! 这里把符号解析为封闭的枚举，未知符号由调用方按“不匹配”处理。

use crate::error::FilterError;
use std::fmt;
use std::str::FromStr;

/// 比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
}

/// 聚合方式：把多个字段的数值合并成一个再比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Multiply,
    Divide,
}

/// 条件操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // 通配
    IncludeAll,
    ExcludeAll,

    // 相等比较
    Eq,
    Neq,

    // 包含检查（大小写不敏感）
    Like,
    NotLike,

    // 数值比较
    Gt,
    Lt,
    Between,

    // 布尔比较
    BoolEq,

    // 先聚合再比较
    Aggregate(Aggregation, Comparison),
}

/// 符号到操作符的查找表
const OPERATOR_TABLE: &[(&str, Operator)] = &[
    ("*", Operator::IncludeAll),
    ("!*", Operator::ExcludeAll),
    ("=", Operator::Eq),
    ("!=", Operator::Neq),
    ("%", Operator::Like),
    ("!%", Operator::NotLike),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    ("===", Operator::BoolEq),
    ("><", Operator::Between),
    ("*=", Operator::Aggregate(Aggregation::Multiply, Comparison::Eq)),
    ("*>", Operator::Aggregate(Aggregation::Multiply, Comparison::Gt)),
    ("*<", Operator::Aggregate(Aggregation::Multiply, Comparison::Lt)),
    ("/=", Operator::Aggregate(Aggregation::Divide, Comparison::Eq)),
    ("/>", Operator::Aggregate(Aggregation::Divide, Comparison::Gt)),
    ("/<", Operator::Aggregate(Aggregation::Divide, Comparison::Lt)),
];

impl Operator {
    /// 按符号查找操作符，未知符号返回 `None`
    pub fn lookup(symbol: &str) -> Option<Self> {
        OPERATOR_TABLE
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    /// 操作符的符号表示
    pub fn symbol(&self) -> &'static str {
        OPERATOR_TABLE
            .iter()
            .find(|(_, op)| op == self)
            .map(|(s, _)| *s)
            .unwrap_or("?")
    }

    /// 是否为聚合类操作符（字段先做算术合并，而不是逐个 OR）
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate(..))
    }

    /// 所有已识别的操作符
    pub fn all() -> impl Iterator<Item = Operator> {
        OPERATOR_TABLE.iter().map(|(_, op)| *op)
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Gt => write!(f, ">"),
            Self::Lt => write!(f, "<"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        for op in Operator::all() {
            assert_eq!(Operator::lookup(op.symbol()), Some(op));
        }
        assert_eq!(Operator::all().count(), 16);
    }

    #[test]
    fn test_aggregate_symbols() {
        assert_eq!(
            Operator::lookup("/>"),
            Some(Operator::Aggregate(Aggregation::Divide, Comparison::Gt))
        );
        assert!(Operator::lookup("*<").unwrap().is_aggregate());
        assert!(!Operator::lookup("><").unwrap().is_aggregate());
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(Operator::lookup(">="), None);
        assert_eq!(Operator::lookup(""), None);

        let err = "~".parse::<Operator>().unwrap_err();
        assert!(matches!(err, FilterError::UnknownOperator(ref s) if s == "~"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Operator::BoolEq.to_string(), "===");
        assert_eq!(Operator::NotLike.to_string(), "!%");
        assert_eq!(Comparison::Gt.to_string(), ">");
    }
}
