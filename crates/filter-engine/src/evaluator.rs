//! 规则评估器
//!
//! 实现操作符语义：字段路径 OR、候选值 OR、聚合后比较，以及 AND 组合。
//! 所有异常输入（缺失字段、未知操作符、畸形区间）都退化为不匹配，不会报错。

use crate::coerce::{TrueType, ValueCoercer};
use crate::compiler::{CompiledFilterSet, CompiledRule, RuleCompiler};
use crate::models::Rule;
use crate::operators::{Aggregation, Comparison, Operator};
use crate::path::PathResolver;
use serde_json::Value;

/// 规则评估器
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// 单条规则是否匹配记录
    pub fn matches_rule(record: &Value, rule: &Rule) -> bool {
        Self::evaluate(record, &RuleCompiler::compile_rule(rule))
    }

    /// 记录是否匹配全部规则（AND）
    ///
    /// 表达式或操作符为空的规则被跳过；没有任何有效规则时结果为不匹配。
    pub fn matches_all_rules(record: &Value, rules: &[Rule]) -> bool {
        let compiled = RuleCompiler::new().with_warnings(false).compile(rules);
        Self::matches_compiled(record, &compiled)
    }

    /// 记录是否匹配已编译的全部规则（AND，遇到不匹配立即返回）
    pub fn matches_compiled(record: &Value, filters: &CompiledFilterSet) -> bool {
        let mut matched = false;

        for rule in filters.rules().iter().filter(|r| r.is_active()) {
            matched = Self::evaluate(record, rule);
            if !matched {
                return false;
            }
        }

        matched
    }

    /// 评估单条已编译规则
    pub fn evaluate(record: &Value, rule: &CompiledRule) -> bool {
        let operator = match rule.operator {
            Some(op) => op,
            None => return false,
        };

        match operator {
            Operator::IncludeAll => true,
            Operator::ExcludeAll => false,
            Operator::Aggregate(aggregation, comparison) => {
                let total = Self::aggregate(record, &rule.fields, aggregation);
                Self::compare_number(comparison, total, &rule.rule.expression)
            }
            Operator::Between => match rule.range {
                Some((min, max)) => rule.fields.iter().any(|field| {
                    let actual = ValueCoercer::extract_number(PathResolver::resolve(record, field));
                    actual > min && actual < max
                }),
                None => false,
            },
            _ => rule.fields.iter().any(|field| {
                let field_value = PathResolver::resolve(record, field);
                rule.values
                    .iter()
                    .any(|value| Self::match_operator(operator, field_value, value))
            }),
        }
    }

    /// 用单个操作符比较字段值和单个候选值
    fn match_operator(operator: Operator, field_value: Option<&Value>, expression: &str) -> bool {
        match operator {
            Operator::Eq => Self::is_equal(field_value, expression),
            Operator::Neq => !Self::is_equal(field_value, expression),
            Operator::Like => Self::is_like(field_value, expression),
            Operator::NotLike => !Self::is_like(field_value, expression),
            Operator::Gt => Self::compare_number(
                Comparison::Gt,
                ValueCoercer::extract_number(field_value),
                expression,
            ),
            Operator::Lt => Self::compare_number(
                Comparison::Lt,
                ValueCoercer::extract_number(field_value),
                expression,
            ),
            Operator::BoolEq => Self::is_boolean(field_value, expression),
            // 以下操作符在 evaluate 中整体处理，不会逐值比较
            Operator::IncludeAll
            | Operator::ExcludeAll
            | Operator::Between
            | Operator::Aggregate(..) => false,
        }
    }

    /// 相等比较：假值永不相等；字符串按原文比较，数值按数值比较
    fn is_equal(field_value: Option<&Value>, expression: &str) -> bool {
        if ValueCoercer::is_falsy(field_value) {
            return false;
        }

        match field_value {
            Some(Value::String(s)) => s == expression,
            Some(v @ Value::Number(_)) => ValueCoercer::coerce_true_type(expression).strict_eq(v),
            _ => false,
        }
    }

    /// 包含检查（大小写不敏感），布尔值之外的假值不匹配
    fn is_like(field_value: Option<&Value>, expression: &str) -> bool {
        let value = match field_value {
            Some(v @ Value::Bool(_)) => v,
            Some(v) if !ValueCoercer::is_falsy(Some(v)) => v,
            _ => return false,
        };

        ValueCoercer::to_text(value)
            .to_lowercase()
            .contains(&expression.to_lowercase())
    }

    /// 布尔比较：假值视为 false，表达式只有 "true" 为真，非布尔字段不匹配
    fn is_boolean(field_value: Option<&Value>, expression: &str) -> bool {
        let actual = if ValueCoercer::is_falsy(field_value) {
            false
        } else {
            match field_value {
                Some(Value::Bool(b)) => *b,
                _ => return false,
            }
        };

        actual == (expression == "true")
    }

    /// 数值与表达式比较，表达式不是数字时不匹配
    ///
    /// 相等比较与 `=` 一致：值为 0 时视为假值，永不相等。
    fn compare_number(comparison: Comparison, actual: f64, expression: &str) -> bool {
        match comparison {
            Comparison::Eq => {
                actual != 0.0
                    && ValueCoercer::coerce_true_type(expression) == TrueType::Number(actual)
            }
            Comparison::Gt => {
                ValueCoercer::parse_number(expression).is_some_and(|expected| actual > expected)
            }
            Comparison::Lt => {
                ValueCoercer::parse_number(expression).is_some_and(|expected| actual < expected)
            }
        }
    }

    /// 把多个字段的数值按乘法或除法合并
    fn aggregate(record: &Value, fields: &[String], aggregation: Aggregation) -> f64 {
        let numbers = fields
            .iter()
            .map(|field| ValueCoercer::extract_number(PathResolver::resolve(record, field)));

        match aggregation {
            Aggregation::Multiply => numbers.product(),
            // 累计值为 0 时由下一个字段重新起算
            Aggregation::Divide => numbers.fold(0.0, |total, number| {
                if total != 0.0 { total / number } else { number }
            }),
        }
    }
}
