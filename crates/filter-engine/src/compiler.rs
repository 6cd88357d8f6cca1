//! 规则编译器
//!
//! 把过滤规则预解析为内存中的执行形式：操作符查表、字段路径与候选值拆分、
//! 区间边界预提取。同一组规则对大量记录求值时只需编译一次。

use crate::coerce::ValueCoercer;
use crate::error::{FilterError, Result};
use crate::models::{FilterSet, Rule};
use crate::operators::Operator;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// 编译后的单条规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 原始规则
    pub rule: Rule,
    /// 解析后的操作符，未知符号为 `None`
    pub operator: Option<Operator>,
    /// 拆分并去除空白后的字段路径（OR 组）
    pub fields: Vec<String>,
    /// 拆分并去除空白后的候选值（OR 组）
    pub values: Vec<String>,
    /// `><` 的 (min, max)，表达式不是恰好两部分时为 `None`
    pub range: Option<(f64, f64)>,
}

impl CompiledRule {
    /// 是否参与 AND 匹配
    pub fn is_active(&self) -> bool {
        self.rule.is_active()
    }

    /// 规则的可读描述
    pub fn describe(&self) -> String {
        format!(
            "{} {} {}",
            self.rule.field, self.rule.operator, self.rule.expression
        )
    }
}

/// 编译后的规则集合
#[derive(Debug, Clone, Default)]
pub struct CompiledFilterSet {
    rules: Vec<CompiledRule>,
    required_fields: HashSet<String>,
}

impl CompiledFilterSet {
    /// 原始规则集合是否为空（空集合有特殊的包含/排除语义）
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// 规则中使用的所有字段路径
    pub fn required_fields(&self) -> &HashSet<String> {
        &self.required_fields
    }
}

/// 规则校验发现的问题（不影响求值，求值时这些规则按不匹配处理）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleIssue {
    UnknownOperator { index: usize, operator: String },
    MalformedRange { index: usize, field: String, expression: String },
    EmptyField { index: usize },
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOperator { index, operator } => {
                write!(f, "规则 #{} 的操作符 '{}' 无法识别", index, operator)
            }
            Self::MalformedRange {
                index,
                field,
                expression,
            } => write!(
                f,
                "规则 #{} ({}) 的区间表达式 '{}' 需要 min,max 两部分",
                index, field, expression
            ),
            Self::EmptyField { index } => write!(f, "规则 #{} 的字段不能为空", index),
        }
    }
}

impl From<RuleIssue> for FilterError {
    fn from(issue: RuleIssue) -> Self {
        match issue {
            RuleIssue::UnknownOperator { operator, .. } => FilterError::UnknownOperator(operator),
            RuleIssue::MalformedRange {
                field, expression, ..
            } => FilterError::MalformedRange { field, expression },
            other @ RuleIssue::EmptyField { .. } => FilterError::ParseError(other.to_string()),
        }
    }
}

/// 规则编译器
#[derive(Debug, Clone)]
pub struct RuleCompiler {
    warn_on_invalid_rules: bool,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self {
            warn_on_invalid_rules: true,
        }
    }

    /// 设置是否对无效规则输出告警日志
    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_invalid_rules = enabled;
        self
    }

    /// 从 JSON 字符串编译规则集合
    pub fn compile_from_json(&self, json: &str) -> Result<CompiledFilterSet> {
        let filters: FilterSet = serde_json::from_str(json)?;
        Ok(self.compile(&filters))
    }

    /// 编译规则集合
    ///
    /// 编译从不失败：无效规则保留在集合中，求值时按不匹配处理。
    pub fn compile(&self, filters: &[Rule]) -> CompiledFilterSet {
        if self.warn_on_invalid_rules {
            for issue in self.validate(filters) {
                warn!(%issue, "过滤规则无效，求值时按不匹配处理");
            }
        }

        let rules: Vec<CompiledRule> = filters.iter().map(Self::compile_rule).collect();

        let required_fields = rules
            .iter()
            .filter(|r| r.is_active())
            .flat_map(|r| r.fields.iter().cloned())
            .filter(|f| !f.is_empty())
            .collect();

        CompiledFilterSet {
            rules,
            required_fields,
        }
    }

    /// 编译单条规则
    pub fn compile_rule(rule: &Rule) -> CompiledRule {
        let operator = Operator::lookup(&rule.operator);

        let range = match operator {
            Some(Operator::Between) => Self::parse_range(&rule.expression),
            _ => None,
        };

        CompiledRule {
            rule: rule.clone(),
            operator,
            fields: Self::split_list(&rule.field),
            values: Self::split_list(&rule.expression),
            range,
        }
    }

    /// 校验规则集合，返回所有发现的问题
    pub fn validate(&self, filters: &[Rule]) -> Vec<RuleIssue> {
        let mut issues = Vec::new();

        for (index, rule) in filters.iter().enumerate() {
            if !rule.is_active() {
                continue;
            }

            let operator = match Operator::lookup(&rule.operator) {
                Some(op) => op,
                None => {
                    issues.push(RuleIssue::UnknownOperator {
                        index,
                        operator: rule.operator.clone(),
                    });
                    continue;
                }
            };

            match operator {
                // 通配操作符不读取字段
                Operator::IncludeAll | Operator::ExcludeAll => continue,
                Operator::Between if Self::parse_range(&rule.expression).is_none() => {
                    issues.push(RuleIssue::MalformedRange {
                        index,
                        field: rule.field.clone(),
                        expression: rule.expression.clone(),
                    });
                }
                _ => {}
            }

            if rule.field.trim().is_empty() {
                issues.push(RuleIssue::EmptyField { index });
            }
        }

        issues
    }

    /// 严格校验：遇到第一个问题即返回错误
    pub fn check(&self, filters: &[Rule]) -> Result<()> {
        match self.validate(filters).into_iter().next() {
            Some(issue) => Err(issue.into()),
            None => Ok(()),
        }
    }

    /// 解析 "min,max" 区间表达式
    fn parse_range(expression: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = expression.split(',').collect();
        if parts.len() != 2 {
            return None;
        }

        Some((
            ValueCoercer::extract_number_from_str(parts[0]),
            ValueCoercer::extract_number_from_str(parts[1]),
        ))
    }

    /// 按逗号拆分并去除空白
    fn split_list(raw: &str) -> Vec<String> {
        raw.split(',').map(|s| s.trim().to_string()).collect()
    }
}

impl Default for RuleCompiler {
    fn default() -> Self {
        Self::new()
    }
}
