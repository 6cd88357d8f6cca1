//! 过滤引擎
//!
//! 在规则评估之上提供集合级操作：包含、排除、划分、匹配比例，以及单条记录的匹配报告。
//!
//! 空规则集合的约定：包含得到空集合，排除原样返回全部记录。

use crate::compiler::{CompiledFilterSet, RuleCompiler};
use crate::evaluator::RuleEvaluator;
use crate::models::{MatchReport, Rule};
use product_filter_shared::EngineSettings;
use serde_json::Value;
use tracing::{debug, instrument};

/// 过滤引擎
#[derive(Debug, Clone)]
pub struct FilterEngine {
    settings: EngineSettings,
    compiler: RuleCompiler,
}

impl FilterEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let compiler = RuleCompiler::new().with_warnings(settings.warn_on_invalid_rules);
        Self { settings, compiler }
    }

    /// 启用匹配报告中的评估追踪
    pub fn with_trace(mut self) -> Self {
        self.settings.trace_enabled = true;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 编译规则集合（按引擎配置决定是否输出无效规则告警）
    pub fn compile(&self, filters: &[Rule]) -> CompiledFilterSet {
        self.compiler.compile(filters)
    }

    /// 单条记录是否匹配全部规则
    pub fn matches(&self, record: &Value, filters: &[Rule]) -> bool {
        RuleEvaluator::matches_compiled(record, &self.compile(filters))
    }

    /// 保留匹配全部规则的记录
    pub fn include<'a, I>(&self, records: I, filters: &[Rule]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.filter_records(records, filters, false)
    }

    /// 保留不匹配的记录
    pub fn exclude<'a, I>(&self, records: I, filters: &[Rule]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.filter_records(records, filters, true)
    }

    /// 一次遍历同时得到 (包含, 排除) 两部分
    #[instrument(skip_all, fields(rules = filters.len()))]
    pub fn partition<'a, I>(&self, records: I, filters: &[Rule]) -> (Vec<&'a Value>, Vec<&'a Value>)
    where
        I: IntoIterator<Item = &'a Value>,
    {
        if filters.is_empty() {
            return (Vec::new(), records.into_iter().collect());
        }

        let compiled = self.compile(filters);
        let (included, excluded): (Vec<&Value>, Vec<&Value>) = records
            .into_iter()
            .partition(|record| RuleEvaluator::matches_compiled(record, &compiled));

        debug!(
            included = included.len(),
            excluded = excluded.len(),
            "记录划分完成"
        );

        (included, excluded)
    }

    /// 匹配比例：包含数 / 总数，空集合返回 0
    #[instrument(skip_all, fields(rules = filters.len()))]
    pub fn match_ratio<'a, I>(&self, records: I, filters: &[Rule]) -> f64
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let records: Vec<&Value> = records.into_iter().collect();
        if records.is_empty() {
            return 0.0;
        }

        let total = records.len();
        let included = self.include(records, filters).len();
        let ratio = included as f64 / total as f64;

        debug!(included, total, ratio, "匹配比例计算完成");
        ratio
    }

    /// 生成单条记录的匹配报告
    ///
    /// 结果与 [`RuleEvaluator::matches_all_rules`] 一致，额外记录匹配的规则和追踪信息。
    pub fn explain(&self, record: &Value, filters: &[Rule]) -> MatchReport {
        let compiled = self.compile(filters);
        let trace = self.settings.trace_enabled;
        let mut report = MatchReport::default();

        for (index, rule) in compiled.rules().iter().enumerate() {
            if !rule.is_active() {
                if trace {
                    report
                        .evaluation_trace
                        .push(format!("#{}: 跳过（表达式或操作符为空）", index));
                }
                continue;
            }

            report.evaluated_rules += 1;
            let matched = RuleEvaluator::evaluate(record, rule);

            if trace {
                report.evaluation_trace.push(format!(
                    "#{}: {} => {}",
                    index,
                    rule.describe(),
                    if matched { "MATCHED" } else { "NOT_MATCHED" }
                ));
            }

            if !matched {
                if trace {
                    report
                        .evaluation_trace
                        .push(format!("AND 短路 - 规则 #{} 不匹配", index));
                }
                report.matched = false;
                return report;
            }

            report.matched = true;
            report.matched_rules.push(rule.describe());
        }

        report
    }

    /// 包含/排除的公共实现
    #[instrument(skip_all, fields(rules = filters.len(), exclude = exclude))]
    fn filter_records<'a, I>(&self, records: I, filters: &[Rule], exclude: bool) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        if filters.is_empty() {
            return if exclude {
                records.into_iter().collect()
            } else {
                Vec::new()
            };
        }

        let compiled = self.compile(filters);
        let filtered: Vec<&Value> = records
            .into_iter()
            .filter(|record| RuleEvaluator::matches_compiled(record, &compiled) != exclude)
            .collect();

        debug!(kept = filtered.len(), "记录过滤完成");
        filtered
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
