//! 状态分组过滤
//!
//! 状态（State）把一个值和一组过滤规则打包在一起。master 作用域的状态通过其内嵌规则匹配，
//! 其它作用域的状态直接比较记录上由条件名派生的驼峰字段。

use crate::coerce::{TrueType, ValueCoercer};
use crate::compiler::CompiledFilterSet;
use crate::engine::FilterEngine;
use crate::evaluator::RuleEvaluator;
use crate::models::{FilterSet, State};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// 预处理后的状态
struct PreparedState {
    value: TrueType,
    master_filters: Option<CompiledFilterSet>,
}

/// 状态分组过滤引擎
#[derive(Debug, Clone, Default)]
pub struct GroupFilterEngine {
    engine: FilterEngine,
}

impl GroupFilterEngine {
    pub fn new(engine: FilterEngine) -> Self {
        Self { engine }
    }

    /// 底层的规则过滤引擎
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// 按顺序拼接所有状态的内嵌规则
    pub fn flatten(states: &[State]) -> FilterSet {
        states
            .iter()
            .flat_map(|state| state.filters.iter().cloned())
            .collect()
    }

    /// 用所有状态拼接后的规则做包含过滤
    pub fn include_by_states<'a, I>(&self, records: I, states: &[State]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.engine.include(records, &Self::flatten(states))
    }

    /// 用所有状态拼接后的规则做排除过滤
    pub fn exclude_by_states<'a, I>(&self, records: I, states: &[State]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.engine.exclude(records, &Self::flatten(states))
    }

    /// 精确匹配：任一状态满足即返回 true（按顺序短路）
    ///
    /// 状态满足的条件：作用域为 master 且记录匹配其全部内嵌规则，
    /// 或记录上 `to_camel_case(criteria_name)` 字段严格等于状态名的真实类型值。
    pub fn exact_match(&self, record: &Value, states: &[State], criteria_name: &str) -> bool {
        let field = ValueCoercer::to_camel_case(criteria_name);
        states
            .iter()
            .any(|state| Self::state_matches(record, &field, &self.prepare(state)))
    }

    /// 保留精确匹配的记录（去重）
    pub fn include_by_criteria<'a, I>(
        &self,
        records: I,
        criteria_name: &str,
        states: &[State],
    ) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.filter_by_criteria(records, criteria_name, states, false)
    }

    /// 保留不精确匹配的记录（去重）
    pub fn exclude_by_criteria<'a, I>(
        &self,
        records: I,
        criteria_name: &str,
        states: &[State],
    ) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.filter_by_criteria(records, criteria_name, states, true)
    }

    fn prepare(&self, state: &State) -> PreparedState {
        PreparedState {
            value: ValueCoercer::coerce_true_type(&state.name),
            master_filters: state
                .is_master()
                .then(|| self.engine.compile(&state.filters)),
        }
    }

    fn state_matches(record: &Value, field: &str, state: &PreparedState) -> bool {
        let master_match = state
            .master_filters
            .as_ref()
            .is_some_and(|filters| RuleEvaluator::matches_compiled(record, filters));

        master_match
            || record
                .get(field)
                .is_some_and(|actual| state.value.strict_eq(actual))
    }

    #[instrument(skip_all, fields(criteria = criteria_name, states = states.len(), exclude = exclude))]
    fn filter_by_criteria<'a, I>(
        &self,
        records: I,
        criteria_name: &str,
        states: &[State],
        exclude: bool,
    ) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        if states.is_empty() {
            return if exclude {
                records.into_iter().collect()
            } else {
                Vec::new()
            };
        }

        let field = ValueCoercer::to_camel_case(criteria_name);
        let prepared: Vec<PreparedState> = states.iter().map(|s| self.prepare(s)).collect();

        // 按引用身份去重：同一条记录只保留一次，内容相同的不同记录各自保留
        let mut seen: HashSet<*const Value> = HashSet::new();
        let mut filtered: Vec<&Value> = Vec::new();
        for record in records {
            let matched = prepared
                .iter()
                .any(|state| Self::state_matches(record, &field, state));

            if matched != exclude && seen.insert(record as *const Value) {
                filtered.push(record);
            }
        }

        debug!(field = %field, kept = filtered.len(), "按条件过滤完成");
        filtered
    }
}
