//! 具名过滤转换
//!
//! 宿主（模板、脚本、服务）按名称调用过滤：`include`、`exclude`、`statesInclude`、
//! `statesExclude`、`masterInclude`、`masterExclude`。[`Transform`] 携带每种转换的参数，
//! 可以从 JSON 描述中解析，[`ProductFilters`] 按顺序应用单个转换或整条管道。

use crate::engine::FilterEngine;
use crate::error::Result;
use crate::group::GroupFilterEngine;
use crate::models::{FilterSet, Rule, State};
use product_filter_shared::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// 具名转换及其参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Transform {
    Include {
        #[serde(default)]
        filters: FilterSet,
    },
    Exclude {
        #[serde(default)]
        filters: FilterSet,
    },
    StatesInclude {
        #[serde(default)]
        states: Vec<State>,
    },
    StatesExclude {
        #[serde(default)]
        states: Vec<State>,
    },
    MasterInclude {
        #[serde(rename = "criteriaName", default)]
        criteria_name: String,
        #[serde(default)]
        states: Vec<State>,
    },
    MasterExclude {
        #[serde(rename = "criteriaName", default)]
        criteria_name: String,
        #[serde(default)]
        states: Vec<State>,
    },
}

impl Transform {
    /// 从 JSON 解析单个转换
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 数组解析转换管道
    pub fn pipeline_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// 转换名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Include { .. } => "include",
            Self::Exclude { .. } => "exclude",
            Self::StatesInclude { .. } => "statesInclude",
            Self::StatesExclude { .. } => "statesExclude",
            Self::MasterInclude { .. } => "masterInclude",
            Self::MasterExclude { .. } => "masterExclude",
        }
    }
}

/// 过滤入口
///
/// 通过构造参数注入规则引擎和分组引擎，不依赖任何全局注册。
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    group: GroupFilterEngine,
}

impl ProductFilters {
    pub fn new(group: GroupFilterEngine) -> Self {
        Self { group }
    }

    /// 按应用配置构建
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(GroupFilterEngine::new(FilterEngine::new(
            config.engine.clone(),
        )))
    }

    pub fn engine(&self) -> &FilterEngine {
        self.group.engine()
    }

    pub fn group(&self) -> &GroupFilterEngine {
        &self.group
    }

    pub fn include<'a, I>(&self, records: I, filters: &[Rule]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.engine().include(records, filters)
    }

    pub fn exclude<'a, I>(&self, records: I, filters: &[Rule]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.engine().exclude(records, filters)
    }

    pub fn include_by_states<'a, I>(&self, records: I, states: &[State]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.group.include_by_states(records, states)
    }

    pub fn exclude_by_states<'a, I>(&self, records: I, states: &[State]) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.group.exclude_by_states(records, states)
    }

    pub fn include_by_criteria<'a, I>(
        &self,
        records: I,
        criteria_name: &str,
        states: &[State],
    ) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.group.include_by_criteria(records, criteria_name, states)
    }

    pub fn exclude_by_criteria<'a, I>(
        &self,
        records: I,
        criteria_name: &str,
        states: &[State],
    ) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.group.exclude_by_criteria(records, criteria_name, states)
    }

    pub fn match_ratio<'a, I>(&self, records: I, filters: &[Rule]) -> f64
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.engine().match_ratio(records, filters)
    }

    /// 应用单个具名转换
    pub fn apply<'a, I>(&self, transform: &Transform, records: I) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        match transform {
            Transform::Include { filters } => self.include(records, filters),
            Transform::Exclude { filters } => self.exclude(records, filters),
            Transform::StatesInclude { states } => self.include_by_states(records, states),
            Transform::StatesExclude { states } => self.exclude_by_states(records, states),
            Transform::MasterInclude {
                criteria_name,
                states,
            } => self.include_by_criteria(records, criteria_name, states),
            Transform::MasterExclude {
                criteria_name,
                states,
            } => self.exclude_by_criteria(records, criteria_name, states),
        }
    }

    /// 从左到右依次应用转换，前一步的输出作为后一步的输入
    pub fn apply_pipeline<'a, I>(&self, transforms: &[Transform], records: I) -> Vec<&'a Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut current: Vec<&Value> = records.into_iter().collect();

        for transform in transforms {
            let before = current.len();
            current = self.apply(transform, current);
            debug!(
                transform = transform.name(),
                before,
                after = current.len(),
                "转换已应用"
            );
        }

        current
    }
}
