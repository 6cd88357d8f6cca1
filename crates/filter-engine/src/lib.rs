//! 商品过滤引擎
//!
//! 对结构化记录集合做声明式过滤，支持：
//! - 符号化的操作符语法（相等、包含、数值比较、布尔、区间、聚合）
//! - 点号嵌套路径与逗号分隔的字段/候选值 OR 组
//! - 规则预编译与 AND 短路求值
//! - 基于状态（State）的分组与 master/条件匹配
//! - 具名转换与转换管道

pub mod coerce;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod group;
pub mod models;
pub mod operators;
pub mod path;
pub mod transform;

pub use coerce::{TrueType, ValueCoercer};
pub use compiler::{CompiledFilterSet, CompiledRule, RuleCompiler, RuleIssue};
pub use engine::FilterEngine;
pub use error::{FilterError, Result};
pub use evaluator::RuleEvaluator;
pub use group::GroupFilterEngine;
pub use models::{FilterSet, MatchReport, Record, Rule, State};
pub use operators::{Aggregation, Comparison, Operator};
pub use path::PathResolver;
pub use product_filter_shared::{AppConfig, EngineSettings};
pub use transform::{ProductFilters, Transform};
