//! 共享库
//!
//! 包含过滤引擎及其宿主共用的配置加载与日志初始化代码。

pub mod config;
pub mod observability;

pub use crate::config::{AppConfig, EngineSettings};
pub use crate::observability::ObservabilityConfig;
