//! 过滤引擎的日志输出
//!
//! 编译器告警（未知操作符、畸形区间）和引擎的过滤摘要都是 `tracing` 事件，
//! 调用 [`init`] 后才会被打印。

pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// 日志级别，设为 "debug" 可看到每次过滤保留的记录数；`RUST_LOG` 优先
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 输出 JSON 行而不是人类可读格式
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// 读取 `RUST_LOG` 与 `JSON_LOGS`
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_level()),
            json_logs: std::env::var("JSON_LOGS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

/// 安装全局日志订阅者，只能成功一次
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    info!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "过滤引擎日志已启用"
    );

    Ok(())
}
