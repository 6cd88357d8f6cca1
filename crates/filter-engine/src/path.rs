//! 字段路径解析

use serde_json::Value;

/// 字段路径解析器
pub struct PathResolver;

impl PathResolver {
    /// 获取字段值（支持点号分隔的路径，如 "size.width" 或 "variants.0.sku"）
    ///
    /// 任意一段缺失或中途遇到标量时返回 `None`，不会 panic。
    pub fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
        let mut current = record;

        for part in path.split('.') {
            match current {
                Value::Object(map) => {
                    current = map.get(part)?;
                }
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    current = arr.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }
}
