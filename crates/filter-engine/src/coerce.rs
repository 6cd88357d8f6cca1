//! 值转换
//!
//! 规则中的表达式总是字符串，而记录中的字段可能是字符串、数值、布尔或嵌套对象。
//! 这里集中处理比较前需要的类型归一化。

use serde_json::Value;
use std::fmt;

/// 字符串按“真实类型”解析后的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TrueType {
    Number(f64),
    Text(String),
}

impl TrueType {
    /// 与记录中的值做严格的类型相等比较：数值只等于数值，文本只等于字符串
    pub fn strict_eq(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Number(expected), Value::Number(n)) => n.as_f64() == Some(*expected),
            (Self::Text(expected), Value::String(actual)) => actual == expected,
            _ => false,
        }
    }
}

impl fmt::Display for TrueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 值转换器
pub struct ValueCoercer;

impl ValueCoercer {
    /// 整个字符串是否为数字；是则返回数值
    ///
    /// 首尾空白被忽略，空串、`NaN`、无穷大都不算数字。
    pub fn parse_number(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// 把字符串转换为真实类型：数字返回数值，否则原样返回
    pub fn coerce_true_type(raw: &str) -> TrueType {
        match Self::parse_number(raw) {
            Some(n) => TrueType::Number(n),
            None => TrueType::Text(raw.to_string()),
        }
    }

    /// 把标签转换为驼峰字段名，如 "Is Active" -> "isActive"
    ///
    /// 只改动首字母：整体首字母小写，后续单词首字母大写，其余字符保持原样。
    pub fn to_camel_case(label: &str) -> String {
        let mut chars = label.chars();
        let lowered: String = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => return String::new(),
        };

        let mut parts = lowered.split(' ');
        let mut result = parts.next().unwrap_or_default().to_string();

        for part in parts {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                result.extend(first.to_uppercase());
                result.push_str(chars.as_str());
            }
        }

        result
    }

    /// 从字段值中提取数值，如 `"5 kg"` -> 5
    ///
    /// 完整的数字直接解析；否则取第一个能解析为数字的空白分隔片段；
    /// 都没有时返回 0。
    pub fn extract_number(value: Option<&Value>) -> f64 {
        let value = match value {
            Some(v) if !Self::is_falsy(Some(v)) => v,
            _ => return 0.0,
        };

        match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => Self::extract_number_from_str(s),
            _ => 0.0,
        }
    }

    /// 从字符串中提取数值
    pub fn extract_number_from_str(raw: &str) -> f64 {
        if let Some(n) = Self::parse_number(raw) {
            return n;
        }

        raw.split_whitespace()
            .find_map(Self::parse_number)
            .unwrap_or(0.0)
    }

    /// 是否为“假值”：缺失、null、false、0、空字符串
    pub fn is_falsy(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64().is_none_or(|n| n == 0.0),
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => false,
        }
    }

    /// 把字段值渲染为文本，用于包含检查
    pub fn to_text(value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(arr) => arr.iter().map(Self::to_text).collect::<Vec<_>>().join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_true_type() {
        assert_eq!(ValueCoercer::coerce_true_type("5"), TrueType::Number(5.0));
        assert_eq!(ValueCoercer::coerce_true_type("-2.5"), TrueType::Number(-2.5));
        assert_eq!(
            ValueCoercer::coerce_true_type("Yes"),
            TrueType::Text("Yes".to_string())
        );
        assert_eq!(
            ValueCoercer::coerce_true_type("true"),
            TrueType::Text("true".to_string())
        );
        assert_eq!(ValueCoercer::coerce_true_type(""), TrueType::Text(String::new()));
        assert_eq!(
            ValueCoercer::coerce_true_type("NaN"),
            TrueType::Text("NaN".to_string())
        );
    }

    #[test]
    fn test_strict_eq() {
        assert!(TrueType::Number(5.0).strict_eq(&json!(5)));
        assert!(TrueType::Number(5.0).strict_eq(&json!(5.0)));
        assert!(!TrueType::Number(5.0).strict_eq(&json!("5")));
        assert!(TrueType::Text("Red".to_string()).strict_eq(&json!("Red")));
        assert!(!TrueType::Text("Red".to_string()).strict_eq(&json!("red")));
        assert!(!TrueType::Text("true".to_string()).strict_eq(&json!(true)));
    }

    #[test]
    fn test_strict_eq_has_no_tolerance() {
        assert!(!TrueType::Number(1e-17).strict_eq(&json!(0)));
        assert!(!TrueType::Number(1e-17).strict_eq(&json!(2e-17)));
        assert!(TrueType::Number(0.0).strict_eq(&json!(0)));
        assert!(TrueType::Number(1e-17).strict_eq(&json!(1e-17)));
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(ValueCoercer::to_camel_case("Is Active"), "isActive");
        assert_eq!(ValueCoercer::to_camel_case("Colour"), "colour");
        assert_eq!(ValueCoercer::to_camel_case("has free Delivery"), "hasFreeDelivery");
        assert_eq!(ValueCoercer::to_camel_case("Product SKU code"), "productSKUCode");
        assert_eq!(ValueCoercer::to_camel_case("In  Stock"), "inStock");
        assert_eq!(ValueCoercer::to_camel_case(""), "");
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(ValueCoercer::extract_number(Some(&json!(12))), 12.0);
        assert_eq!(ValueCoercer::extract_number(Some(&json!("7.5"))), 7.5);
        assert_eq!(ValueCoercer::extract_number(Some(&json!("5 kg"))), 5.0);
        assert_eq!(ValueCoercer::extract_number(Some(&json!("approx 2.5 kg"))), 2.5);
        assert_eq!(ValueCoercer::extract_number(Some(&json!("heavy"))), 0.0);
        assert_eq!(ValueCoercer::extract_number(Some(&json!(true))), 0.0);
        assert_eq!(ValueCoercer::extract_number(Some(&json!({"a": 1}))), 0.0);
        assert_eq!(ValueCoercer::extract_number(Some(&json!(null))), 0.0);
        assert_eq!(ValueCoercer::extract_number(None), 0.0);
    }

    #[test]
    fn test_is_falsy() {
        assert!(ValueCoercer::is_falsy(None));
        assert!(ValueCoercer::is_falsy(Some(&json!(null))));
        assert!(ValueCoercer::is_falsy(Some(&json!(false))));
        assert!(ValueCoercer::is_falsy(Some(&json!(0))));
        assert!(ValueCoercer::is_falsy(Some(&json!(""))));
        assert!(!ValueCoercer::is_falsy(Some(&json!(true))));
        assert!(!ValueCoercer::is_falsy(Some(&json!("0"))));
        assert!(!ValueCoercer::is_falsy(Some(&json!([]))));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(ValueCoercer::to_text(&json!(true)), "true");
        assert_eq!(ValueCoercer::to_text(&json!(5)), "5");
        assert_eq!(ValueCoercer::to_text(&json!(5.0)), "5");
        assert_eq!(ValueCoercer::to_text(&json!(5.25)), "5.25");
        assert_eq!(ValueCoercer::to_text(&json!(["a", 1])), "a,1");
        assert_eq!(ValueCoercer::to_text(&json!("Blue")), "Blue");
    }
}
