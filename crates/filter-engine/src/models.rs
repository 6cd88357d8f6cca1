//! 过滤引擎领域模型

use serde::{Deserialize, Serialize};

/// 被过滤的记录（任意 JSON 树）
pub type Record = serde_json::Value;

/// 过滤规则
///
/// `field` 可以包含逗号分隔的多个字段路径（OR 组），路径内用点号表示嵌套；
/// `expression` 始终是字符串，也可以用逗号分隔多个候选值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub expression: String,
}

impl Rule {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            expression: expression.into(),
        }
    }

    /// 表达式或操作符为空的规则在 AND 匹配时被跳过
    pub fn is_active(&self) -> bool {
        !self.expression.is_empty() && !self.operator.is_empty()
    }
}

/// 有序的规则集合，按 AND 组合
pub type FilterSet = Vec<Rule>;

/// 状态：带名称和作用域的一组过滤规则
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub filters: FilterSet,
}

impl State {
    pub fn new(name: impl Into<String>, target: impl Into<String>, filters: FilterSet) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            filters,
        }
    }

    /// 作用域是否为 master（大小写不敏感）
    pub fn is_master(&self) -> bool {
        self.target.eq_ignore_ascii_case("master")
    }
}

/// 单条记录的匹配报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchReport {
    pub matched: bool,
    /// 参与评估的有效规则数
    pub evaluated_rules: usize,
    /// 匹配成功的规则（`field operator expression`）
    pub matched_rules: Vec<String>,
    /// 逐条评估追踪，仅在启用追踪时记录
    pub evaluation_trace: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_deserialization() {
        let json = r#"
        [
            {"field": "brand", "operator": "=", "expression": "Acme"},
            {"field": "weight,size.width", "operator": "*>", "expression": "10"},
            {"field": "colour"}
        ]
        "#;

        let filters: FilterSet = serde_json::from_str(json).unwrap();
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[1].field, "weight,size.width");
        assert!(filters[0].is_active());
        assert!(!filters[2].is_active());
        assert_eq!(filters[2].operator, "");
    }

    #[test]
    fn test_state_deserialization() {
        let json = r#"
        {
            "name": "5",
            "target": "Master",
            "filters": [{"field": "stock", "operator": ">", "expression": "0"}]
        }
        "#;

        let state: State = serde_json::from_str(json).unwrap();
        assert!(state.is_master());
        assert_eq!(state.filters, vec![Rule::new("stock", ">", "0")]);

        let bare: State = serde_json::from_str(r#"{"name": "Yes", "target": "criteria"}"#).unwrap();
        assert!(!bare.is_master());
        assert!(bare.filters.is_empty());
    }

    #[test]
    fn test_rule_is_active() {
        assert!(Rule::new("a", "*", "_").is_active());
        assert!(!Rule::new("a", "", "1").is_active());
        assert!(!Rule::new("a", "=", "").is_active());
    }
}
