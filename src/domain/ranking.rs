// ==========================================
// 工厂不良预测分析系统 - 排名输出实体
// ==========================================
// 职责: RankedIssue 输出结构
// 生命周期: 每次运行重新计算,只作为渲染输入,不作为数据源
// ==========================================

use crate::domain::types::PriorityTier;
use serde::{Deserialize, Serialize};

// ==========================================
// 排名问题项 (Ranked Issue)
// ==========================================
// 按 (product_model, part_name) 分组聚合:
// weighted_rate = 平均预测概率 × 生产量权重 × 观测次数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedIssue {
    pub part_name: String,
    pub product_model: Option<String>,
    pub predicted_probability: f64,
    pub observed_count: usize,
    pub production_weight: f64,
    pub weighted_rate: f64,
    pub priority_tier: PriorityTier,
    pub suggested_action: String,
    pub top_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_issue_json_shape() {
        let issue = RankedIssue {
            part_name: "SPEED CONTROLLER".to_string(),
            product_model: Some("DRAGON".to_string()),
            predicted_probability: 0.42,
            observed_count: 3,
            production_weight: 0.5,
            weighted_rate: 0.63,
            priority_tier: PriorityTier::High,
            suggested_action: "누수 부위 전수 재검사".to_string(),
            top_keywords: vec!["leak".to_string()],
        };

        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["priority_tier"], "HIGH");
        assert_eq!(json["observed_count"], 3);
    }
}
