// ==========================================
// 工厂不良预测分析系统 - 领域类型定义
// ==========================================
// 职责: 优先级分档 / 生产量数据来源标记
// 序列化格式: SCREAMING_SNAKE_CASE (与前端 JSON 一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 优先级分档 (Priority Tier)
// ==========================================
// 红线: 档位由配置阈值决定,核心逻辑不写死数字
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityTier {
    Critical, // 立即处置
    High,     // 重点关注
    Medium,   // 常规跟踪
    Low,      // 留档观察
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityTier::Critical => write!(f, "CRITICAL"),
            PriorityTier::High => write!(f, "HIGH"),
            PriorityTier::Medium => write!(f, "MEDIUM"),
            PriorityTier::Low => write!(f, "LOW"),
        }
    }
}

// ==========================================
// 生产量数据来源 (Production Source)
// ==========================================
// 两级回退: 主表 → 备用表 → 缺失(权重归零并告警)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionSource {
    Primary,  // 主生产量表
    Fallback, // 备用生产量表
    Missing,  // 两级均缺失
}

impl fmt::Display for ProductionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionSource::Primary => write!(f, "PRIMARY"),
            ProductionSource::Fallback => write!(f, "FALLBACK"),
            ProductionSource::Missing => write!(f, "MISSING"),
        }
    }
}

// ==========================================
// 行丢弃原因 (Drop Reason)
// ==========================================
// 单行失败只记录不中断,按原因分别计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "detail")]
pub enum DropReason {
    ExcludedKeyword(String), // 命中排除关键字 (如 "He미보증")
    MissingField(String),    // 必填字段缺失 (제품명 / 부품명)
    InvalidDate(String),     // 发生日无法解析
    EmptyDetail,             // 不良内容为空
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::ExcludedKeyword(kw) => write!(f, "EXCLUDED_KEYWORD({})", kw),
            DropReason::MissingField(field) => write!(f, "MISSING_FIELD({})", field),
            DropReason::InvalidDate(value) => write!(f, "INVALID_DATE({})", value),
            DropReason::EmptyDetail => write!(f, "EMPTY_DETAIL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_tier_serde_format() {
        let json = serde_json::to_string(&PriorityTier::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn test_priority_tier_ordering() {
        // Critical 最高, Low 最低
        assert!(PriorityTier::Critical < PriorityTier::High);
        assert!(PriorityTier::High < PriorityTier::Medium);
        assert!(PriorityTier::Medium < PriorityTier::Low);
    }

    #[test]
    fn test_production_source_display() {
        assert_eq!(ProductionSource::Fallback.to_string(), "FALLBACK");
    }
}
