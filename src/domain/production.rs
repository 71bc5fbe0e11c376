// ==========================================
// 工厂不良预测分析系统 - 生产量实体
// ==========================================
// 职责: 月生产量记录 / 模型权重集合
// 不变量: unit_count >= 0; 权重合计 = 1.0 ± 浮点误差
// ==========================================

use crate::domain::types::ProductionSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 生产量记录 (Production Record)
// ==========================================
// 一个机型在一个周期内的产量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub product_model: String,
    pub unit_count: u32,
    pub period: String,
}

// ==========================================
// 生产量权重 (Production Weights)
// ==========================================
// weight = unit_count / total, 经 min/max 夹取后重新归一化
// BTreeMap 保证遍历顺序确定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionWeights {
    pub period: String,
    pub source: ProductionSource,
    pub weights: BTreeMap<String, f64>,
}

impl ProductionWeights {
    /// 空权重集 (两级生产量来源均缺失时)
    pub fn empty(period: &str) -> Self {
        Self {
            period: period.to_string(),
            source: ProductionSource::Missing,
            weights: BTreeMap::new(),
        }
    }

    /// 查询机型权重
    ///
    /// 缺失机型返回 0.0 (零影响),由调用方记录数据质量告警
    pub fn weight_for(&self, product_model: &str) -> f64 {
        self.weights.get(product_model).copied().unwrap_or(0.0)
    }

    /// 权重合计 (不变量校验用)
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// 是否没有任何可用权重
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// 周期内机型清单 (确定顺序)
    pub fn models(&self) -> impl Iterator<Item = &String> {
        self.weights.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_for_missing_model_is_zero() {
        let weights = ProductionWeights::empty("월생산물량");
        assert_eq!(weights.weight_for("DRAGON"), 0.0);
        assert!(weights.is_empty());
        assert_eq!(weights.source, ProductionSource::Missing);
    }

    #[test]
    fn test_total_sums_weights() {
        let mut map = BTreeMap::new();
        map.insert("DRAGON".to_string(), 0.6);
        map.insert("GAIA-P".to_string(), 0.4);
        let weights = ProductionWeights {
            period: "월생산물량".to_string(),
            source: ProductionSource::Primary,
            weights: map,
        };
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }
}
