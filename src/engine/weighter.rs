// ==========================================
// 工厂不良预测分析系统 - 生产量权重引擎
// ==========================================
// 职责: 机型产量 → 归一化权重
// 不变量: 至少一个机型产量非零时,权重合计 = 1.0 ± 浮点误差
// ==========================================

use crate::config::MlConfig;
use crate::domain::{ProductionRecord, ProductionSource, ProductionWeights};
use std::collections::BTreeMap;

// ==========================================
// ProductionWeighter - 权重计算引擎
// ==========================================
pub struct ProductionWeighter {
    min_weight: f64,
    max_weight: f64,
}

impl ProductionWeighter {
    pub fn new(config: &MlConfig) -> Self {
        Self {
            min_weight: config.min_weight,
            max_weight: config.max_weight,
        }
    }

    /// 计算当期机型权重
    ///
    /// 步骤:
    /// 1) 原始权重 = unit_count / total
    /// 2) 夹取到 [min_weight, max_weight] (防止单一机型吞噬权重)
    /// 3) 重新归一化,保证合计为 1.0
    ///
    /// 记录集为空或总产量为零时返回空权重集并告警 (权重归零,非致命)
    pub fn compute(
        &self,
        records: &[ProductionRecord],
        source: ProductionSource,
        period: &str,
    ) -> ProductionWeights {
        let total: u64 = records.iter().map(|r| u64::from(r.unit_count)).sum();
        if records.is_empty() || total == 0 {
            tracing::warn!("生产量数据缺失: 周期 '{}' 所有机型权重归零", period);
            return ProductionWeights {
                period: period.to_string(),
                source: ProductionSource::Missing,
                weights: BTreeMap::new(),
            };
        }

        // 原始权重 + 夹取
        let mut clamped: BTreeMap<String, f64> = BTreeMap::new();
        for record in records {
            let raw = f64::from(record.unit_count) / total as f64;
            let weight = raw.clamp(self.min_weight, self.max_weight);
            // 同名机型合并计数后只保留一份 (输入已按机型聚合时无影响)
            clamped
                .entry(record.product_model.clone())
                .and_modify(|w| *w += weight)
                .or_insert(weight);
        }

        // 重新归一化
        let clamped_total: f64 = clamped.values().sum();
        let weights: BTreeMap<String, f64> = clamped
            .into_iter()
            .map(|(model, w)| (model, w / clamped_total))
            .collect();

        tracing::info!(
            "权重计算完成: 周期 '{}' {} 个机型, 来源 {}",
            period,
            weights.len(),
            source
        );

        ProductionWeights {
            period: period.to_string(),
            source,
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(model: &str, count: u32) -> ProductionRecord {
        ProductionRecord {
            product_model: model.to_string(),
            unit_count: count,
            period: "월생산물량".to_string(),
        }
    }

    fn weighter() -> ProductionWeighter {
        ProductionWeighter::new(&MlConfig::default())
    }

    #[test]
    fn test_weights_sum_to_one() {
        let records = vec![
            record("DRAGON", 60),
            record("GAIA-P", 25),
            record("WET 1000", 15),
        ];
        let weights =
            weighter().compute(&records, ProductionSource::Primary, "월생산물량");

        assert!((weights.total() - 1.0).abs() < 1e-9);
        assert_eq!(weights.weights.len(), 3);
    }

    #[test]
    fn test_clamping_limits_dominant_model() {
        // DRAGON 原始权重 0.9 超过 max_weight=0.40, 夹取后重新归一
        let records = vec![record("DRAGON", 90), record("GAIA-P", 10)];
        let weights =
            weighter().compute(&records, ProductionSource::Primary, "월생산물량");

        let dragon = weights.weight_for("DRAGON");
        let gaia = weights.weight_for("GAIA-P");
        assert!((weights.total() - 1.0).abs() < 1e-9);
        // 夹取后 0.40 / (0.40 + 0.10) = 0.8
        assert!((dragon - 0.8).abs() < 1e-9);
        assert!((gaia - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_min_weight_floor() {
        // 占比 1% 的机型被抬升到 min_weight 后归一化,仍高于原始占比
        let records = vec![record("DRAGON", 99), record("WET 1000", 1)];
        let weights =
            weighter().compute(&records, ProductionSource::Primary, "월생산물량");
        assert!(weights.weight_for("WET 1000") > 0.01);
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_records_returns_missing() {
        let weights = weighter().compute(&[], ProductionSource::Primary, "월생산물량");
        assert!(weights.is_empty());
        assert_eq!(weights.source, ProductionSource::Missing);
        assert_eq!(weights.weight_for("DRAGON"), 0.0);
    }

    #[test]
    fn test_zero_total_returns_missing() {
        let records = vec![record("DRAGON", 0)];
        let weights =
            weighter().compute(&records, ProductionSource::Primary, "월생산물량");
        assert!(weights.is_empty());
    }
}
