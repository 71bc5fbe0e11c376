// ==========================================
// 工厂不良预测分析系统 - 优先级排名引擎
// ==========================================
// 职责: 规范化记录 + 模型捆绑包 + 生产量权重 → 排名问题清单
// 公式: weighted_rate = 平均预测概率 × 生产量权重 × 观测次数
// 排序: weighted_rate 降序 → 观测次数降序 → 부품명 升序 (全序, 无随机)
// ==========================================

use crate::config::{MlConfig, RankingConfig, KOREAN_STOP_WORDS};
use crate::domain::{DefectRecord, PriorityTier, ProductionWeights, RankedIssue};
use crate::engine::classifier::ModelBundle;
use crate::engine::featurizer::tokenize;
use crate::engine::segmenter::MorphemeSegmenter;
use std::collections::{BTreeMap, HashMap, HashSet};

// ==========================================
// PriorityRanker - 排名引擎
// ==========================================
pub struct PriorityRanker {
    config: RankingConfig,
    top_keywords_count: usize,
    stop_words: HashSet<String>,
}

impl PriorityRanker {
    pub fn new(ranking: RankingConfig, ml: &MlConfig) -> Self {
        Self {
            config: ranking,
            top_keywords_count: ml.top_keywords_count,
            stop_words: KOREAN_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 生成排名问题清单
    ///
    /// 按 (제품명, 부품명) 分组; 生产量权重缺失的机型权重取 0,
    /// 此时 weighted_rate 归零,排序自然退化为观测次数序
    pub fn rank(
        &self,
        records: &[DefectRecord],
        bundle: &ModelBundle,
        weights: &ProductionWeights,
        segmenter: &dyn MorphemeSegmenter,
    ) -> Vec<RankedIssue> {
        // BTreeMap 分组保证遍历顺序确定
        let mut groups: BTreeMap<(String, String), Vec<&DefectRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry((record.product_model.clone(), record.part_name.clone()))
                .or_default()
                .push(record);
        }

        let mut issues: Vec<RankedIssue> = groups
            .into_iter()
            .map(|((product_model, part_name), members)| {
                let observed_count = members.len();
                let probability_sum: f64 = members
                    .iter()
                    .map(|r| bundle.predict_record(r, segmenter))
                    .sum();
                let predicted_probability = probability_sum / observed_count as f64;

                let production_weight = weights.weight_for(&product_model);
                let weighted_rate =
                    predicted_probability * production_weight * observed_count as f64;

                let top_keywords = self.top_keywords(&members, segmenter);
                let suggested_action = self.suggest_action(&part_name, &members);
                let priority_tier = self.tier_for(weighted_rate, observed_count);

                RankedIssue {
                    part_name,
                    product_model: Some(product_model),
                    predicted_probability,
                    observed_count,
                    production_weight,
                    weighted_rate,
                    priority_tier,
                    suggested_action,
                    top_keywords,
                }
            })
            .collect();

        issues.sort_by(|a, b| {
            b.weighted_rate
                .total_cmp(&a.weighted_rate)
                .then_with(|| b.observed_count.cmp(&a.observed_count))
                .then_with(|| a.part_name.cmp(&b.part_name))
        });

        tracing::info!("排名计算完成: {} 个问题项", issues.len());
        issues
    }

    /// 档位判定: 高频覆盖优先于比率阈值
    fn tier_for(&self, weighted_rate: f64, observed_count: usize) -> PriorityTier {
        if observed_count >= self.config.high_volume_count_threshold
            || weighted_rate >= self.config.critical_rate_threshold
        {
            PriorityTier::Critical
        } else if weighted_rate >= self.config.high_rate_threshold {
            PriorityTier::High
        } else if weighted_rate >= self.config.medium_rate_threshold {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    /// 组内高频关键词 (次数降序, 同频字典序)
    fn top_keywords(
        &self,
        members: &[&DefectRecord],
        segmenter: &dyn MorphemeSegmenter,
    ) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for record in members {
            for token in tokenize(&record.detail_text, segmenter, &self.stop_words) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(self.top_keywords_count);
        pairs.into_iter().map(|(token, _)| token).collect()
    }

    /// 建议措施: 关键词规则命中数最多者胜出,无命中取缺省建议
    fn suggest_action(&self, part_name: &str, members: &[&DefectRecord]) -> String {
        let mut haystack = part_name.to_lowercase();
        for record in members {
            haystack.push(' ');
            haystack.push_str(&record.detail_text.to_lowercase());
        }

        let mut best: Option<(&str, usize)> = None;
        for rule in &self.config.action_rules {
            let hits: usize = rule
                .keywords
                .iter()
                .map(|kw| haystack.matches(kw.to_lowercase().as_str()).count())
                .sum();
            if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
                best = Some((rule.action.as_str(), hits));
            }
        }

        best.map(|(action, _)| action.to_string())
            .unwrap_or_else(|| self.config.default_action.clone())
    }
}
