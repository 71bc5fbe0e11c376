// ==========================================
// 工厂不良预测分析系统 - 不良分类器
// ==========================================
// 职责: 二分类 "是否部品不良" 概率模型 (逻辑回归, 类别均衡加权)
// 约定: 训练/留出切分使用运行期变化的随机种子 (刻意的非确定性边界,
//       用于跨运行暴露不同潜在模式); 预测与排名不使用随机数
// 捆绑包: 分类器 + 标签编码器 + 词汇表必须整体持久化,
//         缺一不可 (脱离编码器的分类器无法变换新输入)
// ==========================================

use crate::config::MlConfig;
use crate::domain::DefectRecord;
use crate::engine::encoder::LabelEncoder;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::featurizer::{TextFeaturizer, Vocabulary};
use crate::engine::segmenter::MorphemeSegmenter;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 类别特征数: 제품명 / 부품명 / 검출단계 / 데이터 소스
const CATEGORICAL_FEATURES: usize = 4;

/// 特征重要度报告条数上限
const TOP_IMPORTANCE_COUNT: usize = 20;

// ==========================================
// 预测查询
// ==========================================
// 训练期未见过的组合也必须可预测 (未知桶降级)
#[derive(Debug, Clone)]
pub struct PredictQuery {
    pub product_model: String,
    pub part_name: String,
    pub detection_stage: String,
    pub detail_text: String,
}

// ==========================================
// 逻辑回归模型参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticModel {
    fn predict(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ==========================================
// 训练报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub seed: u64,
    /// (特征名, |权重|) 按重要度降序, 上限 20 条
    pub feature_importance: Vec<(String, f64)>,
}

// ==========================================
// ModelBundle - 模型捆绑包
// ==========================================
// 分类器 + 编码器 + 词汇表的单一持久化单元
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub version_key: String,
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub accuracy: f64,
    pub target_category: String,
    pub model_encoder: LabelEncoder,
    pub part_encoder: LabelEncoder,
    pub stage_encoder: LabelEncoder,
    pub origin_encoder: LabelEncoder,
    pub vocabulary: Vocabulary,
    pub model: LogisticModel,
}

impl ModelBundle {
    /// 特征向量长度 (类别特征 + 词汇表)
    pub fn feature_len(&self) -> usize {
        CATEGORICAL_FEATURES + self.vocabulary.len()
    }

    /// 捆绑包一致性校验 (加载后调用)
    ///
    /// 分类器权重维度与编码器/词汇表不匹配说明捆绑包被拆散或损坏,
    /// 这是错误条件,不做静默回退
    pub fn validate(&self) -> EngineResult<()> {
        if self.model.weights.len() != self.feature_len() {
            return Err(EngineError::IncompleteBundle(format!(
                "分类器权重维度 {} 与特征维度 {} 不一致",
                self.model.weights.len(),
                self.feature_len()
            )));
        }
        Ok(())
    }

    /// 单条查询的不良概率 ∈ [0, 1]
    ///
    /// 未知类别值进入未知桶 (记录告警后继续),绝不报错
    pub fn predict_probability(
        &self,
        query: &PredictQuery,
        segmenter: &dyn MorphemeSegmenter,
    ) -> f64 {
        let features = self.encode_features(
            &query.product_model,
            &query.part_name,
            &query.detection_stage,
            None,
            &query.detail_text,
            segmenter,
        );
        self.model.predict(&features)
    }

    /// 规范化记录的不良概率 (origin 参与编码)
    pub fn predict_record(
        &self,
        record: &DefectRecord,
        segmenter: &dyn MorphemeSegmenter,
    ) -> f64 {
        let features = self.encode_features(
            &record.product_model,
            &record.part_name,
            &record.detection_stage,
            Some(&record.origin),
            &record.detail_text,
            segmenter,
        );
        self.model.predict(&features)
    }

    /// 组装特征向量: 类别编码 (缩放到 [0,1]) + 文本 tf-idf
    fn encode_features(
        &self,
        product_model: &str,
        part_name: &str,
        detection_stage: &str,
        origin: Option<&str>,
        detail_text: &str,
        segmenter: &dyn MorphemeSegmenter,
    ) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.feature_len());
        features.push(scale_code(
            self.model_encoder.encode_or_unknown(product_model, "제품명"),
            &self.model_encoder,
        ));
        features.push(scale_code(
            self.part_encoder.encode_or_unknown(part_name, "부품명"),
            &self.part_encoder,
        ));
        features.push(scale_code(
            self.stage_encoder.encode_or_unknown(detection_stage, "검출단계"),
            &self.stage_encoder,
        ));
        // 查询无来源工作表时直接用未知桶 (不告警)
        let origin_code = match origin {
            Some(o) => self.origin_encoder.encode_or_unknown(o, "데이터_소스"),
            None => self.origin_encoder.unknown_code(),
        };
        features.push(scale_code(origin_code, &self.origin_encoder));

        features.extend(self.vocabulary.vectorize(detail_text, segmenter));
        features
    }
}

/// 类别编码缩放到 [0, 1] (未知桶取最大值)
fn scale_code(code: usize, encoder: &LabelEncoder) -> f64 {
    if encoder.num_codes() <= 1 {
        return 0.0;
    }
    code as f64 / (encoder.num_codes() - 1) as f64
}

// ==========================================
// DefectClassifier - 分类器训练引擎
// ==========================================
pub struct DefectClassifier {
    config: MlConfig,
}

impl DefectClassifier {
    pub fn new(config: MlConfig) -> Self {
        Self { config }
    }

    /// 训练模型并在留出集上评估
    ///
    /// 致命前置条件:
    /// - 记录集为空
    /// - 标签只有单一类别
    ///
    /// 随机种子: random_state 未配置时取当前时间派生 (动态),
    /// 配置后固定 (确定性模式)
    pub fn train(
        &self,
        records: &[DefectRecord],
        segmenter: &dyn MorphemeSegmenter,
    ) -> EngineResult<(ModelBundle, TrainReport)> {
        if records.is_empty() {
            return Err(EngineError::EmptyTrainingSet);
        }

        tracing::info!("模型训练开始: {} 条记录", records.len());

        // 编码器与词汇表从当期记录拟合
        let model_encoder = LabelEncoder::fit(records.iter().map(|r| r.product_model.as_str()));
        let part_encoder = LabelEncoder::fit(records.iter().map(|r| r.part_name.as_str()));
        let stage_encoder =
            LabelEncoder::fit(records.iter().map(|r| r.detection_stage.as_str()));
        let origin_encoder = LabelEncoder::fit(records.iter().map(|r| r.origin.as_str()));

        let corpus: Vec<&str> = records.iter().map(|r| r.detail_text.as_str()).collect();
        let featurizer = TextFeaturizer::new(&self.config);
        let vocabulary = featurizer.fit(&corpus, segmenter)?;

        // 目标类别: 配置值缺席时退化为最高频大分类
        let target_category = self.resolve_target_category(records);
        let labels: Vec<f64> = records
            .iter()
            .map(|r| if r.major_category == target_category { 1.0 } else { 0.0 })
            .collect();

        let positives = labels.iter().filter(|y| **y > 0.5).count();
        if positives == 0 || positives == labels.len() {
            return Err(EngineError::SingleClassLabels(target_category));
        }

        // 特征矩阵
        let bundle_proto = ModelBundle {
            version_key: String::new(),
            trained_at: Utc::now(),
            seed: 0,
            accuracy: 0.0,
            target_category: target_category.clone(),
            model_encoder,
            part_encoder,
            stage_encoder,
            origin_encoder,
            vocabulary,
            model: LogisticModel {
                weights: Vec::new(),
                bias: 0.0,
            },
        };
        let features: Vec<Vec<f64>> = records
            .iter()
            .map(|r| {
                bundle_proto.encode_features(
                    &r.product_model,
                    &r.part_name,
                    &r.detection_stage,
                    Some(&r.origin),
                    &r.detail_text,
                    segmenter,
                )
            })
            .collect();

        // 训练/留出切分
        let seed = match self.config.random_state {
            Some(seed) => seed,
            None => {
                let dynamic = (Utc::now().timestamp_millis() as u64) % 10_000;
                tracing::info!("使用动态随机种子: {}", dynamic);
                dynamic
            }
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..records.len()).collect();
        indices.shuffle(&mut rng);

        let mut test_len = ((records.len() as f64) * self.config.test_size).round() as usize;
        if test_len >= records.len() {
            test_len = records.len() - 1;
        }
        let (test_idx, train_idx) = indices.split_at(test_len);

        // 类别均衡权重
        let n_train = train_idx.len() as f64;
        let pos_train = train_idx.iter().filter(|i| labels[**i] > 0.5).count() as f64;
        let neg_train = n_train - pos_train;
        let (w_pos, w_neg) = if pos_train > 0.0 && neg_train > 0.0 {
            (n_train / (2.0 * pos_train), n_train / (2.0 * neg_train))
        } else {
            (1.0, 1.0)
        };

        // SGD 训练
        let feature_len = bundle_proto.feature_len();
        let mut model = LogisticModel {
            weights: vec![0.0; feature_len],
            bias: 0.0,
        };
        for epoch in 0..self.config.epochs {
            let lr = self.config.learning_rate / (1.0 + 0.01 * epoch as f64);
            for &i in train_idx {
                let p = model.predict(&features[i]);
                let class_weight = if labels[i] > 0.5 { w_pos } else { w_neg };
                let gradient = (p - labels[i]) * class_weight;
                for (w, x) in model.weights.iter_mut().zip(features[i].iter()) {
                    *w -= lr * (gradient * x + self.config.l2 * *w);
                }
                model.bias -= lr * gradient;
            }
        }

        // 留出集评估 (留出集为空时退化为训练集评估并告警)
        let eval_idx: &[usize] = if test_idx.is_empty() {
            tracing::warn!("留出集为空,准确率在训练集上评估");
            train_idx
        } else {
            test_idx
        };
        let correct = eval_idx
            .iter()
            .filter(|&&i| (model.predict(&features[i]) >= 0.5) == (labels[i] > 0.5))
            .count();
        let accuracy = correct as f64 / eval_idx.len() as f64;

        let trained_at = Utc::now();
        let bundle = ModelBundle {
            version_key: trained_at.format("%Y%m%d%H%M%S").to_string(),
            trained_at,
            seed,
            accuracy,
            model: model.clone(),
            ..bundle_proto
        };

        let report = TrainReport {
            accuracy,
            train_size: train_idx.len(),
            test_size: test_idx.len(),
            seed,
            feature_importance: self.feature_importance(&bundle),
        };

        tracing::info!(
            "模型训练完成: 准确率 {:.3}, 训练 {} / 留出 {}",
            accuracy,
            report.train_size,
            report.test_size
        );

        Ok((bundle, report))
    }

    /// 目标大分类: 配置类别在数据中缺席时退化为最高频类别
    fn resolve_target_category(&self, records: &[DefectRecord]) -> String {
        if records
            .iter()
            .any(|r| r.major_category == self.config.target_category)
        {
            return self.config.target_category.clone();
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *counts.entry(record.major_category.as_str()).or_insert(0) += 1;
        }
        // 同频取字典序最小,保证确定性
        let fallback = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(category, _)| category.to_string())
            .unwrap_or_else(|| self.config.target_category.clone());

        tracing::warn!(
            "目标类别 '{}' 在数据中缺席,退化为最高频类别 '{}'",
            self.config.target_category,
            fallback
        );
        fallback
    }

    /// 按 |权重| 排序的特征重要度
    fn feature_importance(&self, bundle: &ModelBundle) -> Vec<(String, f64)> {
        let mut names: Vec<String> = vec![
            "제품명".to_string(),
            "부품명".to_string(),
            "검출단계".to_string(),
            "데이터_소스".to_string(),
        ];
        names.extend(bundle.vocabulary.terms().iter().cloned());

        let mut pairs: Vec<(String, f64)> = names
            .into_iter()
            .zip(bundle.model.weights.iter().map(|w| w.abs()))
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(TOP_IMPORTANCE_COUNT);
        pairs
    }
}
