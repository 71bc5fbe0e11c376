// ==========================================
// 工厂不良预测分析系统 - 大屏报告
// ==========================================
// 职责: 排名结果 + 类别分布 + 综合建议 → 大屏 JSON
// 生命周期: 每次运行整体重建,不做增量更新
// ==========================================

use crate::config::{MlConfig, KOREAN_STOP_WORDS};
use crate::domain::{DefectRecord, RankedIssue};
use crate::engine::featurizer::tokenize;
use crate::engine::segmenter::MorphemeSegmenter;
use crate::repository::StoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

// ==========================================
// 类别分布
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    /// 占比 (0~100)
    pub percentage: f64,
}

// ==========================================
// 大屏数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    /// 排名前 N 的问题项
    pub predictions: Vec<RankedIssue>,
    /// 大分类分布 (次数降序)
    pub defect_analysis: Vec<CategoryShare>,
    /// 全量语料高频关键词
    pub top_keywords: Vec<String>,
    /// 综合建议 (최빈 대분류 기준)
    pub suggestion: String,
    pub generated_at: DateTime<Utc>,
    pub data_count: usize,
}

// ==========================================
// ReportBuilder - 报告生成器
// ==========================================
pub struct ReportBuilder {
    top_predictions_count: usize,
    top_keywords_count: usize,
    stop_words: HashSet<String>,
}

impl ReportBuilder {
    pub fn new(config: &MlConfig) -> Self {
        Self {
            top_predictions_count: config.top_predictions_count,
            top_keywords_count: config.top_keywords_count,
            stop_words: KOREAN_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 组装大屏数据
    pub fn build(
        &self,
        records: &[DefectRecord],
        issues: &[RankedIssue],
        segmenter: &dyn MorphemeSegmenter,
    ) -> DashboardData {
        let defect_analysis = self.category_shares(records);
        let suggestion = suggestion_for(defect_analysis.first().map(|s| s.category.as_str()));

        DashboardData {
            predictions: issues
                .iter()
                .take(self.top_predictions_count)
                .cloned()
                .collect(),
            top_keywords: self.global_keywords(records, segmenter),
            suggestion,
            defect_analysis,
            generated_at: Utc::now(),
            data_count: records.len(),
        }
    }

    /// 大分类分布 (次数降序, 同频字典序)
    fn category_shares(&self, records: &[DefectRecord]) -> Vec<CategoryShare> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *counts.entry(record.major_category.as_str()).or_insert(0) += 1;
        }

        let total = records.len().max(1) as f64;
        let mut shares: Vec<CategoryShare> = counts
            .into_iter()
            .map(|(category, count)| CategoryShare {
                category: category.to_string(),
                count,
                percentage: count as f64 / total * 100.0,
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        shares
    }

    /// 全量语料高频关键词
    fn global_keywords(
        &self,
        records: &[DefectRecord],
        segmenter: &dyn MorphemeSegmenter,
    ) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for record in records {
            for token in tokenize(&record.detail_text, segmenter, &self.stop_words) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(self.top_keywords_count);
        pairs.into_iter().map(|(token, _)| token).collect()
    }
}

/// 最빈 대분류별 종합 건의
fn suggestion_for(top_category: Option<&str>) -> String {
    match top_category {
        Some("기구작업불량") => "작업 표준서 정비 및 작업자 교육 강화가 필요합니다".to_string(),
        Some("부품불량") => "부품 수입검사 강화 및 공급사 품질 관리가 필요합니다".to_string(),
        Some("도면불량") => "설계 검증 프로세스 및 도면 리뷰 강화가 필요합니다".to_string(),
        Some(other) => format!("'{other}' 유형에 대한 원인 분석이 필요합니다"),
        None => "분석 가능한 불량 데이터가 없습니다".to_string(),
    }
}

/// 大屏 JSON 落盘 (父目录不存在时创建)
pub fn write_json<P: AsRef<Path>>(path: P, data: &DashboardData) -> StoreResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(data)?)?;
    tracing::info!("大屏数据已输出: {}", path.display());
    Ok(())
}
