// ==========================================
// 工厂不良预测分析系统 - 流水线编排器
// ==========================================
// 职责: 摄取 → 规范化 → 权重 → 训练 → 持久化 → 排名 → 报告
// 回退链: 检查通合工作簿 → CSV 快照; 生产量缺失不致命 (权重归零)
// ==========================================

use crate::config::AppConfig;
use crate::domain::{NormalizationReport, ProductionWeights, RankedIssue};
use crate::engine::classifier::{DefectClassifier, ModelBundle, TrainReport};
use crate::engine::ranker::PriorityRanker;
use crate::engine::segmenter::MorphemeSegmenter;
use crate::engine::weighter::ProductionWeighter;
use crate::importer::{
    CsvSnapshotParser, DefectWorkbookParser, ProductionLoader, RecordNormalizer,
};
use crate::report::{self, DashboardData, ReportBuilder};
use crate::repository::{ModelStore, SnapshotStore};
use anyhow::Context;
use std::path::PathBuf;

// ==========================================
// 流水线结果
// ==========================================
pub struct PipelineOutcome {
    pub normalization: NormalizationReport,
    pub weights: ProductionWeights,
    pub bundle: ModelBundle,
    pub bundle_path: PathBuf,
    pub train_report: TrainReport,
    pub issues: Vec<RankedIssue>,
    pub dashboard: DashboardData,
}

// ==========================================
// DefectPipeline - 端到端流水线
// ==========================================
pub struct DefectPipeline {
    config: AppConfig,
}

impl DefectPipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 执行一次完整分析
    ///
    /// 致命条件: 两级不良数据源均不可用 / 规范化后无记录 / 标签单一类别
    pub fn run(&self, segmenter: &dyn MorphemeSegmenter) -> anyhow::Result<PipelineOutcome> {
        // 1. 摄取: 工作簿优先,失败时回退 CSV 快照
        let raw_rows = match DefectWorkbookParser.parse_worksheets(
            &self.config.data.workbook_path,
            &self.config.data.worksheet_names,
        ) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    "工作簿 '{}' 不可用,回退 CSV 快照: {}",
                    self.config.data.workbook_path.display(),
                    e
                );
                CsvSnapshotParser
                    .parse(&self.config.data.csv_snapshot_path)
                    .context("두 단계 불량 데이터 소스 모두 사용 불가")?
            }
        };
        tracing::info!("原始行摄取完成: {} 行", raw_rows.len());

        // 2. 规范化
        let normalizer = RecordNormalizer::new(self.config.data.clone());
        let normalization = normalizer.normalize(&raw_rows);
        tracing::info!(
            "规范化完成: 批次 {} 输入 {} 行 / 通过 {} 条 / 丢弃 {} 条",
            normalization.batch_id,
            normalization.input_rows,
            normalization.output_rows(),
            normalization.dropped_rows()
        );

        // 3. 生产量权重
        let production = ProductionLoader::new(self.config.production.clone()).load();
        let weights = ProductionWeighter::new(&self.config.ml).compute(
            &production.records,
            production.source,
            &production.period,
        );

        // 4. 训练
        let classifier = DefectClassifier::new(self.config.ml.clone());
        let (bundle, train_report) = classifier.train(&normalization.records, segmenter)?;

        // 5. 持久化: 捆绑包版本化保存, 快照覆盖写
        let model_store = ModelStore::new(&self.config.storage.model_dir);
        let bundle_path = model_store.save_bundle(&bundle)?;
        let snapshots = SnapshotStore::new(&self.config.storage.cache_dir);
        snapshots.save_records(&normalization.records)?;
        snapshots.save_weights(&weights)?;

        // 6. 排名
        let ranker = PriorityRanker::new(self.config.ranking.clone(), &self.config.ml);
        let issues = ranker.rank(&normalization.records, &bundle, &weights, segmenter);

        // 7. 大屏报告
        let dashboard = ReportBuilder::new(&self.config.ml).build(
            &normalization.records,
            &issues,
            segmenter,
        );
        report::write_json(&self.config.storage.dashboard_path, &dashboard)?;

        Ok(PipelineOutcome {
            normalization,
            weights,
            bundle,
            bundle_path,
            train_report,
            issues,
            dashboard,
        })
    }
}
