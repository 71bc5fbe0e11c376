// ==========================================
// 工厂不良预测分析系统 - 命令行入口
// ==========================================
// 用法: defect-insight [配置文件路径]
// 配置缺省路径: config.json (缺失时使用内置缺省配置)
// ==========================================

use defect_insight::config::AppConfig;
use defect_insight::engine::{DefectPipeline, WhitespaceSegmenter};
use defect_insight::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==========================================");
    tracing::info!("{} v{} 启动", defect_insight::APP_NAME, defect_insight::VERSION);
    tracing::info!("==========================================");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = AppConfig::load_or_default(&config_path);
    tracing::info!("配置加载完成: {}", config_path);

    // 形态素分词器: 本机运行使用内置空白分词回退
    let segmenter = WhitespaceSegmenter;

    let pipeline = DefectPipeline::new(config);
    let outcome = pipeline.run(&segmenter)?;

    tracing::info!(
        "分析完成: 记录 {} 条 / 丢弃 {} 条 / 准确率 {:.3} / 问题项 {} 个",
        outcome.normalization.output_rows(),
        outcome.normalization.dropped_rows(),
        outcome.train_report.accuracy,
        outcome.issues.len()
    );
    tracing::info!("模型捆绑包: {}", outcome.bundle_path.display());

    for issue in outcome.issues.iter().take(5) {
        tracing::info!(
            "[{}] {} ({}): rate={:.4} count={}",
            issue.priority_tier,
            issue.part_name,
            issue.product_model.as_deref().unwrap_or("-"),
            issue.weighted_rate,
            issue.observed_count
        );
    }

    Ok(())
}
