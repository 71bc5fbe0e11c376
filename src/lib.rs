// ==========================================
// 工厂不良预测分析系统 - 品质决策支持
// ==========================================
// 分层结构:
//   config     - 配置定义与加载
//   domain     - 领域实体
//   importer   - 外部文件摄取与规范化
//   engine     - 特征化 / 训练 / 排名 / 流水线
//   repository - 模型捆绑包与快照存储
//   report     - 大屏 JSON 报告
// ==========================================

pub mod config;
pub mod domain;
pub mod engine;
pub mod importer;
pub mod logging;
pub mod report;
pub mod repository;

/// 应用版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用名称
pub const APP_NAME: &str = "defect-insight";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_empty() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "defect-insight");
    }
}
