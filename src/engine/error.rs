// ==========================================
// 工厂不良预测分析系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 训练前置条件不满足时致命中止,不保存模型;
//       预测期未知类别走 "미분류" 桶降级,绝不报错
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 训练前置条件 (致命) =====
    #[error("训练集为空,无法训练")]
    EmptyTrainingSet,

    #[error("标签只有单一类别 ({0}),无法训练二分类模型")]
    SingleClassLabels(String),

    #[error("文本语料为空,无法构建词汇表")]
    EmptyCorpus,

    // ===== 捆绑包一致性 =====
    #[error("模型捆绑包不完整: {0}")]
    IncompleteBundle(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
