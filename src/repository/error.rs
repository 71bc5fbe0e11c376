// ==========================================
// 工厂不良预测分析系统 - 存储错误类型
// ==========================================

use thiserror::Error;

/// 存储层错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化失败: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("模型捆绑包不存在: {0}")]
    BundleNotFound(String),

    #[error("快照不存在: {0}")]
    SnapshotNotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
