// ==========================================
// 工厂不良预测分析系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含业务规则
// ==========================================

pub mod defect;
pub mod production;
pub mod ranking;
pub mod types;

// 重导出核心实体
pub use defect::{
    DefectRecord, DroppedRow, MappedDefectRow, NormalizationReport, RawDefectRow,
};
pub use production::{ProductionRecord, ProductionWeights};
pub use ranking::RankedIssue;
pub use types::{DropReason, PriorityTier, ProductionSource};
