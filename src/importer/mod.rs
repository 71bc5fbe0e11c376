// ==========================================
// 工厂不良预测分析系统 - 导入层
// ==========================================
// 职责: 外部文件数据 → 规范化领域记录
// 约定: 数据源级失败致命,行级失败计数后继续
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod normalizer;
pub mod production_loader;

pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvSnapshotParser, DefectWorkbookParser};
pub use normalizer::{RecordNormalizer, UNCLASSIFIED};
pub use production_loader::{ProductionLoadOutcome, ProductionLoader};
