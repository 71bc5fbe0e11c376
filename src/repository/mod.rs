// ==========================================
// 工厂不良预测分析系统 - 存储层
// ==========================================
// 模型捆绑包 (版本化) 与运行快照 (缓存) 的文件存储
// ==========================================

pub mod error;
pub mod model_store;
pub mod snapshot;

pub use error::{StoreError, StoreResult};
pub use model_store::ModelStore;
pub use snapshot::SnapshotStore;
