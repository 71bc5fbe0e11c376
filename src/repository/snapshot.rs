// ==========================================
// 工厂不良预测分析系统 - 运行快照存储
// ==========================================
// 职责: 规范化记录 / 生产量权重 的缓存快照
// 约定: 快照只是缓存,原始工作簿/CSV 才是权威数据源;
//       快照损坏或缺失时直接重新摄取,不做修复
// ==========================================

use crate::domain::{DefectRecord, ProductionWeights};
use crate::repository::error::{StoreError, StoreResult};
use std::fs;
use std::path::PathBuf;

const RECORDS_FILE: &str = "normalized_records.json";
const WEIGHTS_FILE: &str = "production_weights.json";

// ==========================================
// SnapshotStore - 快照仓库
// ==========================================
pub struct SnapshotStore {
    cache_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(cache_dir: P) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn save_records(&self, records: &[DefectRecord]) -> StoreResult<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(RECORDS_FILE);
        fs::write(&path, serde_json::to_string(records)?)?;
        tracing::debug!("规范化记录快照已保存: {} 条", records.len());
        Ok(())
    }

    pub fn load_records(&self) -> StoreResult<Vec<DefectRecord>> {
        let path = self.cache_dir.join(RECORDS_FILE);
        if !path.exists() {
            return Err(StoreError::SnapshotNotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_weights(&self, weights: &ProductionWeights) -> StoreResult<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(WEIGHTS_FILE);
        fs::write(&path, serde_json::to_string(weights)?)?;
        Ok(())
    }

    pub fn load_weights(&self) -> StoreResult<ProductionWeights> {
        let path = self.cache_dir.join(WEIGHTS_FILE);
        if !path.exists() {
            return Err(StoreError::SnapshotNotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
