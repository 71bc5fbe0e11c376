// ==========================================
// 工厂不良预测分析系统 - 模型捆绑包存储
// ==========================================
// 职责: ModelBundle 的版本化持久化
// 约定: 每次训练产出新版本文件,旧版本不被改写 (只增不改);
//       捆绑包是单一 JSON 文档,分类器/编码器/词汇表不可拆散
// ==========================================

use crate::engine::classifier::ModelBundle;
use crate::repository::error::{StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

const BUNDLE_PREFIX: &str = "defect_model_";

// ==========================================
// ModelStore - 捆绑包仓库
// ==========================================
pub struct ModelStore {
    model_dir: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// 保存新版本捆绑包,返回写入路径
    pub fn save_bundle(&self, bundle: &ModelBundle) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.model_dir)?;
        let path = self
            .model_dir
            .join(format!("{}{}.json", BUNDLE_PREFIX, bundle.version_key));
        let json = serde_json::to_string_pretty(bundle)?;
        fs::write(&path, json)?;
        tracing::info!("模型捆绑包已保存: {}", path.display());
        Ok(path)
    }

    /// 按路径加载捆绑包
    pub fn load_bundle<P: AsRef<Path>>(&self, path: P) -> StoreResult<ModelBundle> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::BundleNotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path)?;
        let bundle: ModelBundle = serde_json::from_str(&raw)?;
        Ok(bundle)
    }

    /// 加载最新版本捆绑包 (版本键字典序最大)
    ///
    /// 版本键是训练时刻格式化串,字典序即时间序
    pub fn load_latest(&self) -> StoreResult<ModelBundle> {
        let mut latest: Option<PathBuf> = None;
        if self.model_dir.exists() {
            for entry in fs::read_dir(&self.model_dir)? {
                let path = entry?.path();
                let name = match path.file_name().and_then(|n| n.to_str()) {
                    Some(name) => name,
                    None => continue,
                };
                if !name.starts_with(BUNDLE_PREFIX) || !name.ends_with(".json") {
                    continue;
                }
                if latest
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .map_or(true, |current| name > current)
                {
                    latest = Some(path);
                }
            }
        }

        match latest {
            Some(path) => self.load_bundle(path),
            None => Err(StoreError::BundleNotFound(
                self.model_dir.display().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MlConfig;
    use crate::domain::DefectRecord;
    use crate::engine::classifier::DefectClassifier;
    use crate::engine::segmenter::WhitespaceSegmenter;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(model: &str, detail: &str, major: &str) -> DefectRecord {
        DefectRecord {
            product_model: model.to_string(),
            part_name: "SPEED CONTROLLER".to_string(),
            detail_text: detail.to_string(),
            major_category: major.to_string(),
            minor_category: "미분류".to_string(),
            detection_stage: "가압검사".to_string(),
            remark: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            origin: "가압 불량내역".to_string(),
        }
    }

    fn sample_bundle() -> ModelBundle {
        let records: Vec<DefectRecord> = (0..5)
            .map(|i| record("DRAGON", &format!("Leak 누수 {i}"), "부품불량"))
            .chain((0..5).map(|i| record("GAIA-P", &format!("체결 불량 {i}"), "기구작업불량")))
            .collect();
        let classifier = DefectClassifier::new(MlConfig {
            random_state: Some(3),
            min_df: 1,
            ..MlConfig::default()
        });
        classifier.train(&records, &WhitespaceSegmenter).unwrap().0
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let bundle = sample_bundle();

        let path = store.save_bundle(&bundle).unwrap();
        let loaded = store.load_bundle(&path).unwrap();

        assert_eq!(loaded.version_key, bundle.version_key);
        assert_eq!(loaded.target_category, bundle.target_category);
        loaded.validate().unwrap();
    }

    #[test]
    fn test_load_latest_picks_newest_version() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());

        let mut older = sample_bundle();
        older.version_key = "20260801000000".to_string();
        let mut newer = sample_bundle();
        newer.version_key = "20260825120000".to_string();

        store.save_bundle(&older).unwrap();
        store.save_bundle(&newer).unwrap();

        let latest = store.load_latest().unwrap();
        assert_eq!(latest.version_key, "20260825120000");
    }

    #[test]
    fn test_save_does_not_mutate_previous_version() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());

        let mut first = sample_bundle();
        first.version_key = "20260801000000".to_string();
        let first_path = store.save_bundle(&first).unwrap();
        let before = std::fs::read_to_string(&first_path).unwrap();

        let mut second = sample_bundle();
        second.version_key = "20260825120000".to_string();
        store.save_bundle(&second).unwrap();

        let after = std::fs::read_to_string(&first_path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_latest_empty_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        assert!(matches!(
            store.load_latest(),
            Err(StoreError::BundleNotFound(_))
        ));
    }
}
