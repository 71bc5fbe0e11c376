// ==========================================
// 工厂不良预测分析系统 - 配置定义
// ==========================================
// 职责: 数据源 / 生产量 / 机器学习 / 排名配置
// 存储: JSON 文件,缺省值与字段级默认合并
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    FileNotFound(String),

    #[error("配置文件读取失败: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("配置文件解析失败: {0}")]
    ParseError(#[from] serde_json::Error),
}

// ==========================================
// 不良数据源配置
// ==========================================
// 多工作表并集: 每个工作表的行带 origin 标记后合并
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// 检查通合工作簿路径 (.xlsx)
    pub workbook_path: PathBuf,
    /// 参与并集的工作表名
    pub worksheet_names: Vec<String>,
    /// 离线快照 CSV 路径 (工作簿不可用时回退)
    pub csv_snapshot_path: PathBuf,
    /// 排除关键字: 비고/상세불량내용 命中即整行丢弃
    pub exclude_keywords: Vec<String>,
    /// 제품명 → 生产量机型名 归一映射
    pub product_name_mapping: HashMap<String, String>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        let mut mapping = HashMap::new();
        mapping.insert("DRAGON AB DUAL".to_string(), "DRAGON DUAL".to_string());
        mapping.insert("DRAGON AB".to_string(), "DRAGON".to_string());
        mapping.insert("DRAGON AB SINGLE".to_string(), "DRAGON".to_string());
        mapping.insert("DRAGON LE DUAL".to_string(), "DRAGON DUAL".to_string());

        Self {
            workbook_path: PathBuf::from("data/검사통합.xlsx"),
            worksheet_names: vec![
                "가압 불량내역".to_string(),
                "제조품질 불량내역".to_string(),
            ],
            csv_snapshot_path: PathBuf::from("data/통합본.csv"),
            exclude_keywords: vec!["He미보증".to_string()],
            product_name_mapping: mapping,
        }
    }
}

// ==========================================
// 生产量数据源配置
// ==========================================
// 两级回退: sheet_name → fallback_sheet_name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionSourceConfig {
    /// 生产量工作簿路径
    pub workbook_path: PathBuf,
    /// 主生产量表名
    pub sheet_name: String,
    /// 备用生产量表名
    pub fallback_sheet_name: String,
    /// 机型名所在列 (0 基)
    pub model_column: usize,
    /// 表头行数 (跳过)
    pub header_rows: usize,
}

impl Default for ProductionSourceConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from("data/생산물량.xlsx"),
            sheet_name: "월생산물량".to_string(),
            fallback_sheet_name: "8월생산물량".to_string(),
            model_column: 3,
            header_rows: 2,
        }
    }
}

// ==========================================
// 机器学习配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    /// 留出集比例
    pub test_size: f64,
    /// 随机种子: None = 每次运行动态生成 (刻意的非确定性边界)
    pub random_state: Option<u64>,
    /// 词汇表文档频率上限 (比例)
    pub max_df: f64,
    /// 词汇表文档频率下限 (次数)
    pub min_df: usize,
    /// 词汇表规模上限
    pub max_features: usize,
    /// 逻辑回归训练轮数
    pub epochs: usize,
    /// 学习率
    pub learning_rate: f64,
    /// L2 正则系数
    pub l2: f64,
    /// 目标大分类 (二分类正例)
    pub target_category: String,
    /// 报告中的预测条数上限
    pub top_predictions_count: usize,
    /// 报告中的关键词条数上限
    pub top_keywords_count: usize,
    /// 权重下限 (夹取后再归一化)
    pub min_weight: f64,
    /// 权重上限
    pub max_weight: f64,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: None,
            max_df: 0.85,
            min_df: 2,
            max_features: 500,
            epochs: 200,
            learning_rate: 0.1,
            l2: 1e-3,
            target_category: "부품불량".to_string(),
            top_predictions_count: 5,
            top_keywords_count: 10,
            min_weight: 0.05,
            max_weight: 0.40,
        }
    }
}

// ==========================================
// 排名配置
// ==========================================
// 档位阈值与建议措施规则均为外部配置数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingActionRule {
    /// 关键词类别名 (leak / fastening / insertion ...)
    pub category: String,
    /// 触发关键词 (小写比较)
    pub keywords: Vec<String>,
    /// 建议措施
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// CRITICAL 档 weighted_rate 阈值
    pub critical_rate_threshold: f64,
    /// HIGH 档 weighted_rate 阈值
    pub high_rate_threshold: f64,
    /// MEDIUM 档 weighted_rate 阈值
    pub medium_rate_threshold: f64,
    /// 原始次数超过此值直接 CRITICAL (高频覆盖)
    pub high_volume_count_threshold: usize,
    /// 关键词类别 → 建议措施规则
    pub action_rules: Vec<RankingActionRule>,
    /// 无规则命中时的缺省建议
    pub default_action: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            critical_rate_threshold: 0.5,
            high_rate_threshold: 0.2,
            medium_rate_threshold: 0.05,
            high_volume_count_threshold: 30,
            action_rules: vec![
                RankingActionRule {
                    category: "leak".to_string(),
                    keywords: vec![
                        "leak".to_string(),
                        "누수".to_string(),
                        "누설".to_string(),
                    ],
                    action: "누수 부위 전수 재검사 및 가압검사 조건 재검토".to_string(),
                },
                RankingActionRule {
                    category: "fastening".to_string(),
                    keywords: vec!["체결".to_string(), "토크".to_string(), "nut".to_string()],
                    action: "체결 토크 표준화 및 작업 체크리스트 보강".to_string(),
                },
                RankingActionRule {
                    category: "insertion".to_string(),
                    keywords: vec!["삽입".to_string(), "정렬".to_string()],
                    action: "삽입부 치수 정밀도 점검 및 조립 가이드 도입".to_string(),
                },
                RankingActionRule {
                    category: "missing".to_string(),
                    keywords: vec!["누락".to_string(), "부족".to_string()],
                    action: "부품 누락 방지 체크리스트 적용 및 재고 관리 강화".to_string(),
                },
            ],
            default_action: "해당 부품 공급사 품질 점검 및 공정 표준 재검토".to_string(),
        }
    }
}

// ==========================================
// 存储配置
// ==========================================
// 模型捆绑包与快照缓存目录; 均为快照,不作为权威数据源
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 模型捆绑包目录
    pub model_dir: PathBuf,
    /// 规范化记录 / 生产量权重快照目录
    pub cache_dir: PathBuf,
    /// 大屏 JSON 输出路径
    pub dashboard_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("defect-insight");
        Self {
            model_dir: base.join("models"),
            cache_dir: base.join("cache"),
            dashboard_path: base.join("dashboard.json"),
        }
    }
}

// ==========================================
// AppConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataSourceConfig,
    pub production: ProductionSourceConfig,
    pub ml: MlConfig,
    pub ranking: RankingConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    ///
    /// 文件中未出现的字段使用缺省值 (serde default)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// 加载配置,文件缺失时回退缺省配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("配置加载失败,使用缺省配置: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.ml.test_size, 0.2);
        assert_eq!(config.ml.random_state, None);
        assert_eq!(config.ml.target_category, "부품불량");
        assert_eq!(config.production.sheet_name, "월생산물량");
        assert_eq!(config.data.worksheet_names.len(), 2);
        assert!(config
            .data
            .exclude_keywords
            .contains(&"He미보증".to_string()));
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"ml": {{"random_state": 42, "test_size": 0.3}}}}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.ml.random_state, Some(42));
        assert_eq!(config.ml.test_size, 0.3);
        // 未给出的字段保持缺省
        assert_eq!(config.ml.max_df, 0.85);
        assert_eq!(config.production.fallback_sheet_name, "8월생산물량");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = AppConfig::load("definitely_missing_config.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_product_name_mapping_defaults() {
        let config = DataSourceConfig::default();
        assert_eq!(
            config.product_name_mapping.get("DRAGON AB DUAL"),
            Some(&"DRAGON DUAL".to_string())
        );
    }
}
