// ==========================================
// 工厂不良预测分析系统 - 生产量加载器
// ==========================================
// 职责: 从生产量工作簿统计各机型月产量
// 两级回退: 主表 → 备用表; 两级均失败返回空集 + 告警 (不致命)
// ==========================================

use crate::config::ProductionSourceConfig;
use crate::domain::{ProductionRecord, ProductionSource};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// 加载结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ProductionLoadOutcome {
    pub records: Vec<ProductionRecord>,
    pub source: ProductionSource,
    /// 实际使用的表名 (两级均失败时为主表名)
    pub period: String,
}

// ==========================================
// ProductionLoader - 生产量加载器
// ==========================================
pub struct ProductionLoader {
    config: ProductionSourceConfig,
}

impl ProductionLoader {
    pub fn new(config: ProductionSourceConfig) -> Self {
        Self { config }
    }

    /// 加载当期生产量
    ///
    /// 主表缺失或为空时尝试备用表并告警; 两级均失败时返回空记录集
    /// (下游权重归零,属于数据质量告警而非运行失败)
    pub fn load(&self) -> ProductionLoadOutcome {
        match self.count_models_from_sheet(&self.config.sheet_name) {
            Ok(records) if !records.is_empty() => {
                return ProductionLoadOutcome {
                    records,
                    source: ProductionSource::Primary,
                    period: self.config.sheet_name.clone(),
                };
            }
            Ok(_) => {
                tracing::warn!("主生产量表 '{}' 无数据", self.config.sheet_name);
            }
            Err(e) => {
                tracing::warn!("主生产量表 '{}' 读取失败: {}", self.config.sheet_name, e);
            }
        }

        tracing::warn!(
            "回退到备用生产量表 '{}'",
            self.config.fallback_sheet_name
        );

        match self.count_models_from_sheet(&self.config.fallback_sheet_name) {
            Ok(records) if !records.is_empty() => ProductionLoadOutcome {
                records,
                source: ProductionSource::Fallback,
                period: self.config.fallback_sheet_name.clone(),
            },
            Ok(_) | Err(_) => {
                tracing::warn!(
                    "两级生产量来源均不可用,所有机型权重归零: 主='{}' 备='{}'",
                    self.config.sheet_name,
                    self.config.fallback_sheet_name
                );
                ProductionLoadOutcome {
                    records: Vec::new(),
                    source: ProductionSource::Missing,
                    period: self.config.sheet_name.clone(),
                }
            }
        }
    }

    /// 统计指定表中机型列的出现次数
    ///
    /// 每出现一次计一台; 跳过配置的表头行; 空单元格忽略
    fn count_models_from_sheet(&self, sheet_name: &str) -> ImportResult<Vec<ProductionRecord>> {
        let path: &Path = &self.config.workbook_path;
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|_| ImportError::WorksheetNotFound(sheet_name.to_string()))?;

        // BTreeMap 保证输出顺序确定
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for row in range.rows().skip(self.config.header_rows) {
            let Some(cell) = row.get(self.config.model_column) else {
                continue;
            };
            let model = cell.to_string().trim().to_string();
            if model.is_empty() {
                continue;
            }
            *counts.entry(model).or_insert(0) += 1;
        }

        let records: Vec<ProductionRecord> = counts
            .into_iter()
            .map(|(product_model, unit_count)| ProductionRecord {
                product_model,
                unit_count,
                period: sheet_name.to_string(),
            })
            .collect();

        tracing::info!(
            "生产量表 '{}' 统计完成: {} 个机型, 合计 {} 台",
            sheet_name,
            records.len(),
            records.iter().map(|r| r.unit_count).sum::<u32>()
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_with_missing_workbook_returns_empty() {
        let loader = ProductionLoader::new(ProductionSourceConfig {
            workbook_path: PathBuf::from("non_existent_production.xlsx"),
            ..ProductionSourceConfig::default()
        });

        let outcome = loader.load();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.source, ProductionSource::Missing);
    }
}
