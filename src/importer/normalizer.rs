// ==========================================
// 工厂不良预测分析系统 - 记录规范化器
// ==========================================
// 职责: 原始行 → 规范化 DefectRecord
// 不变量: 同一输入重复规范化,输出逐字节一致 (纯函数,无随机性)
// 约定: 单行失败只计数不中断; 统计前先行排除,不是显示层隐藏
// ==========================================

use crate::config::DataSourceConfig;
use crate::domain::{
    DefectRecord, DropReason, DroppedRow, MappedDefectRow, NormalizationReport, RawDefectRow,
};
use crate::importer::field_mapper::FieldMapper;
use chrono::NaiveDate;
use uuid::Uuid;

/// 分类字段缺失时的统一桶
pub const UNCLASSIFIED: &str = "미분류";

/// 接受的发生日格式 (按顺序尝试)
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"];

// ==========================================
// RecordNormalizer - 记录规范化器
// ==========================================
pub struct RecordNormalizer {
    config: DataSourceConfig,
    mapper: FieldMapper,
}

impl RecordNormalizer {
    pub fn new(config: DataSourceConfig) -> Self {
        Self {
            config,
            mapper: FieldMapper,
        }
    }

    /// 规范化一批原始行
    ///
    /// 处理顺序 (每行):
    /// 1) 字段映射 (别名表)
    /// 2) 排除关键字过滤 (비고 / 상세불량내용)
    /// 3) 必填字段检查 (제품명 / 부품명, 缺失即丢弃)
    /// 4) 제품명 归一映射
    /// 5) 发生日强制转为 NaiveDate, 失败行单独计数
    /// 6) 分类字段缺失 → "미분류"
    pub fn normalize(&self, raw_rows: &[RawDefectRow]) -> NormalizationReport {
        let batch_id = Uuid::new_v4();
        tracing::info!("规范化开始: batch={} 输入 {} 行", batch_id, raw_rows.len());

        let mut records = Vec::new();
        let mut dropped = Vec::new();
        let mut excluded_keyword_rows = 0usize;
        let mut missing_field_rows = 0usize;
        let mut invalid_date_rows = 0usize;
        let mut empty_detail_rows = 0usize;

        for raw in raw_rows {
            let mapped = self.mapper.map_row(raw);

            match self.normalize_row(&mapped) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    match &reason {
                        DropReason::ExcludedKeyword(_) => excluded_keyword_rows += 1,
                        DropReason::MissingField(_) => missing_field_rows += 1,
                        DropReason::InvalidDate(_) => invalid_date_rows += 1,
                        DropReason::EmptyDetail => empty_detail_rows += 1,
                    }
                    tracing::debug!(
                        "行丢弃: origin={} row={} reason={}",
                        mapped.origin,
                        mapped.row_number,
                        reason
                    );
                    dropped.push(DroppedRow {
                        origin: mapped.origin.clone(),
                        row_number: mapped.row_number,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            "规范化完成: 输出 {} 行, 丢弃 {} 行 (排除 {}, 缺字段 {}, 日期无效 {}, 内容为空 {})",
            records.len(),
            dropped.len(),
            excluded_keyword_rows,
            missing_field_rows,
            invalid_date_rows,
            empty_detail_rows
        );

        NormalizationReport {
            batch_id,
            records,
            dropped,
            input_rows: raw_rows.len(),
            excluded_keyword_rows,
            missing_field_rows,
            invalid_date_rows,
            empty_detail_rows,
        }
    }

    /// 单行规范化
    fn normalize_row(&self, mapped: &MappedDefectRow) -> Result<DefectRecord, DropReason> {
        // 排除关键字: 비고 与 상세불량내용 命中即丢弃 (大小写不敏感)
        if let Some(keyword) = self.matched_exclude_keyword(mapped) {
            return Err(DropReason::ExcludedKeyword(keyword));
        }

        let product_model = mapped
            .product_model
            .clone()
            .ok_or_else(|| DropReason::MissingField("제품명".to_string()))?;
        let part_name = mapped
            .part_name
            .clone()
            .ok_or_else(|| DropReason::MissingField("부품명".to_string()))?;

        let detail_text = match &mapped.detail_text {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => return Err(DropReason::EmptyDetail),
        };

        let occurred_on = match &mapped.occurred_on_raw {
            Some(raw) => Self::parse_date(raw)
                .ok_or_else(|| DropReason::InvalidDate(raw.clone()))?,
            None => return Err(DropReason::InvalidDate(String::new())),
        };

        // 제품명 → 生产量机型名归一
        let product_model = self
            .config
            .product_name_mapping
            .get(&product_model)
            .cloned()
            .unwrap_or(product_model);

        Ok(DefectRecord {
            product_model,
            part_name,
            detail_text,
            major_category: mapped
                .major_category
                .clone()
                .unwrap_or_else(|| UNCLASSIFIED.to_string()),
            minor_category: mapped
                .minor_category
                .clone()
                .unwrap_or_else(|| UNCLASSIFIED.to_string()),
            detection_stage: mapped
                .detection_stage
                .clone()
                .unwrap_or_else(|| UNCLASSIFIED.to_string()),
            remark: mapped.remark.clone(),
            occurred_on,
            origin: mapped.origin.clone(),
        })
    }

    /// 命中的排除关键字 (若有)
    fn matched_exclude_keyword(&self, mapped: &MappedDefectRow) -> Option<String> {
        let mut haystacks = Vec::with_capacity(2);
        if let Some(remark) = &mapped.remark {
            haystacks.push(remark.to_lowercase());
        }
        if let Some(detail) = &mapped.detail_text {
            haystacks.push(detail.to_lowercase());
        }

        for keyword in &self.config.exclude_keywords {
            let needle = keyword.to_lowercase();
            if haystacks.iter().any(|h| h.contains(&needle)) {
                return Some(keyword.clone());
            }
        }
        None
    }

    /// 按支持格式依次尝试解析日期
    fn parse_date(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Some(date);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw_row(pairs: &[(&str, &str)]) -> RawDefectRow {
        let mut fields = HashMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), v.to_string());
        }
        RawDefectRow {
            origin: "가압 불량내역".to_string(),
            row_number: 2,
            fields,
        }
    }

    fn normalizer() -> RecordNormalizer {
        RecordNormalizer::new(DataSourceConfig::default())
    }

    fn valid_row() -> RawDefectRow {
        raw_row(&[
            ("제품명", "DRAGON"),
            ("부품명", "SPEED CONTROLLER"),
            ("상세불량내용", "Speed Controller Leak 발생"),
            ("대분류", "부품불량"),
            ("검출단계", "가압검사"),
            ("발생일", "2026-07-14"),
        ])
    }

    #[test]
    fn test_normalize_valid_row() {
        let report = normalizer().normalize(&[valid_row()]);
        assert_eq!(report.output_rows(), 1);
        assert_eq!(report.dropped_rows(), 0);

        let record = &report.records[0];
        assert_eq!(record.product_model, "DRAGON");
        assert_eq!(record.minor_category, UNCLASSIFIED);
        assert_eq!(
            record.occurred_on,
            NaiveDate::from_ymd_opt(2026, 7, 14).unwrap()
        );
    }

    #[test]
    fn test_exclude_keyword_in_remark() {
        let mut row = valid_row();
        row.fields
            .insert("비고".to_string(), "He미보증 부품".to_string());

        let report = normalizer().normalize(&[row]);
        assert_eq!(report.output_rows(), 0);
        assert_eq!(report.excluded_keyword_rows, 1);
    }

    #[test]
    fn test_missing_part_name_dropped_not_defaulted() {
        let mut row = valid_row();
        row.fields.remove("부품명");

        let report = normalizer().normalize(&[row]);
        assert_eq!(report.output_rows(), 0);
        assert_eq!(report.missing_field_rows, 1);
    }

    #[test]
    fn test_invalid_date_counted_separately() {
        let mut row = valid_row();
        row.fields
            .insert("발생일".to_string(), "not-a-date".to_string());

        let report = normalizer().normalize(&[valid_row(), row]);
        assert_eq!(report.output_rows(), 1);
        assert_eq!(report.invalid_date_rows, 1);
    }

    #[test]
    fn test_product_name_mapping_applied() {
        let mut row = valid_row();
        row.fields
            .insert("제품명".to_string(), "DRAGON AB DUAL".to_string());

        let report = normalizer().normalize(&[row]);
        assert_eq!(report.records[0].product_model, "DRAGON DUAL");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let rows = vec![
            valid_row(),
            raw_row(&[
                ("제품명", "GAIA-P"),
                ("부품명", "O-RING"),
                ("상세불량내용", "Ring 변형"),
                ("발생일", "2026.07.01"),
            ]),
        ];

        let first = normalizer().normalize(&rows);
        let second = normalizer().normalize(&rows);
        assert_eq!(first.records, second.records);
        assert_eq!(first.dropped, second.dropped);
    }

    #[test]
    fn test_date_format_variants() {
        for raw in ["2026-07-14", "2026.07.14", "2026/07/14", "20260714"] {
            let mut row = valid_row();
            row.fields.insert("발생일".to_string(), raw.to_string());
            let report = normalizer().normalize(&[row]);
            assert_eq!(report.output_rows(), 1, "format {raw} should parse");
        }
    }
}
