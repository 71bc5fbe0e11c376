// ==========================================
// 工厂不良预测分析系统 - 不良记录实体
// ==========================================
// 职责: 原始行 / 规范化不良记录 / 规范化报告
// 生命周期: 规范化后不可变,下游只读消费
// ==========================================

use crate::domain::types::DropReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// 原始不良行 (Raw Defect Row)
// ==========================================
// 来自工作表的未映射行: 列名 → 单元格文本
// origin 标记来源工作表,参与后续类别编码
#[derive(Debug, Clone, PartialEq)]
pub struct RawDefectRow {
    pub origin: String,
    pub row_number: usize,
    pub fields: std::collections::HashMap<String, String>,
}

// ==========================================
// 字段映射后的中间记录
// ==========================================
// 所有字段均为 Option,缺失判定交给 RecordNormalizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedDefectRow {
    pub product_model: Option<String>,
    pub part_name: Option<String>,
    pub detail_text: Option<String>,
    pub major_category: Option<String>,
    pub minor_category: Option<String>,
    pub detection_stage: Option<String>,
    pub remark: Option<String>,
    pub occurred_on_raw: Option<String>,
    pub origin: String,
    pub row_number: usize,
}

// ==========================================
// 规范化不良记录 (Defect Record)
// ==========================================
// 不变量: product_model / part_name 非空 (无法解析的行被丢弃,不做默认填充)
// 分类字段缺失统一归入 "미분류" 桶
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectRecord {
    pub product_model: String,
    pub part_name: String,
    pub detail_text: String,
    pub major_category: String,
    pub minor_category: String,
    pub detection_stage: String,
    pub remark: Option<String>,
    pub occurred_on: NaiveDate,
    pub origin: String,
}

// ==========================================
// 被丢弃行 (Dropped Row)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    pub origin: String,
    pub row_number: usize,
    pub reason: DropReason,
}

// ==========================================
// 规范化报告 (Normalization Report)
// ==========================================
// 数据质量指标: 输入/输出/各类丢弃计数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub batch_id: Uuid,
    pub records: Vec<DefectRecord>,
    pub dropped: Vec<DroppedRow>,
    pub input_rows: usize,
    pub excluded_keyword_rows: usize,
    pub missing_field_rows: usize,
    pub invalid_date_rows: usize,
    pub empty_detail_rows: usize,
}

impl NormalizationReport {
    /// 输出行数
    pub fn output_rows(&self) -> usize {
        self.records.len()
    }

    /// 丢弃总数
    pub fn dropped_rows(&self) -> usize {
        self.dropped.len()
    }
}
