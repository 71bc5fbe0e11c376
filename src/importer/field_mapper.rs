// ==========================================
// 工厂不良预测分析系统 - 字段映射器
// ==========================================
// 职责: 源列名 → 标准字段映射 (显式别名表,禁止按列位置取值)
// ==========================================

use crate::domain::{MappedDefectRow, RawDefectRow};
use std::collections::HashMap;

pub struct FieldMapper;

impl FieldMapper {
    /// 将原始行映射为标准字段 (全部 Option,缺失判定交给规范化器)
    pub fn map_row(&self, row: &RawDefectRow) -> MappedDefectRow {
        MappedDefectRow {
            product_model: self.get_string(&row.fields, "제품명"),
            part_name: self.get_string(&row.fields, "부품명"),
            detail_text: self.get_string(&row.fields, "상세불량내용"),
            major_category: self.get_string(&row.fields, "대분류"),
            minor_category: self.get_string(&row.fields, "중분류"),
            detection_stage: self.get_string(&row.fields, "검출단계"),
            remark: self.get_string(&row.fields, "비고"),
            occurred_on_raw: self.get_string(&row.fields, "발생일"),
            origin: row.origin.clone(),
            row_number: row.row_number,
        }
    }

    /// 提取字符串字段（返回 Option），支持多个可能的列名（别名）
    fn get_string(&self, fields: &HashMap<String, String>, key: &str) -> Option<String> {
        // 定义列名别名映射 (不同工作表列名不完全一致)
        let aliases: Vec<&str> = match key {
            "제품명" => vec!["제품명", "모델명", "모델"],
            "부품명" => vec!["부품명", "부품"],
            "상세불량내용" => vec!["상세불량내용", "불량내용", "불량 내용"],
            "검출단계" => vec!["검출단계", "검출 단계", "공정"],
            "발생일" => vec!["발생일", "발생일자", "등록일"],
            _ => vec![key],
        };

        // 尝试所有可能的列名
        for alias in aliases {
            if let Some(v) = fields.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }
}
