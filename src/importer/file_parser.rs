// ==========================================
// 工厂不良预测分析系统 - 文件解析器
// ==========================================
// 职责: 工作簿指定工作表 / CSV 快照 → 原始行
// 多工作表并集: 每行带 origin 标记,按工作表配置顺序合并
// ==========================================

use crate::domain::RawDefectRow;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// 不良数据工作簿解析器
// ==========================================
pub struct DefectWorkbookParser;

impl DefectWorkbookParser {
    /// 读取指定工作表并合并为一个原始行流
    ///
    /// 单个工作表读取失败只告警跳过; 所有工作表均失败或为空时返回错误
    /// (对应数据源级致命错误)
    ///
    /// # 参数
    /// - `path`: 工作簿路径 (.xlsx/.xls)
    /// - `worksheet_names`: 参与并集的工作表名,合并顺序即配置顺序
    pub fn parse_worksheets(
        &self,
        path: &Path,
        worksheet_names: &[String],
    ) -> ImportResult<Vec<RawDefectRow>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        let mut combined = Vec::new();
        for worksheet_name in worksheet_names {
            match Self::read_worksheet(&mut workbook, worksheet_name) {
                Ok(rows) => {
                    tracing::info!("工作表 '{}' 读取完成: {} 行", worksheet_name, rows.len());
                    combined.extend(rows);
                }
                Err(e) => {
                    tracing::warn!("工作表 '{}' 读取失败,跳过: {}", worksheet_name, e);
                }
            }
        }

        if combined.is_empty() {
            return Err(ImportError::AllWorksheetsEmpty(path.display().to_string()));
        }

        Ok(combined)
    }

    /// 读取单个工作表: 首行为表头,空行跳过
    fn read_worksheet(
        workbook: &mut Xlsx<std::io::BufReader<File>>,
        worksheet_name: &str,
    ) -> ImportResult<Vec<RawDefectRow>> {
        let range = workbook
            .worksheet_range(worksheet_name)
            .map_err(|_| ImportError::WorksheetNotFound(worksheet_name.to_string()))?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError(format!("工作表无数据行: {}", worksheet_name)))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (row_idx, data_row) in rows.enumerate() {
            let mut fields = HashMap::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawDefectRow {
                origin: worksheet_name.to_string(),
                // 表头占第 1 行,数据行从第 2 行计
                row_number: row_idx + 2,
                fields,
            });
        }

        Ok(records)
    }
}

// ==========================================
// CSV 快照解析器
// ==========================================
// 工作簿不可用时的离线回退来源
pub struct CsvSnapshotParser;

impl CsvSnapshotParser {
    /// 读取 CSV 快照为原始行流
    ///
    /// origin 统一标记为文件主名 (快照不区分来源工作表)
    pub fn parse(&self, path: &Path) -> ImportResult<Vec<RawDefectRow>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let origin = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "csv".to_string());

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut fields = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawDefectRow {
                origin: origin.clone(),
                row_number: row_idx + 2,
                fields,
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_snapshot_basic() {
        let file = write_csv(&[
            "제품명,부품명,상세불량내용",
            "DRAGON,SPEED CONTROLLER,Leak 발생",
            "GAIA-P,O-RING,조립 불량",
        ]);

        let parser = CsvSnapshotParser;
        let rows = parser.parse(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields.get("제품명"), Some(&"DRAGON".to_string()));
        assert_eq!(rows[0].row_number, 2);
        assert!(!rows[0].origin.is_empty());
    }

    #[test]
    fn test_csv_snapshot_skips_blank_rows() {
        let file = write_csv(&["제품명,부품명", "DRAGON,O-RING", ",", "GAIA-P,UNION TEE"]);

        let parser = CsvSnapshotParser;
        let rows = parser.parse(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_csv_snapshot_file_not_found() {
        let parser = CsvSnapshotParser;
        let result = parser.parse(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_workbook_parser_missing_file() {
        let parser = DefectWorkbookParser;
        let result = parser.parse_worksheets(
            Path::new("non_existent.xlsx"),
            &["가압 불량내역".to_string()],
        );
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
