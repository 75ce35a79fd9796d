// ==========================================
// 学生选课数据导入系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv)
// 约定: 原始值不做 TRIM、空行不丢弃(清洗阶段负责并计数)
// ==========================================

use crate::importer::enrolment_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawTable - 解析产物
// ==========================================
// headers 用于校验阶段的必需列检查
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,                // 表头(已 TRIM)
    pub rows: Vec<HashMap<String, String>>,  // 行记录(列名 → 原始值)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        // 打开 CSV 文件
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行(含空白行,供清洗阶段统计)
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.to_string());
                }
            }

            rows.push(row_map);
        }

        Ok(RawTable { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = write_csv("student_id,surname\nS001,Doe\nS002,Smith\n");

        let parser = CsvParser;
        let table = parser.parse_to_raw_records(temp_file.path()).unwrap();

        assert_eq!(table.headers, vec!["student_id", "surname"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("student_id"), Some(&"S001".to_string()));
        assert_eq!(table.rows[1].get("surname"), Some(&"Smith".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let parser = CsvParser;
        let result = parser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_rejects_other_extension() {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .unwrap();
        writeln!(temp_file, "student_id,surname").unwrap();

        let parser = CsvParser;
        let result = parser.parse_to_raw_records(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_parser_keeps_blank_rows_and_raw_values() {
        // 空行与未修剪的值要原样保留,由清洗阶段处理
        let temp_file = write_csv("student_id,surname\n S001 , Doe \n,\nS002,Smith\n");

        let parser = CsvParser;
        let table = parser.parse_to_raw_records(temp_file.path()).unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].get("student_id"), Some(&" S001 ".to_string()));
        assert_eq!(table.rows[1].get("student_id"), Some(&"".to_string()));
    }
}
