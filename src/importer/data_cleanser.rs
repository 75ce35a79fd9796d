// ==========================================
// 学生选课数据导入系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 丢弃全空行
// 说明: 确定性操作,无行级失败
// ==========================================

use crate::domain::enrolment::CleansedRow;
use crate::importer::enrolment_importer_trait::DataCleanser as DataCleanserTrait;
use std::collections::HashMap;

// ==========================================
// CleanseOutcome - 清洗阶段产物
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CleanseOutcome {
    pub rows: Vec<CleansedRow>, // 存活行(单元格已标准化)
    pub dropped_rows: usize,    // 被丢弃的全空行数
}

pub struct DataCleanser;

impl DataCleanser {
    /// 标准化单元格(TRIM,空串 → None)
    fn normalize_cell(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl DataCleanserTrait for DataCleanser {
    fn cleanse(&self, rows: Vec<HashMap<String, String>>) -> CleanseOutcome {
        let input_count = rows.len();
        let mut cleansed = Vec::with_capacity(input_count);

        for raw in rows {
            let values: HashMap<String, Option<String>> = raw
                .into_iter()
                .map(|(column, value)| (column, Self::normalize_cell(&value)))
                .collect();

            let row = CleansedRow { values };
            if !row.is_all_missing() {
                cleansed.push(row);
            }
        }

        let dropped_rows = input_count - cleansed.len();
        CleanseOutcome {
            rows: cleansed,
            dropped_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::enrolment_importer_trait::DataCleanser as _;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cleanse_trims_and_normalizes() {
        let cleanser = DataCleanser;
        let outcome = cleanser.cleanse(vec![row(&[
            ("student_id", "  S001  "),
            ("surname", "Doe"),
            ("program", "   "),
        ])]);

        assert_eq!(outcome.dropped_rows, 0);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].get("student_id"), Some("S001"));
        // 空白单元格标准化为缺失值
        assert_eq!(outcome.rows[0].get("program"), None);
    }

    #[test]
    fn test_cleanse_drops_all_missing_rows() {
        let cleanser = DataCleanser;
        let outcome = cleanser.cleanse(vec![
            row(&[("student_id", "S001"), ("surname", "Doe")]),
            row(&[("student_id", ""), ("surname", "   ")]),
            row(&[("student_id", ""), ("surname", "")]),
            row(&[("student_id", "S002"), ("surname", "")]),
        ]);

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.dropped_rows, 2);
        assert_eq!(outcome.rows[0].get("student_id"), Some("S001"));
        assert_eq!(outcome.rows[1].get("student_id"), Some("S002"));
    }

    #[test]
    fn test_cleanse_empty_input() {
        let cleanser = DataCleanser;
        let outcome = cleanser.cleanse(Vec::new());
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.dropped_rows, 0);
    }
}
