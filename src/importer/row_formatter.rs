// ==========================================
// 学生选课数据导入系统 - 数据校验与格式化实现
// ==========================================
// 职责: 必需列检查 / 日期多格式解析 / 行号分配 / 行级去留判定
// 红线: 行级错误只排除该行,仅缺列错误使整个任务失败
// ==========================================

use crate::domain::enrolment::{CleansedRow, FormattedRow};
use crate::importer::date_format::parse_date;
use crate::importer::enrolment_importer_trait::RowFormatter as RowFormatterTrait;
use crate::importer::error::ImportError;
use chrono::NaiveDate;

/// 必需列集合(缺失任一列 → 任务级失败)
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "student_id",
    "surname",
    "first_name",
    "birth_date",
    "program",
    "registration_date",
    "course_id",
    "title",
    "start_date",
    "lecture_hours",
    "enrolment_date",
];

// ==========================================
// RowError - 行级校验错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row_number: i64, // 清洗后序列行号(1-based)
    pub message: String,
}

// ==========================================
// FormatOutcome - 校验/格式化阶段产物
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FormatOutcome {
    pub valid: Vec<FormattedRow>, // 通过全部行级校验的行
    pub errors: Vec<RowError>,    // 被排除行的错误明细(一条规则一条记录)
}

pub struct RowFormatter;

impl RowFormatter {
    /// 解析 lecture_hours
    ///
    /// 规则: 整数优先;小数截断取整;解析失败或负值一律置 0,
    /// 不判行无效
    fn parse_lecture_hours(value: Option<&str>) -> i32 {
        let Some(raw) = value else {
            return 0;
        };

        if let Ok(hours) = raw.parse::<i64>() {
            return hours.clamp(0, i32::MAX as i64) as i32;
        }
        if let Ok(hours) = raw.parse::<f64>() {
            if hours.is_finite() && hours > 0.0 {
                return hours.trunc().min(i32::MAX as f64) as i32;
            }
        }
        0
    }

    /// 解析单个日期字段(缺失与解析失败同义)
    fn parse_date_field(row: &CleansedRow, column: &str) -> Option<NaiveDate> {
        row.get(column).and_then(parse_date)
    }
}

impl RowFormatterTrait for RowFormatter {
    fn check_required_columns(&self, headers: &[String]) -> Result<(), ImportError> {
        let mut missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .copied()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        Err(ImportError::MissingColumns(missing.join(", ")))
    }

    fn format_rows(&self, rows: &[CleansedRow]) -> FormatOutcome {
        let mut outcome = FormatOutcome::default();

        for (idx, row) in rows.iter().enumerate() {
            let row_number = (idx + 1) as i64;

            let birth_date = Self::parse_date_field(row, "birth_date");
            let registration_date = Self::parse_date_field(row, "registration_date");
            let start_date = Self::parse_date_field(row, "start_date");
            let enrolment_date = Self::parse_date_field(row, "enrolment_date");

            let student_id = row.get("student_id").unwrap_or("").to_string();
            let course_id = row.get("course_id").unwrap_or("").to_string();

            // 两项检查独立执行,同时违反产生两条错误
            let has_invalid_date = birth_date.is_none()
                || registration_date.is_none()
                || start_date.is_none()
                || enrolment_date.is_none();
            let has_empty_student_id = student_id.is_empty();

            if has_invalid_date {
                outcome.errors.push(RowError {
                    row_number,
                    message: "一个或多个日期字段格式无效".to_string(),
                });
            }
            if has_empty_student_id {
                outcome.errors.push(RowError {
                    row_number,
                    message: "student_id 为空或缺失".to_string(),
                });
            }

            // 日期错误已在上方记录,此处只负责排除
            let (
                Some(birth_date),
                Some(registration_date),
                Some(start_date),
                Some(enrolment_date),
            ) = (birth_date, registration_date, start_date, enrolment_date)
            else {
                continue;
            };
            if has_empty_student_id {
                continue;
            }

            outcome.valid.push(FormattedRow {
                row_number,
                student_id,
                surname: row.get("surname").map(str::to_string),
                first_name: row.get("first_name").map(str::to_string),
                birth_date,
                program: row.get("program").map(str::to_string),
                registration_date,
                course_id,
                title: row.get("title").map(str::to_string),
                start_date,
                lecture_hours: Self::parse_lecture_hours(row.get("lecture_hours")),
                enrolment_date,
            });
        }

        outcome
    }
}
