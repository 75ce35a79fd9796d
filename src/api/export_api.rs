// ==========================================
// 学生选课数据导出API
// ==========================================
// 职责: 将学生/课程/选课数据导出为 CSV 字节流
// 格式约定: 日期时间渲染为 YYYY-MM-DD HH:MM:SS,纯日期为 YYYY-MM-DD
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::EntityKind;
use crate::repository::{EntityRepository, SqliteRepository};
use chrono::{DateTime, NaiveDate, Utc};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 实体记录数统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCounts {
    pub students: i64,
    pub courses: i64,
    pub enrolments: i64,
}

/// 导出API
pub struct ExportApi {
    repo: Arc<SqliteRepository>,
}

impl ExportApi {
    /// 创建新的ExportApi实例
    ///
    /// # 参数
    /// - repo: 共享仓储(与 ImportApi 共用同一实例)
    pub fn new(repo: Arc<SqliteRepository>) -> Self {
        Self { repo }
    }

    /// 统计各实体记录数
    pub async fn entity_counts(&self) -> ApiResult<EntityCounts> {
        Ok(EntityCounts {
            students: self.repo.count_students().await?,
            courses: self.repo.count_courses().await?,
            enrolments: self.repo.count_enrolments().await?,
        })
    }

    /// 导出指定实体为 CSV 字节流
    ///
    /// # 参数
    /// - kind: 导出实体类别(选课记录会冗余展开学生/课程字段)
    ///
    /// # 返回
    /// - Ok(Vec<u8>): UTF-8 编码的 CSV 内容(含表头)
    pub async fn export_csv(&self, kind: EntityKind) -> ApiResult<Vec<u8>> {
        match kind {
            EntityKind::Student => self.export_students().await,
            EntityKind::Course => self.export_courses().await,
            EntityKind::Enrolment => self.export_enrolments().await,
        }
    }

    async fn export_students(&self) -> ApiResult<Vec<u8>> {
        let students = self.repo.list_students().await?;
        let mut writer = Writer::from_writer(Vec::new());

        write_record(
            &mut writer,
            &[
                "student_id",
                "surname",
                "first_name",
                "birth_date",
                "program",
                "registration_date",
                "created_at",
                "updated_at",
            ],
        )?;

        for student in students {
            write_record(
                &mut writer,
                &[
                    student.student_id,
                    student.surname,
                    student.first_name,
                    format_date(student.birth_date),
                    student.program,
                    format_date(student.registration_date),
                    format_datetime(student.created_at),
                    format_datetime(student.updated_at),
                ],
            )?;
        }

        finish_writer(writer)
    }

    async fn export_courses(&self) -> ApiResult<Vec<u8>> {
        let courses = self.repo.list_courses().await?;
        let mut writer = Writer::from_writer(Vec::new());

        write_record(
            &mut writer,
            &[
                "course_id",
                "title",
                "start_date",
                "lecture_hours",
                "created_at",
                "updated_at",
            ],
        )?;

        for course in courses {
            write_record(
                &mut writer,
                &[
                    course.course_id,
                    course.title,
                    format_date(course.start_date),
                    course.lecture_hours.to_string(),
                    format_datetime(course.created_at),
                    format_datetime(course.updated_at),
                ],
            )?;
        }

        finish_writer(writer)
    }

    async fn export_enrolments(&self) -> ApiResult<Vec<u8>> {
        let enrolments = self.repo.list_enrolments().await?;
        let mut writer = Writer::from_writer(Vec::new());

        write_record(
            &mut writer,
            &[
                "student_id",
                "student_surname",
                "student_first_name",
                "course_id",
                "course_title",
                "enrolment_date",
                "created_at",
                "updated_at",
            ],
        )?;

        for row in enrolments {
            write_record(
                &mut writer,
                &[
                    row.student_id,
                    row.student_surname,
                    row.student_first_name,
                    row.course_id,
                    row.course_title,
                    format_date(row.enrolment_date),
                    format_datetime(row.created_at),
                    format_datetime(row.updated_at),
                ],
            )?;
        }

        finish_writer(writer)
    }
}

/// 纯日期渲染: YYYY-MM-DD
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 日期时间渲染: YYYY-MM-DD HH:MM:SS
fn format_datetime(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn write_record<T: AsRef<[u8]>>(writer: &mut Writer<Vec<u8>>, fields: &[T]) -> ApiResult<()> {
    writer
        .write_record(fields)
        .map_err(|e| ApiError::ExportFailure(e.to_string()))
}

fn finish_writer(writer: Writer<Vec<u8>>) -> ApiResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ApiError::ExportFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2021, 4, 3).unwrap();
        assert_eq!(format_date(date), "2021-04-03");
    }

    #[test]
    fn test_format_datetime() {
        let datetime = DateTime::parse_from_rfc3339("2021-04-03T08:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_datetime(datetime), "2021-04-03 08:05:09");
    }
}
