// ==========================================
// 学生选课数据导入系统 - SQLite 仓储实现
// ==========================================
// 职责: 实现实体与任务数据访问(使用 rusqlite)
// 红线: Repository 不含业务规则,只做数据 CRUD
// 说明: 实体仓储与任务仓储共用同一连接,
//       使导入批次事务能覆盖任务计数器的同步更新
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::enrolment::{
    Course, Enrolment, EnrolmentExportRow, NewCourse, NewStudent, Student,
};
use crate::domain::task::{ErrorLogEntry, ImportTask};
use crate::domain::types::TaskStatus;
use crate::repository::entity_repo::EntityRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::task_repo::TaskRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// ==========================================
// SqliteRepository
// ==========================================
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// 创建新的 Repository 实例并初始化 schema
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 基于内存库创建(单元测试用)
    pub fn new_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 行映射 =====

    fn map_student(row: &Row<'_>) -> rusqlite::Result<Student> {
        Ok(Student {
            student_id: row.get("student_id")?,
            surname: row.get("surname")?,
            first_name: row.get("first_name")?,
            birth_date: row.get("birth_date")?,
            program: row.get("program")?,
            registration_date: row.get("registration_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn map_course(row: &Row<'_>) -> rusqlite::Result<Course> {
        Ok(Course {
            course_id: row.get("course_id")?,
            title: row.get("title")?,
            start_date: row.get("start_date")?,
            lecture_hours: row.get("lecture_hours")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn map_enrolment(row: &Row<'_>) -> rusqlite::Result<Enrolment> {
        Ok(Enrolment {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            course_id: row.get("course_id")?,
            enrolment_date: row.get("enrolment_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn map_task(row: &Row<'_>) -> rusqlite::Result<ImportTask> {
        let status_raw: String = row.get("status")?;
        let status = TaskStatus::from_str(&status_raw).unwrap_or(TaskStatus::Failed);
        Ok(ImportTask {
            task_id: row.get("task_id")?,
            source_file: row.get("source_file")?,
            status,
            progress: row.get("progress")?,
            total_rows: row.get("total_rows")?,
            processed_rows: row.get("processed_rows")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// 校验 UPDATE 影响行数,0 行视为任务不存在
    fn ensure_task_updated(affected: usize, task_id: &str) -> RepositoryResult<()> {
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportTask".to_string(),
                id: task_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// EntityRepository 实现
// ==========================================
#[async_trait]
impl EntityRepository for SqliteRepository {
    async fn find_or_create_student(&self, defaults: NewStudent) -> RepositoryResult<Student> {
        let conn = self.lock_conn()?;

        let existing = conn
            .query_row(
                "SELECT * FROM student WHERE student_id = ?1",
                params![defaults.student_id],
                Self::map_student,
            )
            .optional()?;

        if let Some(student) = existing {
            return Ok(student);
        }

        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO student (
                student_id, surname, first_name, birth_date,
                program, registration_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                defaults.student_id,
                defaults.surname,
                defaults.first_name,
                defaults.birth_date,
                defaults.program,
                defaults.registration_date,
                now,
                now,
            ],
        )?;
        debug!(student_id = %defaults.student_id, "新建学生记录");

        Ok(Student {
            student_id: defaults.student_id,
            surname: defaults.surname,
            first_name: defaults.first_name,
            birth_date: defaults.birth_date,
            program: defaults.program,
            registration_date: defaults.registration_date,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_or_create_course(&self, defaults: NewCourse) -> RepositoryResult<Course> {
        let conn = self.lock_conn()?;

        let existing = conn
            .query_row(
                "SELECT * FROM course WHERE course_id = ?1",
                params![defaults.course_id],
                Self::map_course,
            )
            .optional()?;

        if let Some(course) = existing {
            return Ok(course);
        }

        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO course (
                course_id, title, start_date, lecture_hours, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                defaults.course_id,
                defaults.title,
                defaults.start_date,
                defaults.lecture_hours,
                now,
                now,
            ],
        )?;
        debug!(course_id = %defaults.course_id, "新建课程记录");

        Ok(Course {
            course_id: defaults.course_id,
            title: defaults.title,
            start_date: defaults.start_date,
            lecture_hours: defaults.lecture_hours,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_or_create_enrolment(
        &self,
        student_id: &str,
        course_id: &str,
        enrolment_date: NaiveDate,
    ) -> RepositoryResult<Enrolment> {
        let conn = self.lock_conn()?;

        let existing = conn
            .query_row(
                "SELECT * FROM enrolment WHERE student_id = ?1 AND course_id = ?2",
                params![student_id, course_id],
                Self::map_enrolment,
            )
            .optional()?;

        if let Some(enrolment) = existing {
            return Ok(enrolment);
        }

        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO enrolment (
                student_id, course_id, enrolment_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![student_id, course_id, enrolment_date, now, now],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Enrolment {
            id,
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            enrolment_date,
            created_at: now,
            updated_at: now,
        })
    }

    async fn begin_batch(&self) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    async fn commit_batch(&self) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    async fn rollback_batch(&self) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM student ORDER BY surname, first_name")?;
        let students = stmt
            .query_map([], Self::map_student)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM course ORDER BY course_id")?;
        let courses = stmt
            .query_map([], Self::map_course)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    async fn list_enrolments(&self) -> RepositoryResult<Vec<EnrolmentExportRow>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.student_id, s.surname AS student_surname,
                   s.first_name AS student_first_name,
                   e.course_id, c.title AS course_title,
                   e.enrolment_date, e.created_at, e.updated_at
            FROM enrolment e
            JOIN student s ON s.student_id = e.student_id
            JOIN course c ON c.course_id = e.course_id
            ORDER BY e.enrolment_date, e.id
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(EnrolmentExportRow {
                    student_id: row.get("student_id")?,
                    student_surname: row.get("student_surname")?,
                    student_first_name: row.get("student_first_name")?,
                    course_id: row.get("course_id")?,
                    course_title: row.get("course_title")?,
                    enrolment_date: row.get("enrolment_date")?,
                    created_at: row.get("created_at")?,
                    updated_at: row.get("updated_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn count_students(&self) -> RepositoryResult<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM student", [], |row| row.get(0))?;
        Ok(count)
    }

    async fn count_courses(&self) -> RepositoryResult<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM course", [], |row| row.get(0))?;
        Ok(count)
    }

    async fn count_enrolments(&self) -> RepositoryResult<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM enrolment", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ==========================================
// TaskRepository 实现
// ==========================================
#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn create_task(&self, task_id: &str, source_file: &str) -> RepositoryResult<ImportTask> {
        let conn = self.lock_conn()?;
        let now = Utc::now();

        conn.execute(
            r#"
            INSERT INTO import_task (
                task_id, source_file, status, progress,
                total_rows, processed_rows, created_at, updated_at
            ) VALUES (?1, ?2, 'PENDING', 0, 0, 0, ?3, ?4)
            "#,
            params![task_id, source_file, now, now],
        )?;

        Ok(ImportTask {
            task_id: task_id.to_string(),
            source_file: source_file.to_string(),
            status: TaskStatus::Pending,
            progress: 0,
            total_rows: 0,
            processed_rows: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_task(&self, task_id: &str) -> RepositoryResult<ImportTask> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT * FROM import_task WHERE task_id = ?1",
            params![task_id],
            Self::map_task,
        )
        .optional()?
        .ok_or_else(|| RepositoryError::NotFound {
            entity: "ImportTask".to_string(),
            id: task_id.to_string(),
        })
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE import_task SET status = ?1, updated_at = ?2 WHERE task_id = ?3",
            params![status.as_str(), Utc::now(), task_id],
        )?;
        Self::ensure_task_updated(affected, task_id)
    }

    async fn update_progress(&self, task_id: &str, progress: i32) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE import_task SET progress = ?1, updated_at = ?2 WHERE task_id = ?3",
            params![progress, Utc::now(), task_id],
        )?;
        Self::ensure_task_updated(affected, task_id)
    }

    async fn set_total_rows(&self, task_id: &str, total_rows: i64) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE import_task SET total_rows = ?1, updated_at = ?2 WHERE task_id = ?3",
            params![total_rows, Utc::now(), task_id],
        )?;
        Self::ensure_task_updated(affected, task_id)
    }

    async fn update_processed_rows(
        &self,
        task_id: &str,
        processed_rows: i64,
    ) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE import_task SET processed_rows = ?1, updated_at = ?2 WHERE task_id = ?3",
            params![processed_rows, Utc::now(), task_id],
        )?;
        Self::ensure_task_updated(affected, task_id)
    }

    async fn delete_task(&self, task_id: &str) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "DELETE FROM import_task WHERE task_id = ?1",
            params![task_id],
        )?;
        Self::ensure_task_updated(affected, task_id)
    }

    async fn insert_error(
        &self,
        task_id: &str,
        row_number: i64,
        error_message: &str,
    ) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO error_log (task_id, row_number, error_message, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![task_id, row_number, error_message, Utc::now()],
        )?;
        Ok(())
    }

    async fn list_errors(&self, task_id: &str) -> RepositoryResult<Vec<ErrorLogEntry>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM error_log WHERE task_id = ?1 ORDER BY row_number, id",
        )?;
        let errors = stmt
            .query_map(params![task_id], |row| {
                Ok(ErrorLogEntry {
                    id: row.get("id")?,
                    task_id: row.get("task_id")?,
                    row_number: row.get("row_number")?,
                    error_message: row.get("error_message")?,
                    created_at: row.get("created_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(errors)
    }
}
