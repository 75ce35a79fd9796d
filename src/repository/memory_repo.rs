// ==========================================
// 学生选课数据导入系统 - 内存仓储实现
// ==========================================
// 职责: 提供无数据库依赖的仓储实现,用于管道测试
// 说明: 批次事务控制为空操作,不提供回滚语义;
//       崩溃持久性验证请使用 SqliteRepository
// ==========================================

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
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    students: HashMap<String, Student>,
    courses: HashMap<String, Course>,
    enrolments: Vec<Enrolment>,
    tasks: HashMap<String, ImportTask>,
    errors: Vec<ErrorLogEntry>,
    next_enrolment_id: i64,
    next_error_id: i64,
}

// ==========================================
// MemoryRepository
// ==========================================
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn task_not_found(task_id: &str) -> RepositoryError {
        RepositoryError::NotFound {
            entity: "ImportTask".to_string(),
            id: task_id.to_string(),
        }
    }
}

// ==========================================
// EntityRepository 实现
// ==========================================
#[async_trait]
impl EntityRepository for MemoryRepository {
    async fn find_or_create_student(&self, defaults: NewStudent) -> RepositoryResult<Student> {
        let mut state = self.lock_state()?;

        if let Some(existing) = state.students.get(&defaults.student_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let student = Student {
            student_id: defaults.student_id.clone(),
            surname: defaults.surname,
            first_name: defaults.first_name,
            birth_date: defaults.birth_date,
            program: defaults.program,
            registration_date: defaults.registration_date,
            created_at: now,
            updated_at: now,
        };
        state
            .students
            .insert(defaults.student_id, student.clone());
        Ok(student)
    }

    async fn find_or_create_course(&self, defaults: NewCourse) -> RepositoryResult<Course> {
        let mut state = self.lock_state()?;

        if let Some(existing) = state.courses.get(&defaults.course_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let course = Course {
            course_id: defaults.course_id.clone(),
            title: defaults.title,
            start_date: defaults.start_date,
            lecture_hours: defaults.lecture_hours,
            created_at: now,
            updated_at: now,
        };
        state.courses.insert(defaults.course_id, course.clone());
        Ok(course)
    }

    async fn find_or_create_enrolment(
        &self,
        student_id: &str,
        course_id: &str,
        enrolment_date: NaiveDate,
    ) -> RepositoryResult<Enrolment> {
        let mut state = self.lock_state()?;

        if let Some(existing) = state
            .enrolments
            .iter()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
        {
            return Ok(existing.clone());
        }

        // 与 SQLite 实现对齐: 选课记录依赖实体存在
        if !state.students.contains_key(student_id) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "student {} 不存在",
                student_id
            )));
        }
        if !state.courses.contains_key(course_id) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "course {} 不存在",
                course_id
            )));
        }

        state.next_enrolment_id += 1;
        let now = Utc::now();
        let enrolment = Enrolment {
            id: state.next_enrolment_id,
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            enrolment_date,
            created_at: now,
            updated_at: now,
        };
        state.enrolments.push(enrolment.clone());
        Ok(enrolment)
    }

    // 内存实现无事务语义,三个批次控制均为空操作
    async fn begin_batch(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn commit_batch(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn rollback_batch(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        let state = self.lock_state()?;
        let mut students: Vec<Student> = state.students.values().cloned().collect();
        students.sort_by(|a, b| {
            (a.surname.as_str(), a.first_name.as_str())
                .cmp(&(b.surname.as_str(), b.first_name.as_str()))
        });
        Ok(students)
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        let state = self.lock_state()?;
        let mut courses: Vec<Course> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.course_id.cmp(&b.course_id));
        Ok(courses)
    }

    async fn list_enrolments(&self) -> RepositoryResult<Vec<EnrolmentExportRow>> {
        let state = self.lock_state()?;
        let mut enrolments = state.enrolments.clone();
        enrolments.sort_by(|a, b| (a.enrolment_date, a.id).cmp(&(b.enrolment_date, b.id)));

        let rows = enrolments
            .into_iter()
            .map(|e| {
                let student = state.students.get(&e.student_id);
                let course = state.courses.get(&e.course_id);
                EnrolmentExportRow {
                    student_id: e.student_id.clone(),
                    student_surname: student.map(|s| s.surname.clone()).unwrap_or_default(),
                    student_first_name: student
                        .map(|s| s.first_name.clone())
                        .unwrap_or_default(),
                    course_id: e.course_id.clone(),
                    course_title: course.map(|c| c.title.clone()).unwrap_or_default(),
                    enrolment_date: e.enrolment_date,
                    created_at: e.created_at,
                    updated_at: e.updated_at,
                }
            })
            .collect();
        Ok(rows)
    }

    async fn count_students(&self) -> RepositoryResult<i64> {
        Ok(self.lock_state()?.students.len() as i64)
    }

    async fn count_courses(&self) -> RepositoryResult<i64> {
        Ok(self.lock_state()?.courses.len() as i64)
    }

    async fn count_enrolments(&self) -> RepositoryResult<i64> {
        Ok(self.lock_state()?.enrolments.len() as i64)
    }
}

// ==========================================
// TaskRepository 实现
// ==========================================
#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn create_task(&self, task_id: &str, source_file: &str) -> RepositoryResult<ImportTask> {
        let mut state = self.lock_state()?;
        let now = Utc::now();
        let task = ImportTask {
            task_id: task_id.to_string(),
            source_file: source_file.to_string(),
            status: TaskStatus::Pending,
            progress: 0,
            total_rows: 0,
            processed_rows: 0,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(task_id.to_string(), task.clone());
        Ok(task)
    }

    async fn get_task(&self, task_id: &str) -> RepositoryResult<ImportTask> {
        let state = self.lock_state()?;
        state
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| Self::task_not_found(task_id))
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> RepositoryResult<()> {
        let mut state = self.lock_state()?;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Self::task_not_found(task_id))?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn update_progress(&self, task_id: &str, progress: i32) -> RepositoryResult<()> {
        let mut state = self.lock_state()?;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Self::task_not_found(task_id))?;
        task.progress = progress;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn set_total_rows(&self, task_id: &str, total_rows: i64) -> RepositoryResult<()> {
        let mut state = self.lock_state()?;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Self::task_not_found(task_id))?;
        task.total_rows = total_rows;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn update_processed_rows(
        &self,
        task_id: &str,
        processed_rows: i64,
    ) -> RepositoryResult<()> {
        let mut state = self.lock_state()?;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Self::task_not_found(task_id))?;
        task.processed_rows = processed_rows;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> RepositoryResult<()> {
        let mut state = self.lock_state()?;
        state
            .tasks
            .remove(task_id)
            .ok_or_else(|| Self::task_not_found(task_id))?;
        // 错误日志随任务级联删除
        state.errors.retain(|e| e.task_id != task_id);
        Ok(())
    }

    async fn insert_error(
        &self,
        task_id: &str,
        row_number: i64,
        error_message: &str,
    ) -> RepositoryResult<()> {
        let mut state = self.lock_state()?;
        state.next_error_id += 1;
        let entry = ErrorLogEntry {
            id: state.next_error_id,
            task_id: task_id.to_string(),
            row_number,
            error_message: error_message.to_string(),
            created_at: Utc::now(),
        };
        state.errors.push(entry);
        Ok(())
    }

    async fn list_errors(&self, task_id: &str) -> RepositoryResult<Vec<ErrorLogEntry>> {
        let state = self.lock_state()?;
        let mut errors: Vec<ErrorLogEntry> = state
            .errors
            .iter()
            .filter(|e| e.task_id == task_id)
            .cloned()
            .collect();
        errors.sort_by_key(|e| (e.row_number, e.id));
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_student(id: &str, surname: &str) -> NewStudent {
        NewStudent {
            student_id: id.to_string(),
            surname: surname.to_string(),
            first_name: "Jan".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            program: "CS".to_string(),
            registration_date: NaiveDate::from_ymd_opt(2020, 9, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_find_or_create_student_keeps_first_seen() {
        let repo = MemoryRepository::new();

        let first = repo
            .find_or_create_student(sample_student("S1", "Doe"))
            .await
            .unwrap();
        assert_eq!(first.surname, "Doe");

        // 再次写入同学号但不同姓氏,原记录保持不变
        let second = repo
            .find_or_create_student(sample_student("S1", "Smith"))
            .await
            .unwrap();
        assert_eq!(second.surname, "Doe");
        assert_eq!(repo.count_students().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_enrolment_requires_entities() {
        let repo = MemoryRepository::new();
        let date = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();

        let result = repo.find_or_create_enrolment("S1", "C1", date).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ForeignKeyViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_task_removes_errors() {
        let repo = MemoryRepository::new();
        repo.create_task("t1", "a.csv").await.unwrap();
        repo.insert_error("t1", 0, "全局错误").await.unwrap();
        repo.insert_error("t1", 3, "行错误").await.unwrap();
        assert_eq!(repo.list_errors("t1").await.unwrap().len(), 2);

        repo.delete_task("t1").await.unwrap();
        assert!(repo.list_errors("t1").await.unwrap().is_empty());
        assert!(repo.get_task("t1").await.is_err());
    }
}
