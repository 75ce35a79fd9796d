// ==========================================
// 学生选课数据导入系统 - 实体仓储 Trait
// ==========================================
// 职责: 定义学生/课程/选课数据访问接口(不包含实现)
// 红线: Repository 不含业务规则,只做数据 CRUD
// 语义: find_or_create 仅按唯一键查找或创建,从不覆盖已有记录
// ==========================================

use crate::domain::enrolment::{
    Course, Enrolment, EnrolmentExportRow, NewCourse, NewStudent, Student,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// EntityRepository Trait
// ==========================================
// 用途: 导入阶段 upsert 与导出阶段查询
// 实现者: SqliteRepository(rusqlite), MemoryRepository(测试)
#[async_trait]
pub trait EntityRepository: Send + Sync {
    // ===== find_or_create(唯一键查找或创建)=====

    /// 按学号查找学生,不存在则以 defaults 创建
    ///
    /// # 参数
    /// - defaults: 创建时写入的字段(已存在时被忽略)
    ///
    /// # 返回
    /// - Ok(Student): 已有记录或新建记录
    async fn find_or_create_student(&self, defaults: NewStudent) -> RepositoryResult<Student>;

    /// 按课程号查找课程,不存在则以 defaults 创建
    async fn find_or_create_course(&self, defaults: NewCourse) -> RepositoryResult<Course>;

    /// 按 (student_id, course_id) 联合键查找选课记录,不存在则创建
    ///
    /// # 参数
    /// - enrolment_date: 仅在创建时写入
    async fn find_or_create_enrolment(
        &self,
        student_id: &str,
        course_id: &str,
        enrolment_date: NaiveDate,
    ) -> RepositoryResult<Enrolment>;

    // ===== 批次事务控制 =====
    // 导入阶段整批行共用一个事务;行级应用错误不回滚事务,
    // 基础设施错误回滚后整批不落库。

    /// 开启批次事务
    async fn begin_batch(&self) -> RepositoryResult<()>;

    /// 提交批次事务
    async fn commit_batch(&self) -> RepositoryResult<()>;

    /// 回滚批次事务
    async fn rollback_batch(&self) -> RepositoryResult<()>;

    // ===== 导出查询 =====

    /// 列出全部学生(按姓、名排序)
    async fn list_students(&self) -> RepositoryResult<Vec<Student>>;

    /// 列出全部课程(按课程号排序)
    async fn list_courses(&self) -> RepositoryResult<Vec<Course>>;

    /// 列出全部选课记录(学生/课程字段冗余展开,按选课日期排序)
    async fn list_enrolments(&self) -> RepositoryResult<Vec<EnrolmentExportRow>>;

    // ===== 统计 =====

    /// 统计 student 表记录数
    async fn count_students(&self) -> RepositoryResult<i64>;

    /// 统计 course 表记录数
    async fn count_courses(&self) -> RepositoryResult<i64>;

    /// 统计 enrolment 表记录数
    async fn count_enrolments(&self) -> RepositoryResult<i64>;
}
