// ==========================================
// 学生选课数据导入系统 - 任务仓储 Trait
// ==========================================
// 职责: 定义导入任务与错误日志数据访问接口(不包含实现)
// 红线: Repository 不含业务规则,只做数据 CRUD
// ==========================================

use crate::domain::task::{ErrorLogEntry, ImportTask};
use crate::domain::types::TaskStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// TaskRepository Trait
// ==========================================
// 用途: 任务状态读写 + 错误日志追加/查询
// 实现者: SqliteRepository(rusqlite), MemoryRepository(测试)
#[async_trait]
pub trait TaskRepository: Send + Sync {
    // ===== 任务记录 =====

    /// 创建 PENDING 状态的导入任务
    ///
    /// # 参数
    /// - task_id: 任务 ID(UUID)
    /// - source_file: 源文件路径
    async fn create_task(&self, task_id: &str, source_file: &str) -> RepositoryResult<ImportTask>;

    /// 读取任务记录
    ///
    /// # 返回
    /// - Err(NotFound): 任务不存在
    async fn get_task(&self, task_id: &str) -> RepositoryResult<ImportTask>;

    /// 更新任务状态
    async fn update_status(&self, task_id: &str, status: TaskStatus) -> RepositoryResult<()>;

    /// 更新进度百分比
    async fn update_progress(&self, task_id: &str, progress: i32) -> RepositoryResult<()>;

    /// 更新总行数(清洗阶段丢弃空行后调减)
    async fn set_total_rows(&self, task_id: &str, total_rows: i64) -> RepositoryResult<()>;

    /// 更新已处理行数(导入阶段每行成功后立即持久化)
    async fn update_processed_rows(
        &self,
        task_id: &str,
        processed_rows: i64,
    ) -> RepositoryResult<()>;

    /// 删除任务(错误日志随之级联删除)
    async fn delete_task(&self, task_id: &str) -> RepositoryResult<()>;

    // ===== 错误日志(只追加)=====

    /// 追加一条错误日志
    ///
    /// # 参数
    /// - row_number: 0 = 任务级全局错误, >0 = 清洗后序列行号
    async fn insert_error(
        &self,
        task_id: &str,
        row_number: i64,
        error_message: &str,
    ) -> RepositoryResult<()>;

    /// 按行号升序列出任务的全部错误日志
    async fn list_errors(&self, task_id: &str) -> RepositoryResult<Vec<ErrorLogEntry>>;
}
