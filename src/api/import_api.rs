// ==========================================
// 学生选课数据导入API
// ==========================================
// 职责: 封装导入管道,供外部协作方(CLI/服务层)调用
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::task::{ErrorLogEntry, TaskProgress};
use crate::importer::{EnrolmentImporter, EnrolmentImporterImpl};
use crate::repository::SqliteRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// 任务提交响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// 任务ID(管道失败时仍然返回,供轮询状态与错误日志)
    pub task_id: String,
}

/// 错误日志条目响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLogResponse {
    /// 行号(0 = 任务级全局错误)
    pub row_number: i64,
    /// 错误描述
    pub error_message: String,
}

impl From<ErrorLogEntry> for ErrorLogResponse {
    fn from(entry: ErrorLogEntry) -> Self {
        Self {
            row_number: entry.row_number,
            error_message: entry.error_message,
        }
    }
}

/// 导入API
pub struct ImportApi {
    importer: EnrolmentImporterImpl<SqliteRepository>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - repo: 共享仓储(与 ExportApi 共用同一实例)
    pub fn new(repo: Arc<SqliteRepository>) -> Self {
        Self {
            importer: EnrolmentImporterImpl::with_defaults(repo),
        }
    }

    /// 从数据库路径创建(独立持有仓储)
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let repo = Arc::new(SqliteRepository::new(db_path)?);
        Ok(Self::new(repo))
    }

    /// 提交 CSV 文件并同步执行导入管道
    ///
    /// # 参数
    /// - file_path: CSV 文件路径
    ///
    /// # 返回
    /// - Ok(SubmitResponse): 任务ID
    /// - Err(ApiError): 任务记录创建失败等基础设施错误
    pub async fn submit<P: AsRef<Path> + Send>(&self, file_path: P) -> ApiResult<SubmitResponse> {
        let task_id = self.importer.submit(file_path).await?;
        Ok(SubmitResponse { task_id })
    }

    /// 查询任务状态与进度(轮询接口)
    pub async fn get_status(&self, task_id: &str) -> ApiResult<TaskProgress> {
        Ok(self.importer.get_status(task_id).await?)
    }

    /// 按行号升序列出任务错误日志
    pub async fn list_errors(&self, task_id: &str) -> ApiResult<Vec<ErrorLogResponse>> {
        let errors = self.importer.list_errors(task_id).await?;
        Ok(errors.into_iter().map(ErrorLogResponse::from).collect())
    }

    /// 依次提交多个文件(串行执行)
    pub async fn batch_submit<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> ApiResult<Vec<Result<String, String>>> {
        if file_paths.is_empty() {
            return Err(ApiError::InvalidInput("文件列表为空".to_string()));
        }
        Ok(self.importer.batch_submit(file_paths).await?)
    }
}
