// ==========================================
// 学生选课数据导入系统 - 导入管道实现
// ==========================================
// 职责: 编排三阶段管道,维护任务状态与错误日志
// 流程: 解析 → 清洗 → 校验/格式化 → 落库
// 红线: 行级错误不升级为任务级;阶段外逃逸的错误
//       由最外层兜底捕获(FAILED + 全局错误日志)
// ==========================================

use crate::domain::enrolment::FormattedRow;
use crate::domain::task::{ErrorLogEntry, TaskProgress};
use crate::domain::types::TaskStatus;
use crate::importer::enrolment_importer_trait::{
    DataCleanser, EnrolmentImporter, FileParser, RowFormatter,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{EntityRepository, RepositoryError, TaskRepository};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// 进度里程碑: 0 → 33 → 66 → 100,单调不减
const PROGRESS_AFTER_CLEANSING: i32 = 33;
const PROGRESS_AFTER_FORMATTING: i32 = 66;
const PROGRESS_COMPLETE: i32 = 100;

// ==========================================
// EnrolmentImporterImpl - 导入管道实现
// ==========================================
pub struct EnrolmentImporterImpl<R>
where
    R: EntityRepository + TaskRepository,
{
    // 数据访问层(实体仓储与任务仓储共用同一连接)
    repo: Arc<R>,

    // 管道组件
    file_parser: Box<dyn FileParser>,
    data_cleanser: Box<dyn DataCleanser>,
    row_formatter: Box<dyn RowFormatter>,
}

impl<R> EnrolmentImporterImpl<R>
where
    R: EntityRepository + TaskRepository,
{
    /// 创建新的导入管道实例
    ///
    /// # 参数
    /// - repo: 仓储(同时实现实体与任务访问)
    /// - file_parser: 文件解析器
    /// - data_cleanser: 数据清洗器
    /// - row_formatter: 校验/格式化器
    pub fn new(
        repo: Arc<R>,
        file_parser: Box<dyn FileParser>,
        data_cleanser: Box<dyn DataCleanser>,
        row_formatter: Box<dyn RowFormatter>,
    ) -> Self {
        Self {
            repo,
            file_parser,
            data_cleanser,
            row_formatter,
        }
    }

    /// 以默认组件(CSV 解析器 + 标准清洗/格式化)创建
    pub fn with_defaults(repo: Arc<R>) -> Self {
        Self::new(
            repo,
            Box::new(crate::importer::file_parser::CsvParser),
            Box::new(crate::importer::data_cleanser::DataCleanser),
            Box::new(crate::importer::row_formatter::RowFormatter),
        )
    }
}

#[async_trait::async_trait]
impl<R> EnrolmentImporter for EnrolmentImporterImpl<R>
where
    R: EntityRepository + TaskRepository,
{
    #[instrument(skip(self, file_path), fields(task_id))]
    async fn submit<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<String> {
        let path = file_path.as_ref();
        let task_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("task_id", task_id.as_str());

        info!(file_path = %path.display(), "创建导入任务");
        self.repo
            .create_task(&task_id, &path.display().to_string())
            .await?;

        // 兜底捕获: 任何阶段逃逸的错误 → FAILED + 全局错误日志
        if let Err(e) = self.run_pipeline(&task_id, path).await {
            error!(error = %e, "导入管道失败");
            self.mark_failed(&task_id, &e).await;
        }

        Ok(task_id)
    }

    async fn get_status(&self, task_id: &str) -> ImportResult<TaskProgress> {
        let task = self
            .repo
            .get_task(task_id)
            .await
            .map_err(|e| Self::map_not_found(e, task_id))?;
        Ok(TaskProgress::from(&task))
    }

    async fn list_errors(&self, task_id: &str) -> ImportResult<Vec<ErrorLogEntry>> {
        // 先确认任务存在,避免把未知任务当作"无错误"
        self.repo
            .get_task(task_id)
            .await
            .map_err(|e| Self::map_not_found(e, task_id))?;
        Ok(TaskRepository::list_errors(self.repo.as_ref(), task_id).await?)
    }

    async fn batch_submit<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> ImportResult<Vec<Result<String, String>>> {
        info!(count = file_paths.len(), "开始批量提交导入文件");

        // 任务间共享同一连接与批次事务作用域,串行执行
        let mut results = Vec::with_capacity(file_paths.len());
        for path in file_paths {
            let path_str = path.as_ref().display().to_string();
            match self.submit(path).await {
                Ok(task_id) => results.push(Ok(task_id)),
                Err(e) => {
                    error!(file = %path_str, error = %e, "文件提交失败");
                    results.push(Err(format!("文件 {} 提交失败: {}", path_str, e)));
                }
            }
        }

        info!(
            total = results.len(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量提交完成"
        );
        Ok(results)
    }
}

// 管道阶段
impl<R> EnrolmentImporterImpl<R>
where
    R: EntityRepository + TaskRepository,
{
    /// 驱动三阶段管道,阶段边界处持久化状态与进度
    async fn run_pipeline(&self, task_id: &str, path: &Path) -> ImportResult<()> {
        // === 步骤 0: 解析文件 ===
        debug!("步骤 0: 解析文件");
        let table = self.file_parser.parse_to_raw_records(path)?;
        let total_rows = table.rows.len();
        self.repo.set_total_rows(task_id, total_rows as i64).await?;
        self.repo
            .update_status(task_id, TaskStatus::Cleansing)
            .await?;
        info!(total_rows = total_rows, "文件解析完成");

        // === 步骤 1: 数据清洗 ===
        debug!("步骤 1: 数据清洗");
        let cleansed = self.data_cleanser.cleanse(table.rows);
        if cleansed.dropped_rows > 0 {
            // 全空行被丢弃: 记一条全局日志并调减总行数
            self.repo
                .insert_error(
                    task_id,
                    0,
                    &format!("清洗阶段移除了 {} 个完全空白行", cleansed.dropped_rows),
                )
                .await?;
            self.repo
                .set_total_rows(task_id, cleansed.rows.len() as i64)
                .await?;
        }
        self.repo
            .update_progress(task_id, PROGRESS_AFTER_CLEANSING)
            .await?;
        self.repo
            .update_status(task_id, TaskStatus::Formatting)
            .await?;
        info!(
            surviving = cleansed.rows.len(),
            dropped = cleansed.dropped_rows,
            "数据清洗完成"
        );

        // === 步骤 2: 数据校验与格式化 ===
        debug!("步骤 2: 数据校验与格式化");
        self.row_formatter.check_required_columns(&table.headers)?;

        let formatted = self.row_formatter.format_rows(&cleansed.rows);
        for row_error in &formatted.errors {
            warn!(
                row_number = row_error.row_number,
                message = %row_error.message,
                "行校验失败"
            );
            self.repo
                .insert_error(task_id, row_error.row_number, &row_error.message)
                .await?;
        }
        self.repo
            .update_progress(task_id, PROGRESS_AFTER_FORMATTING)
            .await?;
        self.repo
            .update_status(task_id, TaskStatus::Importing)
            .await?;
        info!(
            valid = formatted.valid.len(),
            rejected = formatted.errors.len(),
            "数据校验完成"
        );

        // === 步骤 3: 落库 ===
        debug!("步骤 3: 落库");
        let processed = self.run_import_stage(task_id, &formatted.valid).await?;

        // === 完成判定 ===
        self.repo
            .update_progress(task_id, PROGRESS_COMPLETE)
            .await?;
        let final_status = if processed > 0 {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        self.repo.update_status(task_id, final_status).await?;
        info!(processed = processed, status = %final_status, "导入任务结束");

        Ok(())
    }

    /// 导入阶段: 整批行共用一个事务,行级故障隔离
    ///
    /// - 行级应用错误(如约束违反): 记日志后继续下一行,不回滚事务
    /// - 基础设施错误(事务控制/任务计数器写入失败): 回滚后整批不落库
    async fn run_import_stage(
        &self,
        task_id: &str,
        rows: &[FormattedRow],
    ) -> ImportResult<i64> {
        self.repo.begin_batch().await?;

        let result = self.import_rows(task_id, rows).await;
        match result {
            Ok(processed) => {
                self.repo.commit_batch().await?;
                Ok(processed)
            }
            Err(e) => {
                // 回滚失败只记日志,原始错误优先上抛
                if let Err(rollback_err) = self.repo.rollback_batch().await {
                    error!(error = %rollback_err, "批次事务回滚失败");
                }
                Err(e)
            }
        }
    }

    async fn import_rows(&self, task_id: &str, rows: &[FormattedRow]) -> ImportResult<i64> {
        let mut processed: i64 = 0;

        for row in rows {
            match self.import_row(row).await {
                Ok(()) => {
                    processed += 1;
                    // 每行成功后立即持久化计数(与行数据同一事务)
                    self.repo.update_processed_rows(task_id, processed).await?;
                }
                Err(e) => {
                    warn!(row_number = row.row_number, error = %e, "行导入失败");
                    self.repo
                        .insert_error(task_id, row.row_number, &format!("导入失败: {}", e))
                        .await?;
                }
            }
        }

        Ok(processed)
    }

    /// 单行导入: 学生/课程/选课三次 find_or_create
    ///
    /// 已存在的实体保持原字段不变(首见值生效)
    async fn import_row(&self, row: &FormattedRow) -> Result<(), RepositoryError> {
        let student = self
            .repo
            .find_or_create_student(row.to_new_student())
            .await?;
        let course = self.repo.find_or_create_course(row.to_new_course()).await?;
        self.repo
            .find_or_create_enrolment(&student.student_id, &course.course_id, row.enrolment_date)
            .await?;
        Ok(())
    }

    /// 兜底失败处理: 状态置 FAILED 并追加全局错误日志
    ///
    /// 此处的二次失败无法再上抛,只能记录日志
    async fn mark_failed(&self, task_id: &str, cause: &ImportError) {
        if let Err(e) = self.repo.update_status(task_id, TaskStatus::Failed).await {
            error!(error = %e, "任务状态更新失败");
        }
        if let Err(e) = self
            .repo
            .insert_error(task_id, 0, &format!("导入任务处理失败: {}", cause))
            .await
        {
            error!(error = %e, "全局错误日志写入失败");
        }
    }

    fn map_not_found(err: RepositoryError, task_id: &str) -> ImportError {
        match err {
            RepositoryError::NotFound { .. } => ImportError::TaskNotFound(task_id.to_string()),
            other => ImportError::Repository(other),
        }
    }
}
