// ==========================================
// 学生选课数据导入系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口(不包含实现)
// 流程: 解析 → 清洗 → 校验/格式化 → 落库
// ==========================================

use crate::domain::enrolment::CleansedRow;
use crate::domain::task::{ErrorLogEntry, TaskProgress};
use crate::importer::data_cleanser::CleanseOutcome;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawTable;
use crate::importer::row_formatter::FormatOutcome;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// EnrolmentImporter Trait
// ==========================================
// 用途: 导入管道主接口,供外部协作方(CLI/服务层)调用
// 实现者: EnrolmentImporterImpl
#[async_trait]
pub trait EnrolmentImporter: Send + Sync {
    /// 提交 CSV 文件并同步执行导入管道
    ///
    /// # 参数
    /// - file_path: CSV 文件路径(.csv)
    ///
    /// # 返回
    /// - Ok(String): 任务 ID(管道失败时任务状态为 FAILED,ID 仍然返回,
    ///   供调用方轮询状态与错误日志)
    /// - Err: 任务记录创建失败等基础设施错误
    ///
    /// # 导入流程(3个阶段)
    /// 1. 数据清洗(TRIM / 空串标准化 / 丢弃全空行)
    /// 2. 数据校验与格式化(必需列 / 日期多格式解析 / 行号分配)
    /// 3. 落库(事务化 find_or_create, 行级故障隔离)
    async fn submit<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<String>;

    /// 查询任务状态与进度
    async fn get_status(&self, task_id: &str) -> ImportResult<TaskProgress>;

    /// 按行号升序列出任务错误日志
    async fn list_errors(&self, task_id: &str) -> ImportResult<Vec<ErrorLogEntry>>;

    /// 依次提交多个文件
    ///
    /// # 返回
    /// - Ok(Vec<Result<String, String>>): 每个文件的任务 ID 或错误描述
    ///
    /// # 说明
    /// - 任务间共享同一数据库连接与批次事务作用域,必须串行执行;
    ///   单个文件失败不影响后续文件
    async fn batch_submit<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> ImportResult<Vec<Result<String, String>>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口(阶段 0)
// 实现者: CsvParser
// 约定: 不丢弃空行、不修剪单元格 —— 两者都归清洗阶段管
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 原始行记录
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawTable): 表头列表与行记录(HashMap<列名, 原始值>)
    /// - Err: 文件不存在、扩展名不支持、CSV 解析错误
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// DataCleanser Trait
// ==========================================
// 用途: 数据清洗接口(阶段 1)
// 实现者: DataCleanserImpl
pub trait DataCleanser: Send + Sync {
    /// 清洗原始行集合
    ///
    /// # 操作
    /// - 每个单元格 TRIM
    /// - 空串标准化为缺失值
    /// - 丢弃所有列均缺失的行并计数
    ///
    /// # 说明
    /// - 确定性操作,无行级失败
    fn cleanse(&self, rows: Vec<HashMap<String, String>>) -> CleanseOutcome;
}

// ==========================================
// RowFormatter Trait
// ==========================================
// 用途: 数据校验与格式化接口(阶段 2)
// 实现者: RowFormatterImpl
pub trait RowFormatter: Send + Sync {
    /// 校验必需列集合
    ///
    /// # 返回
    /// - Err(MissingColumns): 任一必需列缺失(任务级失败,整体不导入)
    fn check_required_columns(&self, headers: &[String]) -> Result<(), ImportError>;

    /// 逐行格式化并划分有效/无效行
    ///
    /// # 规则
    /// - 四个日期字段按候选格式顺序解析,首个成功者生效
    /// - lecture_hours 解析失败置 0,不判行无效
    /// - 任一日期无效或 student_id 为空 → 该行排除;
    ///   两项检查独立执行,同时违反产生两条错误
    /// - 行号基于清洗后序列,从 1 开始
    fn format_rows(&self, rows: &[CleansedRow]) -> FormatOutcome;
}
