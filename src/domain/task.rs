// ==========================================
// 学生选课数据导入系统 - 导入任务领域模型
// ==========================================
// 职责: 导入任务状态记录与行级错误日志
// 红线: 任务记录只由管道编排器写入,错误日志只追加不修改
// ==========================================

use crate::domain::types::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportTask - 导入任务
// ==========================================
// 用途: 单次 CSV 导入运行的持久化状态
// 对齐: import_task 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTask {
    // ===== 主键 =====
    pub task_id: String, // 任务 ID(UUID)

    // ===== 来源 =====
    pub source_file: String, // 源文件路径

    // ===== 进度状态 =====
    pub status: TaskStatus,  // 任务状态
    pub progress: i32,       // 进度百分比(0→33→66→100,单调不减)
    pub total_rows: i64,     // 总行数(清洗后口径)
    pub processed_rows: i64, // 已成功落库行数(不超过 total_rows)

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ErrorLogEntry - 行级错误日志
// ==========================================
// 语义: row_number = 0 表示任务级全局错误;
//       row_number > 0 表示清洗后序列中的 1-based 行号
//       (清洗阶段可能丢弃空行,因此不一定等于源文件行号)
// 对齐: error_log 表(随任务级联删除)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub id: i64,                   // 代理主键(自增)
    pub task_id: String,           // 所属任务(FK, 级联删除)
    pub row_number: i64,           // 0 = 全局, >0 = 行号
    pub error_message: String,     // 错误描述
    pub created_at: DateTime<Utc>, // 记录时间
}

// ==========================================
// TaskProgress - 任务进度查询结果
// ==========================================
// 用途: get_status 轮询接口返回值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    pub status: TaskStatus,
    pub progress: i32,
    pub processed_rows: i64,
    pub total_rows: i64,
}

impl From<&ImportTask> for TaskProgress {
    fn from(task: &ImportTask) -> Self {
        Self {
            status: task.status,
            progress: task.progress,
            processed_rows: task.processed_rows,
            total_rows: task.total_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_progress_from_task() {
        let now = Utc::now();
        let task = ImportTask {
            task_id: "t1".to_string(),
            source_file: "data.csv".to_string(),
            status: TaskStatus::Importing,
            progress: 66,
            total_rows: 10,
            processed_rows: 4,
            created_at: now,
            updated_at: now,
        };

        let progress = TaskProgress::from(&task);
        assert_eq!(progress.status, TaskStatus::Importing);
        assert_eq!(progress.progress, 66);
        assert_eq!(progress.processed_rows, 4);
        assert_eq!(progress.total_rows, 10);
    }
}
