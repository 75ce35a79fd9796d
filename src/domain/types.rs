// ==========================================
// 学生选课数据导入系统 - 领域类型定义
// ==========================================
// 职责: 导入任务状态机与导出实体类别
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 任务状态 (Task Status)
// ==========================================
// 生命周期: PENDING → CLEANSING → FORMATTING → IMPORTING → COMPLETED | FAILED
// 红线: 状态只能由管道编排器变更,终态不可再迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,    // 已创建,等待处理
    Cleansing,  // 数据清洗中
    Formatting, // 数据校验与格式化中
    Importing,  // 数据落库中
    Completed,  // 完成(至少一行成功)
    Failed,     // 失败(全局错误或零行成功)
}

impl TaskStatus {
    /// 是否为终态(COMPLETED/FAILED)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// 数据库存储形式
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Cleansing => "CLEANSING",
            TaskStatus::Formatting => "FORMATTING",
            TaskStatus::Importing => "IMPORTING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TaskStatus::Pending),
            "CLEANSING" => Ok(TaskStatus::Cleansing),
            "FORMATTING" => Ok(TaskStatus::Formatting),
            "IMPORTING" => Ok(TaskStatus::Importing),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "FAILED" => Ok(TaskStatus::Failed),
            other => Err(format!("未知的任务状态: {}", other)),
        }
    }
}

// ==========================================
// 导出实体类别 (Entity Kind)
// ==========================================
// 用途: export 接口选择导出的实体表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Student,   // 学生
    Course,    // 课程
    Enrolment, // 选课记录(含学生/课程冗余字段)
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => write!(f, "STUDENT"),
            EntityKind::Course => write!(f, "COURSE"),
            EntityKind::Enrolment => write!(f, "ENROLMENT"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(EntityKind::Student),
            "course" => Ok(EntityKind::Course),
            "enrolment" | "enrollment" => Ok(EntityKind::Enrolment),
            other => Err(format!("未知的导出实体类别: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_roundtrip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Cleansing,
            TaskStatus::Formatting,
            TaskStatus::Importing,
            TaskStatus::Completed,
            TaskStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_task_status_terminal() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Importing.is_terminal());
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("student".parse::<EntityKind>().unwrap(), EntityKind::Student);
        assert_eq!("Course".parse::<EntityKind>().unwrap(), EntityKind::Course);
        // 兼容美式拼写
        assert_eq!(
            "enrollment".parse::<EntityKind>().unwrap(),
            EntityKind::Enrolment
        );
        assert!("lecturer".parse::<EntityKind>().is_err());
    }
}
