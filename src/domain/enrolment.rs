// ==========================================
// 学生选课数据导入系统 - 选课领域模型
// ==========================================
// 职责: 学生/课程/选课实体与导入管道中间结构
// 红线: 实体字段以唯一键首见值为准,导入层不做覆盖更新
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Student - 学生主数据
// ==========================================
// 用途: 导入层 find_or_create 写入,导出层只读
// 对齐: student 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    // ===== 主键 =====
    pub student_id: String, // 学号(唯一键,非空)

    // ===== 基础信息 =====
    pub surname: String,    // 姓
    pub first_name: String, // 名
    pub program: String,    // 所属专业/项目

    // ===== 时间信息 =====
    pub birth_date: NaiveDate,        // 出生日期
    pub registration_date: NaiveDate, // 注册日期

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

// ==========================================
// Course - 课程主数据
// ==========================================
// 对齐: course 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    // ===== 主键 =====
    pub course_id: String, // 课程号(唯一键)

    // ===== 基础信息 =====
    pub title: String,      // 课程名称
    pub lecture_hours: i32, // 课时数(非负,解析失败置 0)

    // ===== 时间信息 =====
    pub start_date: NaiveDate, // 开课日期

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// Enrolment - 选课记录
// ==========================================
// 红线: (student_id, course_id) 联合唯一,学生与课程为多对多关系
// 对齐: enrolment 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrolment {
    pub id: i64,                     // 代理主键(自增)
    pub student_id: String,          // 关联 student(FK, 级联删除)
    pub course_id: String,           // 关联 course(FK, 级联删除)
    pub enrolment_date: NaiveDate,   // 选课日期
    pub created_at: DateTime<Utc>,   // 记录创建时间
    pub updated_at: DateTime<Utc>,   // 记录更新时间
}

// ==========================================
// NewStudent / NewCourse - find_or_create 默认值
// ==========================================
// 用途: 仓储层 find_or_create 的 defaults 参数
// 语义: 仅在唯一键不存在时写入,已存在则原记录保持不变
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_id: String,
    pub surname: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub program: String,
    pub registration_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub lecture_hours: i32,
}

// ==========================================
// EnrolmentExportRow - 选课导出行
// ==========================================
// 用途: 导出层冗余展开(学生/课程字段拉平)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolmentExportRow {
    pub student_id: String,         // 学号
    pub student_surname: String,    // 学生姓
    pub student_first_name: String, // 学生名
    pub course_id: String,          // 课程号
    pub course_title: String,       // 课程名称
    pub enrolment_date: NaiveDate,  // 选课日期
    pub created_at: DateTime<Utc>,  // 选课记录创建时间
    pub updated_at: DateTime<Utc>,  // 选课记录更新时间
}

// ==========================================
// CleansedRow - 清洗阶段产物
// ==========================================
// 用途: 导入管道中间产物(解析 → 清洗 → 此结构)
// 语义: 单元格已 TRIM,空串标准化为 None
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default)]
pub struct CleansedRow {
    pub values: HashMap<String, Option<String>>, // 列名 → 清洗后单元格
}

impl CleansedRow {
    /// 取指定列的清洗后值(列缺失与空值同义)
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).and_then(|v| v.as_deref())
    }

    /// 是否所有列均为空值
    pub fn is_all_missing(&self) -> bool {
        self.values.values().all(|v| v.is_none())
    }
}

// ==========================================
// FormattedRow - 校验/格式化阶段产物
// ==========================================
// 语义: 通过全部行级校验的行,日期字段已解析为具体值
// row_number 基于清洗后序列,从 1 开始(用于错误归属与导入阶段)
#[derive(Debug, Clone)]
pub struct FormattedRow {
    // ===== 元信息 =====
    pub row_number: i64, // 清洗后序列中的行号(1-based)

    // ===== 学生字段 =====
    pub student_id: String,           // 非空(已校验)
    pub surname: Option<String>,      // 缺失时落库为空串
    pub first_name: Option<String>,   // 缺失时落库为空串
    pub birth_date: NaiveDate,
    pub program: Option<String>,      // 缺失时落库为空串
    pub registration_date: NaiveDate,

    // ===== 课程字段 =====
    pub course_id: String,       // 仅 TRIM,不做空值校验
    pub title: Option<String>,   // 缺失时落库为空串
    pub start_date: NaiveDate,
    pub lecture_hours: i32,      // 解析失败/负值置 0

    // ===== 选课字段 =====
    pub enrolment_date: NaiveDate,
}

impl FormattedRow {
    /// 构造学生 find_or_create 默认值
    pub fn to_new_student(&self) -> NewStudent {
        NewStudent {
            student_id: self.student_id.clone(),
            surname: self.surname.clone().unwrap_or_default(),
            first_name: self.first_name.clone().unwrap_or_default(),
            birth_date: self.birth_date,
            program: self.program.clone().unwrap_or_default(),
            registration_date: self.registration_date,
        }
    }

    /// 构造课程 find_or_create 默认值
    pub fn to_new_course(&self) -> NewCourse {
        NewCourse {
            course_id: self.course_id.clone(),
            title: self.title.clone().unwrap_or_default(),
            start_date: self.start_date,
            lecture_hours: self.lecture_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleansed_row_all_missing() {
        let mut row = CleansedRow::default();
        row.values.insert("student_id".to_string(), None);
        row.values.insert("surname".to_string(), None);
        assert!(row.is_all_missing());

        row.values
            .insert("surname".to_string(), Some("Doe".to_string()));
        assert!(!row.is_all_missing());
        assert_eq!(row.get("surname"), Some("Doe"));
        assert_eq!(row.get("student_id"), None);
        assert_eq!(row.get("missing_column"), None);
    }

    #[test]
    fn test_formatted_row_defaults() {
        let row = FormattedRow {
            row_number: 1,
            student_id: "S1".to_string(),
            surname: None,
            first_name: Some("Jan".to_string()),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            program: None,
            registration_date: NaiveDate::from_ymd_opt(2020, 9, 1).unwrap(),
            course_id: "C1".to_string(),
            title: None,
            start_date: NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(),
            lecture_hours: 0,
            enrolment_date: NaiveDate::from_ymd_opt(2020, 10, 2).unwrap(),
        };

        let student = row.to_new_student();
        assert_eq!(student.surname, "");
        assert_eq!(student.first_name, "Jan");

        let course = row.to_new_course();
        assert_eq!(course.title, "");
        assert_eq!(course.lecture_hours, 0);
    }
}
