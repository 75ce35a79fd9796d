// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、CSV 测试文件生成等功能
// ==========================================

#![allow(dead_code)]

use enrolment_importer::db::{init_schema, open_sqlite_connection};
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 完整的 CSV 表头(必需列全集)
pub const CSV_HEADER: &str = "student_id,surname,first_name,birth_date,program,\
registration_date,course_id,title,start_date,lecture_hours,enrolment_date";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件(需要保持存活)
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写出带 .csv 扩展名的临时文件
pub fn write_csv_file(lines: &[&str]) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp csv");
    for line in lines {
        writeln!(temp_file, "{}", line).expect("Failed to write temp csv");
    }
    temp_file.flush().expect("Failed to flush temp csv");
    temp_file
}

/// 构造一行标准数据
///
/// # 参数
/// - student_id / course_id: 标识字段
/// - birth_date: 出生日期原始值(用于构造无效日期场景)
pub fn csv_row(student_id: &str, course_id: &str, birth_date: &str) -> String {
    format!(
        "{},Doe,Jan,{},CS,2020-09-01,{},Databases,2020-10-01,48,2020-10-02",
        student_id, birth_date, course_id
    )
}
