// ==========================================
// 学生选课数据导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为,避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 内置 schema 初始化(五张表,幂等)
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout(毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启(error_log/enrolment 依赖级联删除)
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema(幂等,可在已有库上重复执行)
///
/// 表结构:
/// - student / course / enrolment: 实体表,(student_id, course_id) 联合唯一
/// - import_task: 导入任务状态
/// - error_log: 行级错误日志,随任务级联删除
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS student (
            student_id        TEXT PRIMARY KEY,
            surname           TEXT NOT NULL DEFAULT '',
            first_name        TEXT NOT NULL DEFAULT '',
            birth_date        TEXT NOT NULL,
            program           TEXT NOT NULL DEFAULT '',
            registration_date TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course (
            course_id     TEXT PRIMARY KEY,
            title         TEXT NOT NULL DEFAULT '',
            start_date    TEXT NOT NULL,
            lecture_hours INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enrolment (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id     TEXT NOT NULL REFERENCES student(student_id) ON DELETE CASCADE,
            course_id      TEXT NOT NULL REFERENCES course(course_id) ON DELETE CASCADE,
            enrolment_date TEXT NOT NULL,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            UNIQUE(student_id, course_id)
        );

        CREATE TABLE IF NOT EXISTS import_task (
            task_id        TEXT PRIMARY KEY,
            source_file    TEXT NOT NULL,
            status         TEXT NOT NULL DEFAULT 'PENDING',
            progress       INTEGER NOT NULL DEFAULT 0,
            total_rows     INTEGER NOT NULL DEFAULT 0,
            processed_rows INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS error_log (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id       TEXT NOT NULL REFERENCES import_task(task_id) ON DELETE CASCADE,
            row_number    INTEGER NOT NULL,
            error_message TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_error_log_task ON error_log(task_id, row_number);
        CREATE INDEX IF NOT EXISTS idx_enrolment_student ON enrolment(student_id);
        CREATE INDEX IF NOT EXISTS idx_enrolment_course ON enrolment(course_id);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // 重复执行不应报错
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('student','course','enrolment','import_task','error_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }
}
