// ==========================================
// 学生选课数据导入系统 - 运行配置
// ==========================================
// 职责: 数据库路径解析(环境变量优先,回退用户数据目录)
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 数据库路径环境变量(便于调试/测试/CI)
pub const DB_PATH_ENV: &str = "ENROLMENT_IMPORTER_DB_PATH";

/// 运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// SQLite 数据库文件路径
    pub database_path: PathBuf,
}

impl ImporterConfig {
    /// 从环境变量解析配置,缺省回退到默认路径
    pub fn from_env() -> Self {
        Self {
            database_path: PathBuf::from(default_db_path()),
        }
    }

    /// 指定数据库路径创建配置
    pub fn with_database_path(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    /// 确保数据库父目录存在
    pub fn ensure_parent_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// 解析默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录回退
pub fn default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 使用用户数据目录,拿不到时回退当前目录
    let mut path = PathBuf::from("./enrolment_importer.db");
    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir
            .join("enrolment-importer")
            .join("enrolment_importer.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_not_empty() {
        let path = default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with("enrolment_importer.db"));
    }

    #[test]
    fn test_with_database_path() {
        let config = ImporterConfig::with_database_path("/tmp/test.db");
        assert_eq!(config.database_path, PathBuf::from("/tmp/test.db"));
    }
}
