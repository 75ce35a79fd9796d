// ==========================================
// 学生选课数据导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: CSV 批量导入管道(清洗 → 校验/格式化 → 落库)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 管道阶段与编排
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施(连接初始化/PRAGMA 统一/schema)
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, TaskStatus};

// 领域实体
pub use domain::{
    Course, Enrolment, EnrolmentExportRow, ErrorLogEntry, ImportTask, Student, TaskProgress,
};

// 导入管道
pub use importer::{
    EnrolmentImporter, EnrolmentImporterImpl, ImportError, ImportResult, REQUIRED_COLUMNS,
};

// 仓储
pub use repository::{
    EntityRepository, MemoryRepository, RepositoryError, SqliteRepository, TaskRepository,
};

// API
pub use api::{ExportApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学生选课数据导入系统";
