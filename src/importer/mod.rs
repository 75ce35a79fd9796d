// ==========================================
// 学生选课数据导入系统 - 导入层
// ==========================================
// 职责: CSV 数据导入管道(清洗 → 校验/格式化 → 落库)
// 支持: CSV
// ==========================================

// 模块声明
pub mod data_cleanser;
pub mod date_format;
pub mod enrolment_importer_impl;
pub mod enrolment_importer_trait;
pub mod error;
pub mod file_parser;
pub mod row_formatter;

// 重导出核心类型
pub use data_cleanser::{CleanseOutcome, DataCleanser as DataCleanserImpl};
pub use date_format::{parse_date, DATE_FORMAT_CANDIDATES};
pub use enrolment_importer_impl::EnrolmentImporterImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, RawTable};
pub use row_formatter::{FormatOutcome, RowError, RowFormatter as RowFormatterImpl, REQUIRED_COLUMNS};

// 重导出 Trait 接口
pub use enrolment_importer_trait::{DataCleanser, EnrolmentImporter, FileParser, RowFormatter};
