// ==========================================
// 学生选课数据导入系统 - CLI 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 用法:
//   enrolment-importer import <file.csv> [file.csv ...]
//   enrolment-importer status <task_id>
//   enrolment-importer errors <task_id>
//   enrolment-importer export <student|course|enrolment> [输出文件]
// ==========================================

use anyhow::{bail, Context, Result};
use enrolment_importer::api::{ExportApi, ImportApi};
use enrolment_importer::config::ImporterConfig;
use enrolment_importer::domain::types::EntityKind;
use enrolment_importer::logging;
use enrolment_importer::repository::SqliteRepository;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", enrolment_importer::APP_NAME);
    tracing::info!("系统版本: {}", enrolment_importer::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let config = ImporterConfig::from_env();
    config
        .ensure_parent_dir()
        .context("无法创建数据库目录")?;
    let db_path = config.database_path.to_string_lossy().to_string();
    tracing::info!("使用数据库: {}", db_path);

    let repo = Arc::new(SqliteRepository::new(&db_path).context("无法初始化数据库")?);
    let import_api = ImportApi::new(Arc::clone(&repo));
    let export_api = ExportApi::new(repo);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "import" && !rest.is_empty() => {
            if rest.len() == 1 {
                let response = import_api.submit(&rest[0]).await?;
                let progress = import_api.get_status(&response.task_id).await?;
                println!("{}", serde_json::to_string_pretty(&progress)?);
                println!("task_id: {}", response.task_id);
            } else {
                let results = import_api.batch_submit(rest.to_vec()).await?;
                for result in results {
                    match result {
                        Ok(task_id) => println!("task_id: {}", task_id),
                        Err(message) => eprintln!("{}", message),
                    }
                }
            }
        }
        Some((cmd, [task_id])) if cmd == "status" => {
            let progress = import_api.get_status(task_id).await?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        Some((cmd, [task_id])) if cmd == "errors" => {
            let errors = import_api.list_errors(task_id).await?;
            println!("{}", serde_json::to_string_pretty(&errors)?);
        }
        Some((cmd, rest)) if cmd == "export" && !rest.is_empty() => {
            let kind: EntityKind = rest[0]
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let bytes = export_api.export_csv(kind).await?;
            match rest.get(1) {
                Some(output) => {
                    std::fs::write(output, &bytes)
                        .with_context(|| format!("无法写入输出文件: {}", output))?;
                    tracing::info!(output = %output, "导出完成");
                }
                None => print!("{}", String::from_utf8_lossy(&bytes)),
            }
        }
        _ => {
            print_usage();
            bail!("参数无效");
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("用法:");
    eprintln!("  enrolment-importer import <file.csv> [file.csv ...]");
    eprintln!("  enrolment-importer status <task_id>");
    eprintln!("  enrolment-importer errors <task_id>");
    eprintln!("  enrolment-importer export <student|course|enrolment> [输出文件]");
}
