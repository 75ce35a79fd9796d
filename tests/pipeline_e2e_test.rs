// ==========================================
// 导入管道端到端测试
// ==========================================
// 测试目标: 任务生命周期、失败兜底、批量提交
// ==========================================

mod test_helpers;

use enrolment_importer::api::{ApiError, ExportApi, ImportApi};
use enrolment_importer::domain::types::TaskStatus;
use enrolment_importer::logging;
use enrolment_importer::repository::SqliteRepository;
use std::sync::Arc;
use test_helpers::{create_test_db, csv_row, write_csv_file, CSV_HEADER};

fn create_apis(db_path: &str) -> (ImportApi, ExportApi) {
    let repo = Arc::new(SqliteRepository::new(db_path).expect("Failed to create repository"));
    (ImportApi::new(Arc::clone(&repo)), ExportApi::new(repo))
}

#[tokio::test]
async fn test_task_lifecycle_reaches_terminal_state() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    let csv = write_csv_file(&[
        CSV_HEADER,
        &csv_row("S001", "C001", "2000-01-15"),
        &csv_row("S002", "C002", "2001-03-20"),
    ]);

    let response = import_api.submit(csv.path()).await.expect("Submit failed");
    let progress = import_api.get_status(&response.task_id).await.unwrap();
    println!("Final progress: {:?}", progress);

    // 终态校验: 进度 100,processed 不超过 total
    assert_eq!(progress.status, TaskStatus::Completed);
    assert_eq!(progress.progress, 100);
    assert!(progress.processed_rows <= progress.total_rows);
    assert_eq!(progress.processed_rows, 2);
}

#[tokio::test]
async fn test_failed_task_remains_queryable() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    // 缺少必需列 → 任务失败
    let csv = write_csv_file(&["student_id,surname", "S001,Doe"]);

    let response = import_api.submit(csv.path()).await.expect("Submit failed");

    // 失败后状态与错误日志仍可查询
    let progress = import_api.get_status(&response.task_id).await.unwrap();
    assert_eq!(progress.status, TaskStatus::Failed);
    assert_eq!(progress.processed_rows, 0);

    let errors = import_api.list_errors(&response.task_id).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row_number, 0);
}

#[tokio::test]
async fn test_empty_file_fails_with_zero_rows() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    // 只有表头,没有数据行 → 零行成功 → FAILED
    let csv = write_csv_file(&[CSV_HEADER]);

    let response = import_api.submit(csv.path()).await.expect("Submit failed");
    let progress = import_api.get_status(&response.task_id).await.unwrap();

    assert_eq!(progress.status, TaskStatus::Failed);
    assert_eq!(progress.total_rows, 0);
    assert_eq!(progress.processed_rows, 0);
    assert_eq!(progress.progress, 100);
}

#[tokio::test]
async fn test_nonexistent_file_fails_task() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    let response = import_api
        .submit("definitely_missing.csv")
        .await
        .expect("Submit should still return a task id");

    let progress = import_api.get_status(&response.task_id).await.unwrap();
    assert_eq!(progress.status, TaskStatus::Failed);

    let errors = import_api.list_errors(&response.task_id).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row_number, 0);
    assert!(errors[0].error_message.contains("文件不存在"));
}

#[tokio::test]
async fn test_unknown_task_reports_not_found() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    let status_result = import_api.get_status("no-such-task").await;
    assert!(matches!(status_result, Err(ApiError::NotFound(_))));

    let errors_result = import_api.list_errors("no-such-task").await;
    assert!(matches!(errors_result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_batch_submit_processes_files_in_order() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    let first = write_csv_file(&[CSV_HEADER, &csv_row("S001", "C001", "2000-01-15")]);
    let second = write_csv_file(&[CSV_HEADER, &csv_row("S002", "C001", "2001-03-20")]);

    let results = import_api
        .batch_submit(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .await
        .expect("Batch submit failed");

    assert_eq!(results.len(), 2);
    for result in &results {
        let task_id = result.as_ref().expect("Each file should yield a task");
        let progress = import_api.get_status(task_id).await.unwrap();
        assert_eq!(progress.status, TaskStatus::Completed);
    }
}

#[tokio::test]
async fn test_batch_submit_rejects_empty_list() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (import_api, _) = create_apis(&db_path);

    let result = import_api
        .batch_submit(Vec::<std::path::PathBuf>::new())
        .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
