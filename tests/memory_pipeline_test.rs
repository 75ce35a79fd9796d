// ==========================================
// 内存仓储管道测试
// ==========================================
// 测试目标: 管道在无数据库后端上可运行(仓储可替换)
// ==========================================

mod test_helpers;

use enrolment_importer::domain::types::TaskStatus;
use enrolment_importer::importer::{EnrolmentImporter, EnrolmentImporterImpl};
use enrolment_importer::logging;
use enrolment_importer::repository::{EntityRepository, MemoryRepository};
use std::sync::Arc;
use test_helpers::{csv_row, write_csv_file, CSV_HEADER};

#[tokio::test]
async fn test_pipeline_runs_on_memory_backend() {
    logging::init_test();

    let repo = Arc::new(MemoryRepository::new());
    let importer = EnrolmentImporterImpl::with_defaults(Arc::clone(&repo));

    let csv = write_csv_file(&[
        CSV_HEADER,
        &csv_row("S001", "C001", "2000-01-15"),
        &csv_row("S002", "C001", "bad-date"),
        &csv_row("S003", "C002", "2001-03-20"),
    ]);

    let task_id = importer.submit(csv.path()).await.expect("Submit failed");
    let progress = importer.get_status(&task_id).await.unwrap();

    assert_eq!(progress.status, TaskStatus::Completed);
    assert_eq!(progress.total_rows, 3);
    assert_eq!(progress.processed_rows, 2);

    assert_eq!(repo.count_students().await.unwrap(), 2);
    assert_eq!(repo.count_courses().await.unwrap(), 2);
    assert_eq!(repo.count_enrolments().await.unwrap(), 2);

    let errors = importer.list_errors(&task_id).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row_number, 2);
}

#[tokio::test]
async fn test_memory_backend_idempotent_resubmit() {
    logging::init_test();

    let repo = Arc::new(MemoryRepository::new());
    let importer = EnrolmentImporterImpl::with_defaults(Arc::clone(&repo));

    let csv = write_csv_file(&[CSV_HEADER, &csv_row("S001", "C001", "2000-01-15")]);

    let first = importer.submit(csv.path()).await.unwrap();
    let second = importer.submit(csv.path()).await.unwrap();

    for task_id in [&first, &second] {
        let progress = importer.get_status(task_id).await.unwrap();
        assert_eq!(progress.status, TaskStatus::Completed);
    }
    assert_eq!(repo.count_students().await.unwrap(), 1);
    assert_eq!(repo.count_enrolments().await.unwrap(), 1);
}
