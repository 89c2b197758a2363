// ==========================================
// CampaignApi 集成测试
// ==========================================
// 测试目标: 文本参数解析、文件读写、错误转换
// ==========================================


use campaign_etl::api::{ApiError, CampaignApi};
use campaign_etl::domain::types::{ImportOutcome, StoreStatus};
use campaign_etl::domain::StoreRecord;
use std::fs;
use tempfile::TempDir;
use test_helpers::*;

fn write_csv(dir: &TempDir, name: &str, header: &str, rows: &[&str]) -> String {
    let path = dir.path().join(name);
    fs::write(&path, csv_bytes(header, rows)).unwrap();
    path.to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_import_path_and_review_through_api() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = CampaignApi::open(&db_path).unwrap();
    api.register_store(StoreRecord::new("10", "Loja A")).await.unwrap();
    api.register_store(StoreRecord::new("20", "Loja C")).await.unwrap();

    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "pre.csv", "nome_loja,regional", &["Loja A,Sul"]);

    let result = api
        .import_path(&file, "pre", "Páscoa", Some("carla"))
        .await
        .unwrap();
    assert_eq!(result.record.outcome, ImportOutcome::Completed);
    assert_eq!(result.record.source_filename, "pre.csv");
    assert_eq!(result.record.actor, "carla");

    let pending = api.pending_review().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "20");

    let updated = api
        .review_store("20", "pre", "active", Some("confirmada por telefone".into()), None)
        .await
        .unwrap();
    assert_eq!(updated.status_pre, StoreStatus::Active);
    assert!(api.pending_review().await.unwrap().is_empty());

    let history = api.import_history(None).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_validation_error_carries_messages() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = CampaignApi::open(&db_path).unwrap();

    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "ruim.csv", "nome_loja,observacao", &["Loja A,x"]);

    let err = api.import_path(&file, "post", "Páscoa", None).await.unwrap_err();
    match &err {
        ApiError::ValidationError { errors, .. } => assert_eq!(errors.len(), 1),
        other => panic!("esperado ValidationError, obtido {:?}", other),
    }
    assert_eq!(err.to_payload().kind, "validation");

    // 失败同样留痕
    let history = api.import_history(None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outcome, ImportOutcome::Failed);
}

#[tokio::test]
async fn test_text_arguments_are_validated() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = CampaignApi::open(&db_path).unwrap();

    let err = api.import_path("x.csv", "meio", "Páscoa", None).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api
        .review_store("1", "pre", "talvez", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api
        .review_store("inexistente", "post", "inactive", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_store_registration_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = CampaignApi::open(&db_path).unwrap();

    api.register_store(StoreRecord::new("1", "Loja A")).await.unwrap();
    let err = api
        .register_store(StoreRecord::new("1", "Loja A bis"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    assert_eq!(api.roster().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_template_written_and_previewed() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = CampaignApi::open(&db_path).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("modelo.csv");
    let path = path.to_str().unwrap();
    api.write_template(path).unwrap();

    let preview = api.preview_path(path).await.unwrap();
    assert_eq!(preview.file_name, "modelo.csv");
    assert_eq!(preview.mapping.mapped_count(), 5);
    assert!(preview.validation.valid);
}

#[tokio::test]
async fn test_history_limit_comes_from_config() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = CampaignApi::open(&db_path).unwrap();
    api.register_store(StoreRecord::new("1", "Loja A")).await.unwrap();
    api.set_config("history_limit", "1").unwrap();

    let dir = TempDir::new().unwrap();
    let file = write_csv(&dir, "pre.csv", "nome_loja,regional", &["Loja A,Sul"]);
    api.import_path(&file, "pre", "Páscoa", None).await.unwrap();
    api.import_path(&file, "post", "Páscoa", None).await.unwrap();

    assert_eq!(api.import_history(None).await.unwrap().len(), 1);
    assert_eq!(api.import_history(Some(10)).await.unwrap().len(), 2);
}
