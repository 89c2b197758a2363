// ==========================================
// 工作表解析测试
// ==========================================
// 测试目标: ExcelParser 读取首个工作表、表头修剪、空单元格、行数不足
// 数据: tests/fixtures/*.xlsx
// ==========================================


use campaign_etl::domain::types::{CampaignPhase, CanonicalField, FileFormat, StoreStatus};
use campaign_etl::domain::CellValue;
use campaign_etl::importer::{
    headers_of, CampaignImportRequest, CampaignImporter, ExcelParser, FileParser, ImportError,
    UniversalFileParser,
};
use test_helpers::*;

// 工作表 "Lojas": 表头带空白；Loja B 缺 regional；第 4 行全空；Loja C 缺 ativo
// 工作表 "Outra": 不应被读取
const STORE_WORKBOOK: &[u8] = include_bytes!("fixtures/lojas.xlsx");
const HEADER_ONLY_WORKBOOK: &[u8] = include_bytes!("fixtures/apenas_cabecalho.xlsx");

#[test]
fn test_reads_first_sheet_only() {
    let rows = ExcelParser.parse_bytes(STORE_WORKBOOK).unwrap();

    assert_eq!(rows.len(), 3, "linha vazia descartada, segunda aba ignorada");
    assert_eq!(headers_of(&rows), vec!["nome_loja", "regional", "ativo"]);
    assert!(rows.iter().all(|row| row.get("codigo").is_none()));
}

#[test]
fn test_cell_types_and_blank_defaults() {
    let rows = ExcelParser.parse_bytes(STORE_WORKBOOK).unwrap();

    assert_eq!(rows[0].text("nome_loja"), "Loja A");
    assert_eq!(rows[0].get("ativo"), Some(&CellValue::Bool(true)));

    assert_eq!(rows[1].get("regional"), Some(&CellValue::Blank));
    assert_eq!(rows[1].get("ativo"), Some(&CellValue::Number(1.0)));
    assert_eq!(rows[1].text("ativo"), "1");

    assert_eq!(rows[2].text("nome_loja"), "Loja C");
    assert_eq!(rows[2].get("ativo"), Some(&CellValue::Blank));
}

#[test]
fn test_header_only_workbook_rejected() {
    let result = ExcelParser.parse_bytes(HEADER_ONLY_WORKBOOK);
    assert!(matches!(result, Err(ImportError::InsufficientRows { found: 1 })));
}

#[test]
fn test_workbook_parse_is_idempotent() {
    let first = UniversalFileParser.parse(STORE_WORKBOOK, FileFormat::Xlsx).unwrap();
    let second = UniversalFileParser.parse(STORE_WORKBOOK, FileFormat::Xlsx).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_workbook_import_end_to_end() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_roster(&db_path, &["Loja A", "Loja C", "Loja D"]).await;
    let importer = create_test_importer(&db_path);

    let preview = importer.preview_file("lojas.xlsx", STORE_WORKBOOK).await.unwrap();
    assert_eq!(preview.format, FileFormat::Xlsx);
    assert_eq!(preview.mapping.get(CanonicalField::StoreName), Some("nome_loja"));
    assert_eq!(preview.mapping.get(CanonicalField::Active), Some("ativo"));
    assert!(preview.validation.valid);
    assert!(preview.validation.warnings.is_empty());

    let request = CampaignImportRequest::new(
        "lojas.xlsx",
        STORE_WORKBOOK.to_vec(),
        CampaignPhase::PreCampaign,
        "Natal 2024",
    );
    let result = importer.import_campaign(request).await.unwrap();

    assert_eq!(result.record.total_rows_in_file, 3);
    assert_eq!(result.counts.activated_count, 2);
    assert_eq!(result.counts.verify_count, 1);

    let roster = load_roster(&db_path).await;
    assert_eq!(store_named(&roster, "Loja D").status_pre, StoreStatus::Verify);
}
