// ==========================================
// 门店活动导入系统 - 行投影
// ==========================================
// 职责: 按映射把原始行投影为标准字段行；提取上传的门店名称
// ==========================================

use crate::domain::import::{ColumnMapping, EtlSummary, MappedRow, RawRow, ValidationOutcome};
use crate::domain::types::CanonicalField;
use std::collections::BTreeSet;

/// 把原始行投影为标准字段行（未映射或缺失的列不出现）
pub fn project_row(row: &RawRow, mapping: &ColumnMapping) -> MappedRow {
    mapping
        .iter()
        .filter_map(|(field, header)| row.get(header).map(|value| (field, value.to_string())))
        .collect()
}

/// 生成 ETL 汇总
pub fn project_rows(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    outcome: &ValidationOutcome,
) -> EtlSummary {
    let data: Vec<MappedRow> = rows.iter().map(|row| project_row(row, mapping)).collect();

    EtlSummary {
        total_records: rows.len(),
        valid_records: data.len(),
        invalid_records: rows.len() - data.len(),
        warnings: outcome.warnings.clone(),
        errors: outcome.errors.clone(),
        data,
    }
}

/// 提取上传的门店名称
///
/// 使用映射的门店名称列；未映射时退回第一列。空白名称跳过，重复名称合并。
pub fn extract_store_names(rows: &[RawRow], mapping: &ColumnMapping) -> BTreeSet<String> {
    let name_header = mapping.get(CanonicalField::StoreName);

    rows.iter()
        .filter_map(|row| match name_header {
            Some(header) => row.get(header),
            None => row.first_value(),
        })
        .map(|value| value.to_string().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::CellValue;

    fn rows() -> Vec<RawRow> {
        vec![
            vec![
                ("codigo".to_string(), CellValue::Number(1.0)),
                ("nome_loja".to_string(), CellValue::Text("Loja A".to_string())),
            ]
            .into_iter()
            .collect(),
            vec![
                ("codigo".to_string(), CellValue::Number(2.0)),
                ("nome_loja".to_string(), CellValue::Text(" ".to_string())),
            ]
            .into_iter()
            .collect(),
            vec![
                ("codigo".to_string(), CellValue::Number(3.0)),
                ("nome_loja".to_string(), CellValue::Text("Loja A".to_string())),
            ]
            .into_iter()
            .collect(),
        ]
    }

    #[test]
    fn test_extract_names_from_mapped_column() {
        let mut mapping = ColumnMapping::new();
        mapping.set(CanonicalField::StoreName, "nome_loja");

        let names = extract_store_names(&rows(), &mapping);

        assert_eq!(names.len(), 1);
        assert!(names.contains("Loja A"));
    }

    #[test]
    fn test_extract_names_falls_back_to_first_column() {
        let names = extract_store_names(&rows(), &ColumnMapping::new());

        assert_eq!(names.len(), 3);
        assert!(names.contains("1"));
    }

    #[test]
    fn test_project_rows_keeps_only_mapped_fields() {
        let mut mapping = ColumnMapping::new();
        mapping.set(CanonicalField::StoreName, "nome_loja");
        mapping.set(CanonicalField::Region, "regional_inexistente");

        let summary = project_rows(&rows(), &mapping, &ValidationOutcome::from_messages(vec![], vec![]));

        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.valid_records, 3);
        assert_eq!(summary.invalid_records, 0);
        assert_eq!(summary.data[0].len(), 1);
        assert_eq!(summary.data[0][&CanonicalField::StoreName], "Loja A");
    }
}
