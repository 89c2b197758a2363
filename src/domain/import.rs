// ==========================================
// 门店活动导入系统 - 导入领域模型
// ==========================================
// 职责: 原始行 / 字段映射 / 校验结果 / 导入记录 / 对账统计
// 生命周期: RawRow 仅在一次导入流程内；ImportRecord 只追加不修改
// ==========================================

use crate::domain::store::StoreRecord;
use crate::domain::types::{CampaignPhase, CanonicalField, FileFormat, ImportOutcome};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Blank,
}

impl CellValue {
    /// 空白或仅含空白字符
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            // 整数值不带小数点（1.0 → "1"）
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Blank => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Blank => serializer.serialize_str(""),
        }
    }
}

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 有序映射: 表头 → 单元格值，顺序与文件列顺序一致
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入单元格；表头重复时覆盖原位置的值
    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        let header = header.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(h, _)| h == header).map(|(_, v)| v)
    }

    /// 单元格文本（缺失视为空串）
    pub fn text(&self, header: &str) -> String {
        self.get(header).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }

    pub fn first_value(&self) -> Option<&CellValue> {
        self.cells.first().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 所有值均为空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl FromIterator<(String, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, value) in &self.cells {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

// ==========================================
// ColumnMapping - 标准字段映射
// ==========================================
// 不变量: 每个标准字段至多对应一个表头
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    fields: BTreeMap<CanonicalField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: CanonicalField, header: impl Into<String>) {
        self.fields.insert(field, header.into());
    }

    pub fn remove(&mut self, field: CanonicalField) -> Option<String> {
        self.fields.remove(&field)
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn mapped_count(&self) -> usize {
        self.fields.len()
    }

    /// 表头是否已被某个字段占用
    pub fn claims_header(&self, header: &str) -> bool {
        self.fields.values().any(|h| h == header)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.fields.iter().map(|(f, h)| (*f, h.as_str()))
    }
}

// ==========================================
// ValidationOutcome - 校验结果
// ==========================================
// 不变量: valid == errors.is_empty()
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn from_messages(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

// ==========================================
// ReconcileCounts - 对账统计
// ==========================================
// 不变量: activated + verify + deactivated == 名册门店数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileCounts {
    pub activated_count: usize,
    pub verify_count: usize,
    pub deactivated_count: usize,
}

impl ReconcileCounts {
    pub fn total(&self) -> usize {
        self.activated_count + self.verify_count + self.deactivated_count
    }
}

// ==========================================
// ReconcileOutcome - 对账结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub roster: Vec<StoreRecord>,
    pub counts: ReconcileCounts,
}

// ==========================================
// ImportRecord - 导入历史记录
// ==========================================
// 对齐: import_record 表（只追加）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: String,
    pub phase: CampaignPhase,
    pub campaign_name: String,
    pub source_filename: String,
    pub imported_at: DateTime<Utc>,
    pub total_rows_in_file: usize,
    pub activated_count: usize,
    pub deactivated_count: usize,
    pub verify_count: usize,
    pub outcome: ImportOutcome,
    pub actor: String,
    pub failure_reason: Option<String>, // 失败原因（仅 Failed）
}

// ==========================================
// MappedRow / EtlSummary - 映射后数据
// ==========================================
pub type MappedRow = BTreeMap<CanonicalField, String>;

#[derive(Debug, Clone, Serialize)]
pub struct EtlSummary {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub data: Vec<MappedRow>,
}

// ==========================================
// ImportPreview - 预览（不落库）
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    pub file_name: String,
    pub format: FileFormat,
    pub headers: Vec<String>,
    pub total_rows: usize,
    pub mapping: ColumnMapping,
    pub validation: ValidationOutcome,
    pub sample_rows: Vec<RawRow>,
    /// 按映射投影后的全部行
    pub summary: EtlSummary,
}

// ==========================================
// CampaignImportResult - 活动导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct CampaignImportResult {
    pub record: ImportRecord,
    pub mapping: ColumnMapping,
    pub validation: ValidationOutcome,
    pub counts: ReconcileCounts,
    pub elapsed_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_integer_display() {
        assert_eq!(CellValue::Number(1.0).to_string(), "1");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Blank.to_string(), "");
    }

    #[test]
    fn test_raw_row_keeps_column_order() {
        let mut row = RawRow::new();
        row.insert("nome_loja", CellValue::Text("Loja A".to_string()));
        row.insert("regional", CellValue::Text("Sul".to_string()));
        row.insert("bandeira", CellValue::Text("X".to_string()));

        let headers: Vec<&str> = row.headers().collect();
        assert_eq!(headers, vec!["nome_loja", "regional", "bandeira"]);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"nome_loja":"Loja A","regional":"Sul","bandeira":"X"}"#);
    }

    #[test]
    fn test_raw_row_duplicate_header_overwrites_in_place() {
        let mut row = RawRow::new();
        row.insert("a", CellValue::Text("1".to_string()));
        row.insert("b", CellValue::Text("2".to_string()));
        row.insert("a", CellValue::Text("3".to_string()));

        assert_eq!(row.len(), 2);
        assert_eq!(row.text("a"), "3");
        assert_eq!(row.headers().next(), Some("a"));
    }

    #[test]
    fn test_raw_row_blank_detection() {
        let row: RawRow = vec![
            ("a".to_string(), CellValue::Text("  ".to_string())),
            ("b".to_string(), CellValue::Blank),
        ]
        .into_iter()
        .collect();
        assert!(row.is_blank());
    }

    #[test]
    fn test_column_mapping_serializes_canonical_keys() {
        let mut mapping = ColumnMapping::new();
        mapping.set(CanonicalField::Region, "regional");
        mapping.set(CanonicalField::StoreName, "nome_loja");

        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"store_name":"nome_loja","region":"regional"}"#);
        assert!(mapping.claims_header("regional"));
        assert_eq!(mapping.mapped_count(), 2);
    }
}
