// ==========================================
// 门店活动导入系统 - 列映射识别
// ==========================================
// 职责: 表头 → 标准字段（子串/同义词匹配，大小写不敏感）
// 规则: 字段按标准顺序依次识别；表头按文件顺序扫描，取第一个
//       包含任一同义词且尚未被占用的表头
// ==========================================

use crate::domain::import::ColumnMapping;
use crate::domain::types::CanonicalField;

/// 同义词表（小写）
const SYNONYMS: [(CanonicalField, &[&str]); 5] = [
    (
        CanonicalField::StoreName,
        &["nome", "loja", "store", "nome_loja", "store_name"],
    ),
    (
        CanonicalField::Address,
        &["endereco", "endereço", "address", "endereco_principal"],
    ),
    (CanonicalField::Region, &["regional", "region", "area", "zona"]),
    (
        CanonicalField::Banner,
        &["bandeira", "banner", "categoria", "tipo"],
    ),
    (
        CanonicalField::Active,
        &["ativo", "active", "status", "situacao"],
    ),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnMapper;

impl ColumnMapper {
    pub fn new() -> Self {
        Self
    }

    /// 字段的同义词列表
    pub fn synonyms(field: CanonicalField) -> &'static [&'static str] {
        SYNONYMS
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, list)| *list)
            .unwrap_or(&[])
    }

    /// 表头是否匹配字段的任一同义词
    pub fn header_matches(header: &str, field: CanonicalField) -> bool {
        let lowered = header.to_lowercase();
        Self::synonyms(field)
            .iter()
            .any(|synonym| lowered.contains(synonym))
    }

    /// 自动识别映射
    ///
    /// 同一表头可能命中多个字段（如同时包含 "status" 和 "ativo"）：
    /// 靠前的字段占用该表头，靠后的字段继续寻找下一个未占用的表头。
    pub fn detect_mapping(&self, headers: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();

        for field in CanonicalField::ALL {
            let found = headers.iter().find(|header| {
                !header.trim().is_empty()
                    && !mapping.claims_header(header)
                    && Self::header_matches(header, field)
            });

            if let Some(header) = found {
                mapping.set(field, header.clone());
            }
        }

        mapping
    }
}
