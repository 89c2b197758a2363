// ==========================================
// 门店活动导入系统 - 行校验器
// ==========================================
// 结构校验: 已映射的标准字段数 < 下限 → 单条致命错误，不再逐行检查
// 逐行校验: 行号 = 索引 + 2（表头为第 1 行）
//   - 门店名称已映射但为空 → 错误
//   - 状态列已映射且非空但不在可识别集合 → 警告（值原样保留）
// ==========================================

use crate::domain::import::{ColumnMapping, RawRow, ValidationOutcome};
use crate::domain::types::CanonicalField;
use crate::i18n::t_with_args;

/// 可识别的状态取值（小写比较）
const ACCEPTED_ACTIVE_TOKENS: [&str; 8] =
    ["true", "false", "ativo", "inativo", "1", "0", "sim", "não"];

/// 默认的最少映射字段数
pub const DEFAULT_MIN_MAPPED_FIELDS: usize = 2;

#[derive(Debug, Clone)]
pub struct RowValidator {
    min_mapped_fields: usize,
}

impl Default for RowValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MAPPED_FIELDS)
    }
}

impl RowValidator {
    pub fn new(min_mapped_fields: usize) -> Self {
        Self { min_mapped_fields }
    }

    pub fn min_mapped_fields(&self) -> usize {
        self.min_mapped_fields
    }

    pub fn is_recognized_active(value: &str) -> bool {
        let lowered = value.trim().to_lowercase();
        ACCEPTED_ACTIVE_TOKENS.contains(&lowered.as_str())
    }

    pub fn validate(&self, rows: &[RawRow], mapping: &ColumnMapping) -> ValidationOutcome {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if mapping.mapped_count() < self.min_mapped_fields {
            errors.push(t_with_args(
                "validation.min_mapped_fields",
                &[("min", &self.min_mapped_fields.to_string())],
            ));
            return ValidationOutcome::from_messages(errors, warnings);
        }

        let name_header = mapping.get(CanonicalField::StoreName);
        let active_header = mapping.get(CanonicalField::Active);

        for (idx, row) in rows.iter().enumerate() {
            let line = (idx + 2).to_string();

            if let Some(header) = name_header {
                let missing = row.get(header).map(|v| v.is_empty()).unwrap_or(true);
                if missing {
                    errors.push(t_with_args(
                        "validation.store_name_required",
                        &[("line", &line)],
                    ));
                }
            }

            if let Some(header) = active_header {
                let value = row.text(header);
                if !value.trim().is_empty() && !Self::is_recognized_active(&value) {
                    warnings.push(t_with_args(
                        "validation.unrecognized_active",
                        &[("line", &line), ("value", &value)],
                    ));
                }
            }
        }

        ValidationOutcome::from_messages(errors, warnings)
    }
}
