// ==========================================
// 门店活动导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod import;
pub mod store;
pub mod types;

// 重导出核心类型
pub use import::{
    CampaignImportResult, CellValue, ColumnMapping, EtlSummary, ImportPreview, ImportRecord,
    MappedRow, RawRow, ReconcileCounts, ReconcileOutcome, ValidationOutcome,
};
pub use store::StoreRecord;
pub use types::{CampaignPhase, CanonicalField, FileFormat, ImportOutcome, StoreStatus};
