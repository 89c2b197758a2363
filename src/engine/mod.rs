// ==========================================
// 门店活动导入系统 - 引擎层
// ==========================================
// 职责: 活动对账规则与导入记录构建，不拼 SQL
// 红线: 引擎只处理传入的名册副本，持久化由调用方负责
// ==========================================

pub mod reconciler;
pub mod record_builder;

// 重导出核心引擎
pub use reconciler::{CampaignReconciler, ReconciliationError};
pub use record_builder::{Clock, IdGenerator, ImportRecordBuilder};
