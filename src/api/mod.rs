// ==========================================
// 门店活动导入系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 调用
// ==========================================

pub mod campaign_api;
pub mod error;

// 重导出核心类型
pub use campaign_api::CampaignApi;
pub use error::{ApiError, ApiResult, ErrorPayload};
