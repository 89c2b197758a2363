// ==========================================
// 门店活动导入系统 - 核心库
// ==========================================
// 职责: 活动门店名单导入、校验与对账
// 技术栈: Rust + SQLite
// 系统定位: 活动前/后门店名册维护 (人工复核兜底)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 对账规则与导入记录
pub mod engine;

// 导入层 - 上传文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CampaignPhase, CanonicalField, FileFormat, ImportOutcome, StoreStatus};

// 领域实体
pub use domain::{
    CampaignImportResult, ColumnMapping, ImportPreview, ImportRecord, RawRow, ReconcileCounts,
    StoreRecord, ValidationOutcome,
};

// 引擎
pub use engine::{CampaignReconciler, ImportRecordBuilder};

// 导入
pub use importer::{CampaignImportRequest, CampaignImporter, CampaignImporterImpl};

// API
pub use api::{ApiError, CampaignApi};
