// ==========================================
// 门店活动导入系统 - 导入层
// ==========================================
// 职责: 上传文件 → 原始行 → 列映射 → 校验 → 活动对账
// 支持: CSV, Excel (.xlsx/.xls)
// ==========================================

// 模块声明
pub mod campaign_importer_impl;
pub mod column_mapper;
pub mod error;
pub mod file_parser;
pub mod import_trait;
pub mod row_projection;
pub mod row_validator;
pub mod template;

// 重导出核心类型
pub use campaign_importer_impl::CampaignImporterImpl;
pub use column_mapper::ColumnMapper;
pub use error::{ImportError, ImportResult};
pub use file_parser::{headers_of, CsvParser, ExcelParser, UniversalFileParser};
pub use row_projection::{extract_store_names, project_row, project_rows};
pub use row_validator::{RowValidator, DEFAULT_MIN_MAPPED_FIELDS};
pub use template::{write_store_template, write_store_template_file, TEMPLATE_HEADERS};

// 重导出 Trait 接口
pub use import_trait::{CampaignImportRequest, CampaignImporter, FileParser, ManualReview};
