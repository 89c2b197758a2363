// ==========================================
// 门店活动导入系统 - 导入 Trait
// ==========================================
// 职责: 定义活动导入接口（不包含实现）
// 管道: 上传 → 解析 → 映射 → 校验 → 对账 → 记录
// ==========================================

use crate::domain::import::{
    CampaignImportResult, ColumnMapping, ImportPreview, ImportRecord, RawRow,
};
use crate::domain::store::StoreRecord;
use crate::domain::types::{CampaignPhase, StoreStatus};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// CampaignImportRequest - 一次活动导入的输入
// ==========================================
#[derive(Debug, Clone)]
pub struct CampaignImportRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    pub phase: CampaignPhase,
    pub campaign_name: String,
    pub actor: Option<String>,
    /// 用户修正后的映射；为空时自动识别
    pub mapping_override: Option<ColumnMapping>,
}

impl CampaignImportRequest {
    pub fn new(
        file_name: impl Into<String>,
        content: Vec<u8>,
        phase: CampaignPhase,
        campaign_name: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            phase,
            campaign_name: campaign_name.into(),
            actor: None,
            mapping_override: None,
        }
    }

    /// 从磁盘文件构造请求（文件名取自路径最后一段）
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        phase: CampaignPhase,
        campaign_name: impl Into<String>,
    ) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileReadError(format!(
                "arquivo não encontrado: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let content = std::fs::read(path)?;

        Ok(Self::new(file_name, content, phase, campaign_name))
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping_override = Some(mapping);
        self
    }
}

// ==========================================
// ManualReview - 人工复核
// ==========================================
// 阶段必须显式给出，决定写入 status_pre 还是 status_post
#[derive(Debug, Clone)]
pub struct ManualReview {
    pub store_id: String,
    pub phase: CampaignPhase,
    pub status: StoreStatus,
    pub notes: Option<String>,
    pub actor: Option<String>,
}

// ==========================================
// CampaignImporter Trait
// ==========================================
// 用途: 活动导入主接口
// 实现者: CampaignImporterImpl
#[async_trait]
pub trait CampaignImporter: Send + Sync {
    /// 解析 + 识别映射 + 校验，不落库
    async fn preview_file(&self, file_name: &str, content: &[u8]) -> ImportResult<ImportPreview>;

    /// 执行一次活动导入
    ///
    /// # 返回
    /// - Ok: 对账已保存，导入记录已追加（Completed）
    /// - Err: 任一阶段失败；解析/校验/对账失败时已追加 Failed 记录
    async fn import_campaign(
        &self,
        request: CampaignImportRequest,
    ) -> ImportResult<CampaignImportResult>;

    /// 人工复核：直接覆盖指定阶段的状态
    async fn review_store(&self, review: ManualReview) -> ImportResult<StoreRecord>;

    /// 最近的导入记录（新记录在前）
    async fn recent_imports(&self, limit: Option<usize>) -> ImportResult<Vec<ImportRecord>>;

    /// 待复核门店
    async fn pending_review(&self) -> ImportResult<Vec<StoreRecord>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析字节内容为原始行（表头行不计入）
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>>;
}
