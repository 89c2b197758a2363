// ==========================================
// 门店活动导入系统 - 活动导入 API
// ==========================================
// 职责: 封装导入/预览/复核/历史，供 CLI 调用
// 说明: 文本参数（阶段、状态）在此解析，错误转换为 ApiError
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::import::{CampaignImportResult, ImportPreview, ImportRecord};
use crate::domain::store::StoreRecord;
use crate::domain::types::{CampaignPhase, StoreStatus};
use crate::i18n;
use crate::importer::{
    write_store_template_file, CampaignImportRequest, CampaignImporter, CampaignImporterImpl,
    ManualReview,
};
use crate::repository::{
    ImportHistoryRepositoryImpl, StoreRosterRepository, StoreRosterRepositoryImpl,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

type DefaultImporter =
    CampaignImporterImpl<StoreRosterRepositoryImpl, ImportHistoryRepositoryImpl, ConfigManager>;

/// 活动导入 API
pub struct CampaignApi {
    importer: DefaultImporter,
    roster_repo: StoreRosterRepositoryImpl,
    config: ConfigManager,
}

impl CampaignApi {
    /// 打开数据库（必要时建表）并构建导入器
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接构建（所有仓储共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            ensure_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let importer = CampaignImporterImpl::new(
            StoreRosterRepositoryImpl::from_connection(conn.clone()),
            ImportHistoryRepositoryImpl::from_connection(conn.clone()),
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        );

        Ok(Self {
            importer,
            roster_repo: StoreRosterRepositoryImpl::from_connection(conn.clone()),
            config: ConfigManager::from_connection(conn)
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        })
    }

    /// 按配置切换消息语言，返回生效的语言
    pub async fn apply_configured_locale(&self) -> ApiResult<String> {
        let locale = self
            .config
            .get_locale()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        i18n::set_locale(&locale);
        Ok(locale)
    }

    /// 预览磁盘文件（不落库）
    pub async fn preview_path(&self, path: &str) -> ApiResult<ImportPreview> {
        let file_name = file_name_of(path);
        let content = std::fs::read(path).map_err(|e| {
            let msg = i18n::t_with_args("import.file_not_found", &[("path", path)]);
            ApiError::InvalidInput(format!("{} ({})", msg, e))
        })?;
        Ok(self.importer.preview_file(&file_name, &content).await?)
    }

    /// 导入磁盘文件
    pub async fn import_path(
        &self,
        path: &str,
        phase: &str,
        campaign_name: &str,
        actor: Option<&str>,
    ) -> ApiResult<CampaignImportResult> {
        let phase = parse_phase(phase)?;
        let mut request = CampaignImportRequest::from_path(path, phase, campaign_name)?;
        if let Some(actor) = actor {
            request = request.with_actor(actor);
        }

        let result = self.importer.import_campaign(request).await?;
        info!(
            "{}",
            i18n::t_with_args(
                "import.completed",
                &[
                    ("phase", result.record.phase.as_str()),
                    ("activated", &result.counts.activated_count.to_string()),
                    ("verify", &result.counts.verify_count.to_string()),
                ],
            )
        );
        Ok(result)
    }

    /// 导入内存中的上传内容
    pub async fn import_upload(
        &self,
        request: CampaignImportRequest,
    ) -> ApiResult<CampaignImportResult> {
        Ok(self.importer.import_campaign(request).await?)
    }

    /// 人工复核
    pub async fn review_store(
        &self,
        store_id: &str,
        phase: &str,
        status: &str,
        notes: Option<String>,
        actor: Option<String>,
    ) -> ApiResult<StoreRecord> {
        let status = status.parse::<StoreStatus>().map_err(ApiError::InvalidInput)?;
        let review = ManualReview {
            store_id: store_id.to_string(),
            phase: parse_phase(phase)?,
            status,
            notes,
            actor,
        };

        let updated = self.importer.review_store(review).await?;
        info!(
            "{}",
            i18n::t_with_args("review.status_updated", &[("status", status.as_str())])
        );
        Ok(updated)
    }

    /// 导入历史（新记录在前）
    pub async fn import_history(&self, limit: Option<usize>) -> ApiResult<Vec<ImportRecord>> {
        Ok(self.importer.recent_imports(limit).await?)
    }

    /// 待复核门店
    pub async fn pending_review(&self) -> ApiResult<Vec<StoreRecord>> {
        Ok(self.importer.pending_review().await?)
    }

    /// 向名册登记门店（名册维护）
    pub async fn register_store(&self, store: StoreRecord) -> ApiResult<StoreRecord> {
        if store.id.trim().is_empty() || store.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("id e nome da loja são obrigatórios".to_string()));
        }
        self.roster_repo.insert_store(&store).await?;
        Ok(store)
    }

    /// 整份名册
    pub async fn roster(&self) -> ApiResult<Vec<StoreRecord>> {
        Ok(self.roster_repo.load_roster().await?)
    }

    // ==========================================
    // 配置维护
    // ==========================================

    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        self.config
            .get_global_config_value(key)
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    pub fn set_config(&self, key: &str, value: &str) -> ApiResult<()> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("chave de configuração vazia".to_string()));
        }
        self.config
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        info!(key = %key, "配置已更新");
        Ok(())
    }

    /// 全部全局配置（JSON）
    pub fn config_snapshot(&self) -> ApiResult<String> {
        self.config
            .get_config_snapshot()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// 写出导入模板
    pub fn write_template(&self, path: &str) -> ApiResult<()> {
        write_store_template_file(path)?;
        info!("{}", i18n::t_with_args("import.template_written", &[("path", path)]));
        Ok(())
    }
}

fn parse_phase(raw: &str) -> ApiResult<CampaignPhase> {
    raw.parse::<CampaignPhase>().map_err(ApiError::InvalidInput)
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> CampaignApi {
        let conn = Connection::open_in_memory().unwrap();
        CampaignApi::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_phase_rejected() {
        let api = api();
        let result = api.review_store("1", "durante", "active", None, None).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_register_store_requires_name() {
        let api = api();
        let result = api.register_store(StoreRecord::new("1", " ")).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_configured_locale_round_trip() {
        let api = api();
        api.set_config("locale", "en").unwrap();
        assert_eq!(api.get_config("locale").unwrap().as_deref(), Some("en"));
        assert!(api.set_config(" ", "x").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let api = api();
        let result = api.preview_path("/nao/existe/lojas.csv").await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
