// ==========================================
// 门店活动导入系统 - 活动导入器实现
// ==========================================
// 职责: 整合导入流程，从上传文件到名册与导入历史
// 流程: 解析 → 映射 → 校验 → 对账 → 保存名册 → 追加记录
// 并发: 同一导入器内的导入与人工复核串行执行（名册整表读写）
// ==========================================

use crate::config::{config_keys, ImportConfigReader};
use crate::domain::import::{
    CampaignImportResult, ColumnMapping, ImportPreview, ImportRecord, RawRow, ReconcileCounts,
    ValidationOutcome,
};
use crate::domain::store::StoreRecord;
use crate::domain::types::{CampaignPhase, FileFormat};
use crate::engine::reconciler::CampaignReconciler;
use crate::engine::record_builder::ImportRecordBuilder;
use crate::importer::column_mapper::ColumnMapper;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{headers_of, UniversalFileParser};
use crate::importer::import_trait::{CampaignImportRequest, CampaignImporter, ManualReview};
use crate::importer::row_projection::{extract_store_names, project_rows};
use crate::importer::row_validator::RowValidator;
use crate::repository::{ImportHistoryRepository, StoreRosterRepository};
use async_trait::async_trait;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// 预览中返回的样例行数
const PREVIEW_SAMPLE_ROWS: usize = 5;

// ==========================================
// CampaignImporterImpl - 活动导入器实现
// ==========================================
pub struct CampaignImporterImpl<R, H, C>
where
    R: StoreRosterRepository,
    H: ImportHistoryRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    roster_repo: R,
    history_repo: H,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: UniversalFileParser,
    column_mapper: ColumnMapper,
    reconciler: CampaignReconciler,
    record_builder: ImportRecordBuilder,

    // 名册读写串行化
    run_lock: Mutex<()>,
}

/// 单次运行的成功产物
struct RunOutput {
    record: ImportRecord,
    mapping: ColumnMapping,
    validation: ValidationOutcome,
    counts: ReconcileCounts,
}

impl<R, H, C> CampaignImporterImpl<R, H, C>
where
    R: StoreRosterRepository,
    H: ImportHistoryRepository,
    C: ImportConfigReader,
{
    pub fn new(roster_repo: R, history_repo: H, config: C) -> Self {
        Self {
            roster_repo,
            history_repo,
            config,
            file_parser: UniversalFileParser,
            column_mapper: ColumnMapper::new(),
            reconciler: CampaignReconciler::new(),
            record_builder: ImportRecordBuilder::new(),
            run_lock: Mutex::new(()),
        }
    }

    /// 替换记录构建器（注入时钟 / ID 生成器）
    pub fn with_record_builder(mut self, record_builder: ImportRecordBuilder) -> Self {
        self.record_builder = record_builder;
        self
    }

    // ==========================================
    // 配置读取
    // ==========================================

    async fn build_validator(&self) -> ImportResult<RowValidator> {
        let min = self
            .config
            .get_min_mapped_fields()
            .await
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::MIN_MAPPED_FIELDS.to_string(),
                message: e.to_string(),
            })?;
        Ok(RowValidator::new(min))
    }

    async fn resolve_actor(&self, actor: Option<String>) -> ImportResult<String> {
        match actor.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
            Some(actor) => Ok(actor),
            None => self
                .config
                .get_default_actor()
                .await
                .map_err(|e| ImportError::ConfigReadError {
                    key: config_keys::DEFAULT_ACTOR.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    // ==========================================
    // 流程步骤
    // ==========================================

    fn parse_upload(&self, file_name: &str, content: &[u8]) -> ImportResult<(FileFormat, Vec<RawRow>)> {
        let format = FileFormat::from_file_name(file_name)
            .ok_or_else(|| ImportError::UnsupportedFormat(file_name.to_string()))?;
        let rows = self.file_parser.parse(content, format)?;
        Ok((format, rows))
    }

    fn resolve_mapping(&self, rows: &[RawRow], mapping_override: Option<ColumnMapping>) -> ColumnMapping {
        match mapping_override {
            Some(mapping) => {
                debug!(mapped = mapping.mapped_count(), "使用人工映射");
                mapping
            }
            None => self.column_mapper.detect_mapping(&headers_of(rows)),
        }
    }

    /// 解析到追加记录的完整流程；调用方负责失败记录
    async fn run_pipeline(
        &self,
        request: CampaignImportRequest,
        campaign_name: &str,
        actor: &str,
    ) -> ImportResult<RunOutput> {
        // === 步骤 1: 解析文件 ===
        let (format, rows) = self.parse_upload(&request.file_name, &request.content)?;
        info!(format = ?format, rows = rows.len(), "文件解析完成");

        // === 步骤 2: 列映射 ===
        let mapping = self.resolve_mapping(&rows, request.mapping_override);
        info!(mapped = mapping.mapped_count(), "列映射完成");

        // === 步骤 3: 行校验（致命错误不进入对账）===
        let validation = self.build_validator().await?.validate(&rows, &mapping);
        if !validation.valid {
            warn!(errors = validation.errors.len(), "校验未通过");
            return Err(ImportError::ValidationFailed(validation));
        }
        if !validation.warnings.is_empty() {
            warn!(warnings = validation.warnings.len(), "校验存在警告");
        }

        // === 步骤 4: 对账 ===
        let names = extract_store_names(&rows, &mapping);
        let roster = self.roster_repo.load_roster().await?;
        debug!(uploaded = names.len(), roster = roster.len(), "开始对账");

        // 追加记录失败时用于恢复名册
        let previous_roster = roster.clone();
        let outcome = self.reconciler.reconcile(&names, roster, request.phase)?;
        info!(
            activated = outcome.counts.activated_count,
            verify = outcome.counts.verify_count,
            deactivated = outcome.counts.deactivated_count,
            "对账完成"
        );

        // === 步骤 5: 保存名册 + 追加记录（记录写入失败则恢复名册）===
        self.roster_repo.save_roster(&outcome.roster).await?;

        let record = self.record_builder.build_record(
            request.phase,
            campaign_name,
            &request.file_name,
            rows.len(),
            &outcome.counts,
            actor,
        );
        if let Err(append_err) = self.history_repo.append(&record).await {
            warn!(error = %append_err, record_id = %record.id, "导入记录写入失败，恢复名册");
            if let Err(restore_err) = self.roster_repo.save_roster(&previous_roster).await {
                error!(error = %restore_err, "名册恢复失败");
            }
            return Err(append_err.into());
        }

        Ok(RunOutput {
            record,
            mapping,
            validation,
            counts: outcome.counts,
        })
    }

    /// 追加失败记录（尽力而为，失败只记日志）
    async fn record_failure(
        &self,
        phase: CampaignPhase,
        campaign_name: &str,
        file_name: &str,
        actor: &str,
        reason: &str,
    ) {
        let record = self
            .record_builder
            .build_failed_record(phase, campaign_name, file_name, actor, reason);

        if let Err(e) = self.history_repo.append(&record).await {
            error!(error = %e, record_id = %record.id, "失败记录写入失败");
        }
    }
}

#[async_trait]
impl<R, H, C> CampaignImporter for CampaignImporterImpl<R, H, C>
where
    R: StoreRosterRepository + Send + Sync,
    H: ImportHistoryRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn preview_file(&self, file_name: &str, content: &[u8]) -> ImportResult<ImportPreview> {
        let (format, rows) = self.parse_upload(file_name, content)?;
        let headers = headers_of(&rows);
        let mapping = self.column_mapper.detect_mapping(&headers);
        let validation = self.build_validator().await?.validate(&rows, &mapping);
        let summary = project_rows(&rows, &mapping, &validation);

        info!(
            rows = rows.len(),
            mapped = mapping.mapped_count(),
            valid = validation.valid,
            "预览完成"
        );

        Ok(ImportPreview {
            file_name: file_name.to_string(),
            format,
            headers,
            total_rows: rows.len(),
            mapping,
            validation,
            sample_rows: rows.into_iter().take(PREVIEW_SAMPLE_ROWS).collect(),
            summary,
        })
    }

    #[instrument(
        skip(self, request),
        fields(file = %request.file_name, phase = %request.phase, run_id = tracing::field::Empty)
    )]
    async fn import_campaign(
        &self,
        request: CampaignImportRequest,
    ) -> ImportResult<CampaignImportResult> {
        let start_time = Instant::now();

        // 活动名称为空时直接拒绝（不产生记录）
        let campaign_name = request.campaign_name.trim().to_string();
        if campaign_name.is_empty() {
            return Err(ImportError::MissingCampaignName);
        }

        let actor = self.resolve_actor(request.actor.clone()).await?;
        let phase = request.phase;
        let file_name = request.file_name.clone();

        let _guard = self.run_lock.lock().await;
        info!(campaign = %campaign_name, actor = %actor, "开始活动导入");

        match self.run_pipeline(request, &campaign_name, &actor).await {
            Ok(output) => {
                tracing::Span::current().record("run_id", output.record.id.as_str());
                let elapsed_ms = start_time.elapsed().as_millis();
                info!(record_id = %output.record.id, elapsed_ms = elapsed_ms as u64, "活动导入完成");

                Ok(CampaignImportResult {
                    record: output.record,
                    mapping: output.mapping,
                    validation: output.validation,
                    counts: output.counts,
                    elapsed_ms,
                })
            }
            Err(e) => {
                error!(error = %e, "活动导入失败");
                self.record_failure(phase, &campaign_name, &file_name, &actor, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self, review), fields(store_id = %review.store_id, phase = %review.phase))]
    async fn review_store(&self, review: ManualReview) -> ImportResult<StoreRecord> {
        let actor = self.resolve_actor(review.actor).await?;

        let _guard = self.run_lock.lock().await;

        let mut store = self
            .roster_repo
            .find_by_id(&review.store_id)
            .await?
            .ok_or_else(|| {
                crate::engine::reconciler::ReconciliationError::StoreNotFound(
                    review.store_id.clone(),
                )
            })?;

        let updated = self.reconciler.set_status(
            std::slice::from_mut(&mut store),
            &review.store_id,
            review.status,
            review.phase,
            review.notes,
            &actor,
            self.record_builder.now(),
        )?;

        self.roster_repo.update_store(&updated).await?;
        info!(status = %review.status, actor = %actor, "人工复核完成");
        Ok(updated)
    }

    async fn recent_imports(&self, limit: Option<usize>) -> ImportResult<Vec<ImportRecord>> {
        let limit = match limit {
            Some(limit) => limit,
            None => self
                .config
                .get_history_limit()
                .await
                .map_err(|e| ImportError::ConfigReadError {
                    key: config_keys::HISTORY_LIMIT.to_string(),
                    message: e.to_string(),
                })?,
        };

        Ok(self.history_repo.list_recent(limit).await?)
    }

    async fn pending_review(&self) -> ImportResult<Vec<StoreRecord>> {
        let roster = self.roster_repo.load_roster().await?;
        Ok(CampaignReconciler::pending_review(&roster))
    }
}
