// ==========================================
// 门店活动导入系统 - 导入记录构建
// ==========================================
// 职责: 组装一次导入运行的审计记录（只追加）
// 时钟与 ID 生成器可注入，默认 Utc::now / UUID v4
// ==========================================

use crate::domain::import::{ImportRecord, ReconcileCounts};
use crate::domain::types::{CampaignPhase, ImportOutcome};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct ImportRecordBuilder {
    clock: Clock,
    id_generator: IdGenerator,
}

impl Default for ImportRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ImportRecordBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportRecordBuilder").finish_non_exhaustive()
    }
}

impl ImportRecordBuilder {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Utc::now),
            id_generator: Arc::new(|| Uuid::new_v4().to_string()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// 成功对账后的记录（outcome = Completed）
    pub fn build_record(
        &self,
        phase: CampaignPhase,
        campaign_name: &str,
        source_filename: &str,
        uploaded_row_count: usize,
        counts: &ReconcileCounts,
        actor: &str,
    ) -> ImportRecord {
        ImportRecord {
            id: (self.id_generator)(),
            phase,
            campaign_name: campaign_name.to_string(),
            source_filename: source_filename.to_string(),
            imported_at: self.now(),
            total_rows_in_file: uploaded_row_count,
            activated_count: counts.activated_count,
            deactivated_count: counts.deactivated_count,
            verify_count: counts.verify_count,
            outcome: ImportOutcome::Completed,
            actor: actor.to_string(),
            failure_reason: None,
        }
    }

    /// 解析/校验/对账中止时的记录（无统计）
    pub fn build_failed_record(
        &self,
        phase: CampaignPhase,
        campaign_name: &str,
        source_filename: &str,
        actor: &str,
        reason: &str,
    ) -> ImportRecord {
        ImportRecord {
            id: (self.id_generator)(),
            phase,
            campaign_name: campaign_name.to_string(),
            source_filename: source_filename.to_string(),
            imported_at: self.now(),
            total_rows_in_file: 0,
            activated_count: 0,
            deactivated_count: 0,
            verify_count: 0,
            outcome: ImportOutcome::Failed,
            actor: actor.to_string(),
            failure_reason: Some(reason.to_string()),
        }
    }
}
