// ==========================================
// 门店活动导入系统 - 活动对账引擎
// ==========================================
// 职责: 上传的门店名称 × 门店名册 → 阶段状态 + 汇总统计
// 输入: 上传名称集合 + 名册（按值传入） + 阶段
// 输出: 更新后的名册 + ReconcileCounts
// 红线: 自动对账只产生 Active / Verify，Inactive 仅由人工复核写入
// 红线: 活动后阶段不覆盖已有的停用原因
// ==========================================

use crate::domain::import::{ReconcileCounts, ReconcileOutcome};
use crate::domain::store::StoreRecord;
use crate::domain::types::{CampaignPhase, StoreStatus};
use crate::i18n::t;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

// ==========================================
// ReconciliationError - 对账错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconciliationError {
    #[error("ID de loja duplicado no cadastro: {0}")]
    DuplicateStoreId(String),

    #[error("Loja não encontrada: {0}")]
    StoreNotFound(String),

    #[error("Status manual inválido: {0} (apenas active/inactive)")]
    InvalidOverrideStatus(StoreStatus),
}

// ==========================================
// CampaignReconciler - 活动对账引擎
// ==========================================
/// 无状态引擎；名册的读写由调用方负责
#[derive(Debug, Default, Clone, Copy)]
pub struct CampaignReconciler;

impl CampaignReconciler {
    pub fn new() -> Self {
        Self
    }

    /// 对账
    ///
    /// # 规则
    /// - 名称统一小写后精确匹配（无模糊匹配）
    /// - 活动前: status_pre = 在场 ? Active : Verify；缺席写入原因，在场清除原因
    /// - 活动后: status_post = 在场 ? Active : Verify；participated = 在场；
    ///   缺席时仅在原因为空时写入
    pub fn reconcile<I, S>(
        &self,
        uploaded_names: I,
        roster: Vec<StoreRecord>,
        phase: CampaignPhase,
    ) -> Result<ReconcileOutcome, ReconciliationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ensure_unique_ids(&roster)?;

        let normalized: HashSet<String> = uploaded_names
            .into_iter()
            .map(|name| normalize_name(name.as_ref()))
            .collect();

        let mut roster = roster;
        for store in roster.iter_mut() {
            let is_present = normalized.contains(&normalize_name(&store.name));
            match phase {
                CampaignPhase::PreCampaign => apply_pre_campaign(store, is_present),
                CampaignPhase::PostCampaign => apply_post_campaign(store, is_present),
            }
        }

        let counts = Self::count_statuses(&roster, phase);
        Ok(ReconcileOutcome { roster, counts })
    }

    /// 统计阶段状态
    ///
    /// deactivated = 总数 - active - verify（非 active 且非 verify 均计为停用）
    pub fn count_statuses(roster: &[StoreRecord], phase: CampaignPhase) -> ReconcileCounts {
        let activated_count = roster
            .iter()
            .filter(|s| s.status_for(phase) == Some(StoreStatus::Active))
            .count();
        let verify_count = roster
            .iter()
            .filter(|s| s.status_for(phase) == Some(StoreStatus::Verify))
            .count();

        ReconcileCounts {
            activated_count,
            verify_count,
            deactivated_count: roster.len() - activated_count - verify_count,
        }
    }

    /// 人工复核: 直接设置指定阶段的状态
    ///
    /// # 规则
    /// - 只接受 Active / Inactive
    /// - 写入 verified_at / verified_by / notes，覆盖自动对账结果
    #[allow(clippy::too_many_arguments)]
    pub fn set_status(
        &self,
        roster: &mut [StoreRecord],
        store_id: &str,
        new_status: StoreStatus,
        phase: CampaignPhase,
        notes: Option<String>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<StoreRecord, ReconciliationError> {
        if !matches!(new_status, StoreStatus::Active | StoreStatus::Inactive) {
            return Err(ReconciliationError::InvalidOverrideStatus(new_status));
        }

        let store = roster
            .iter_mut()
            .find(|s| s.id == store_id)
            .ok_or_else(|| ReconciliationError::StoreNotFound(store_id.to_string()))?;

        apply_override(store, new_status, phase, notes, actor, at);
        Ok(store.clone())
    }

    /// 待复核门店（任一阶段为 Verify）
    pub fn pending_review(roster: &[StoreRecord]) -> Vec<StoreRecord> {
        roster.iter().filter(|s| s.needs_review()).cloned().collect()
    }
}

/// 对单个门店应用人工覆盖（名册已定位到门店时使用）
pub fn apply_override(
    store: &mut StoreRecord,
    new_status: StoreStatus,
    phase: CampaignPhase,
    notes: Option<String>,
    actor: &str,
    at: DateTime<Utc>,
) {
    match phase {
        CampaignPhase::PreCampaign => store.status_pre = new_status,
        CampaignPhase::PostCampaign => store.status_post = Some(new_status),
    }
    store.verified_at = Some(at);
    store.verified_by = Some(actor.to_string());
    store.notes = notes;
}

fn ensure_unique_ids(roster: &[StoreRecord]) -> Result<(), ReconciliationError> {
    let mut seen_ids = HashSet::new();
    for store in roster {
        if !seen_ids.insert(store.id.as_str()) {
            return Err(ReconciliationError::DuplicateStoreId(store.id.clone()));
        }
    }
    Ok(())
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn apply_pre_campaign(store: &mut StoreRecord, is_present: bool) {
    if is_present {
        store.status_pre = StoreStatus::Active;
        store.deactivation_reason = None;
    } else {
        store.status_pre = StoreStatus::Verify;
        store.deactivation_reason = Some(t("reconcile.reason_missing_pre"));
    }
}

fn apply_post_campaign(store: &mut StoreRecord, is_present: bool) {
    store.participated = is_present;
    if is_present {
        store.status_post = Some(StoreStatus::Active);
    } else {
        store.status_post = Some(StoreStatus::Verify);
        if store.deactivation_reason.is_none() {
            store.deactivation_reason = Some(t("reconcile.reason_missing_post"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(id: &str, name: &str) -> StoreRecord {
        StoreRecord::new(id, name)
    }

    #[test]
    fn test_pre_campaign_example() {
        let roster = vec![store("1", "Loja A"), store("2", "Loja C")];

        let outcome = CampaignReconciler
            .reconcile(["Loja A", "Loja B"], roster, CampaignPhase::PreCampaign)
            .unwrap();

        assert_eq!(outcome.roster[0].status_pre, StoreStatus::Active);
        assert!(outcome.roster[0].deactivation_reason.is_none());
        assert_eq!(outcome.roster[1].status_pre, StoreStatus::Verify);
        assert!(outcome.roster[1].deactivation_reason.is_some());
        assert_eq!(
            outcome.counts,
            ReconcileCounts {
                activated_count: 1,
                verify_count: 1,
                deactivated_count: 0,
            }
        );
    }

    #[test]
    fn test_names_compare_case_insensitive() {
        let roster = vec![store("1", "LOJA A")];

        let outcome = CampaignReconciler
            .reconcile(["loja a"], roster, CampaignPhase::PreCampaign)
            .unwrap();

        assert_eq!(outcome.roster[0].status_pre, StoreStatus::Active);
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let roster = vec![store("1", "Loja A Centro")];

        let outcome = CampaignReconciler
            .reconcile(["Loja A"], roster, CampaignPhase::PreCampaign)
            .unwrap();

        assert_eq!(outcome.roster[0].status_pre, StoreStatus::Verify);
    }

    #[test]
    fn test_pre_campaign_clears_reason_when_present() {
        let mut s = store("1", "Loja A");
        s.deactivation_reason = Some("antigo".to_string());

        let outcome = CampaignReconciler
            .reconcile(["Loja A"], vec![s], CampaignPhase::PreCampaign)
            .unwrap();

        assert!(outcome.roster[0].deactivation_reason.is_none());
    }

    #[test]
    fn test_post_campaign_preserves_existing_reason() {
        let mut s = store("1", "Loja C");
        s.deactivation_reason = Some("motivo pré".to_string());

        let outcome = CampaignReconciler
            .reconcile(Vec::<String>::new(), vec![s], CampaignPhase::PostCampaign)
            .unwrap();

        let updated = &outcome.roster[0];
        assert_eq!(updated.deactivation_reason.as_deref(), Some("motivo pré"));
        assert_eq!(updated.status_post, Some(StoreStatus::Verify));
        assert!(!updated.participated);
    }

    #[test]
    fn test_post_campaign_present_store() {
        let mut s = store("1", "Loja A");
        s.status_pre = StoreStatus::Verify;
        s.deactivation_reason = Some("motivo pré".to_string());

        let outcome = CampaignReconciler
            .reconcile(["Loja A"], vec![s], CampaignPhase::PostCampaign)
            .unwrap();

        let updated = &outcome.roster[0];
        assert!(updated.participated);
        assert_eq!(updated.status_post, Some(StoreStatus::Active));
        // 活动前状态不受影响
        assert_eq!(updated.status_pre, StoreStatus::Verify);
        assert_eq!(updated.deactivation_reason.as_deref(), Some("motivo pré"));
    }

    #[test]
    fn test_post_campaign_sets_reason_when_missing() {
        let outcome = CampaignReconciler
            .reconcile(["x"], vec![store("1", "Loja A")], CampaignPhase::PostCampaign)
            .unwrap();

        assert!(outcome.roster[0].deactivation_reason.is_some());
    }

    #[test]
    fn test_counts_always_sum_to_roster_length() {
        let mut manual = store("3", "Loja M");
        manual.status_pre = StoreStatus::Inactive;
        let roster = vec![store("1", "Loja A"), store("2", "Loja B"), manual];

        for phase in [CampaignPhase::PreCampaign, CampaignPhase::PostCampaign] {
            let outcome = CampaignReconciler
                .reconcile(["Loja A"], roster.clone(), phase)
                .unwrap();
            assert_eq!(outcome.counts.total(), outcome.roster.len());
        }
    }

    #[test]
    fn test_automatic_path_never_assigns_inactive() {
        // 停用数由差值推出，自动对账本身不写 Inactive
        let roster = vec![store("1", "Loja A"), store("2", "Loja B")];

        let pre = CampaignReconciler
            .reconcile(Vec::<&str>::new(), roster.clone(), CampaignPhase::PreCampaign)
            .unwrap();
        let post = CampaignReconciler
            .reconcile(Vec::<&str>::new(), roster, CampaignPhase::PostCampaign)
            .unwrap();

        for s in pre.roster.iter().chain(post.roster.iter()) {
            assert_ne!(s.status_pre, StoreStatus::Inactive);
            assert_ne!(s.status_post, Some(StoreStatus::Inactive));
        }
        assert_eq!(pre.counts.deactivated_count, 0);
    }

    #[test]
    fn test_post_counts_untouched_stores_as_deactivated() {
        // 尚未处理活动后阶段的门店计入停用
        let roster = vec![store("1", "Loja A")];
        let counts = CampaignReconciler::count_statuses(&roster, CampaignPhase::PostCampaign);

        assert_eq!(counts.activated_count, 0);
        assert_eq!(counts.verify_count, 0);
        assert_eq!(counts.deactivated_count, 1);
    }

    #[test]
    fn test_duplicate_store_id_rejected() {
        let roster = vec![store("1", "Loja A"), store("1", "Loja B")];

        let result = CampaignReconciler.reconcile(["Loja A"], roster, CampaignPhase::PreCampaign);

        assert_eq!(
            result.unwrap_err(),
            ReconciliationError::DuplicateStoreId("1".to_string())
        );
    }

    #[test]
    fn test_set_status_targets_explicit_phase() {
        let mut roster = vec![store("1", "Loja A"), store("2", "Loja B")];
        let at = Utc::now();

        let updated = CampaignReconciler
            .set_status(
                &mut roster,
                "2",
                StoreStatus::Inactive,
                CampaignPhase::PostCampaign,
                Some("fechada".to_string()),
                "revisor",
                at,
            )
            .unwrap();

        assert_eq!(updated.status_post, Some(StoreStatus::Inactive));
        assert_eq!(updated.status_pre, StoreStatus::New);
        assert_eq!(updated.verified_by.as_deref(), Some("revisor"));
        assert_eq!(updated.verified_at, Some(at));
        assert_eq!(roster[1].notes.as_deref(), Some("fechada"));
    }

    #[test]
    fn test_set_status_rejects_verify() {
        let mut roster = vec![store("1", "Loja A")];

        let result = CampaignReconciler.set_status(
            &mut roster,
            "1",
            StoreStatus::Verify,
            CampaignPhase::PreCampaign,
            None,
            "revisor",
            Utc::now(),
        );

        assert_eq!(
            result.unwrap_err(),
            ReconciliationError::InvalidOverrideStatus(StoreStatus::Verify)
        );
    }

    #[test]
    fn test_set_status_unknown_store() {
        let mut roster = vec![store("1", "Loja A")];

        let result = CampaignReconciler.set_status(
            &mut roster,
            "9",
            StoreStatus::Active,
            CampaignPhase::PreCampaign,
            None,
            "revisor",
            Utc::now(),
        );

        assert!(matches!(result, Err(ReconciliationError::StoreNotFound(_))));
    }

    #[test]
    fn test_pending_review() {
        let mut a = store("1", "Loja A");
        a.status_pre = StoreStatus::Verify;
        let b = store("2", "Loja B");

        let pending = CampaignReconciler::pending_review(&[a, b]);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "1");
    }
}
