// ==========================================
// 门店活动导入系统 - 门店领域模型
// ==========================================
// 职责: 活动门店名册的单条记录
// 用途: 对账引擎与人工复核写入，仓储层持久化
// 红线: 核心层不删除门店（删除属于外部职责）
// ==========================================

use crate::domain::types::{CampaignPhase, StoreStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// StoreRecord - 活动门店
// ==========================================
// 对齐: store 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    // ===== 主键 =====
    pub id: String,

    // ===== 基础信息 =====
    pub name: String,
    pub address: String,
    pub region: String,
    pub banner: String,
    pub store_code: String,

    // ===== 活动状态 =====
    pub status_pre: StoreStatus,          // 活动前状态
    pub status_post: Option<StoreStatus>, // 活动后状态（未处理为 None）
    pub participated: bool,               // 是否参与活动
    pub deactivation_reason: Option<String>,

    // ===== 人工复核 =====
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub notes: Option<String>,
}

impl StoreRecord {
    /// 新建门店（活动前状态为 New，活动后未处理）
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            region: String::new(),
            banner: String::new(),
            store_code: String::new(),
            status_pre: StoreStatus::New,
            status_post: None,
            participated: false,
            deactivation_reason: None,
            verified_at: None,
            verified_by: None,
            notes: None,
        }
    }

    /// 指定阶段的状态
    pub fn status_for(&self, phase: CampaignPhase) -> Option<StoreStatus> {
        match phase {
            CampaignPhase::PreCampaign => Some(self.status_pre),
            CampaignPhase::PostCampaign => self.status_post,
        }
    }

    /// 任一阶段处于待复核
    pub fn needs_review(&self) -> bool {
        self.status_pre == StoreStatus::Verify || self.status_post == Some(StoreStatus::Verify)
    }
}
