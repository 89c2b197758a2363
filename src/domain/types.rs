// ==========================================
// 门店活动导入系统 - 领域类型定义
// ==========================================
// 职责: 活动阶段 / 门店状态 / 导入结果 / 标准字段 / 文件格式
// 序列化格式: 与数据库存储值一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 活动阶段 (Campaign Phase)
// ==========================================
// 红线: 人工复核必须显式传入阶段，不从界面状态推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CampaignPhase {
    PreCampaign,  // 活动前
    PostCampaign, // 活动后
}

impl CampaignPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignPhase::PreCampaign => "pre-campaign",
            CampaignPhase::PostCampaign => "post-campaign",
        }
    }
}

impl fmt::Display for CampaignPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pre" | "pre-campaign" | "pre-campanha" => Ok(CampaignPhase::PreCampaign),
            "post" | "pos" | "post-campaign" | "pos-campanha" => Ok(CampaignPhase::PostCampaign),
            other => Err(format!("fase desconhecida: {}", other)),
        }
    }
}

// ==========================================
// 门店状态 (Store Status)
// ==========================================
// 说明: 自动对账只产生 Active / Verify；Inactive 仅由人工复核写入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Active,   // 已激活
    Inactive, // 已停用（人工）
    Verify,   // 待复核
    New,      // 新门店
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Active => "active",
            StoreStatus::Inactive => "inactive",
            StoreStatus::Verify => "verify",
            StoreStatus::New => "new",
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativa" => Ok(StoreStatus::Active),
            "inactive" | "inativa" => Ok(StoreStatus::Inactive),
            "verify" | "verificar" => Ok(StoreStatus::Verify),
            "new" | "nova" => Ok(StoreStatus::New),
            other => Err(format!("status desconhecido: {}", other)),
        }
    }
}

// ==========================================
// 导入结果状态 (Import Outcome)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    Completed,
    Processing,
    Failed,
}

impl ImportOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportOutcome::Completed => "completed",
            ImportOutcome::Processing => "processing",
            ImportOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "completed" => Ok(ImportOutcome::Completed),
            "processing" => Ok(ImportOutcome::Processing),
            "failed" => Ok(ImportOutcome::Failed),
            other => Err(format!("resultado desconhecido: {}", other)),
        }
    }
}

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 顺序即自动识别的迭代顺序（同一表头冲突时靠前字段优先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    StoreName,
    Address,
    Region,
    Banner,
    Active,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::StoreName,
        CanonicalField::Address,
        CanonicalField::Region,
        CanonicalField::Banner,
        CanonicalField::Active,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::StoreName => "store_name",
            CanonicalField::Address => "address",
            CanonicalField::Region => "region",
            CanonicalField::Banner => "banner",
            CanonicalField::Active => "active",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 文件格式 (File Format)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// 根据扩展名（不区分大小写，可带前导点）判断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            _ => None,
        }
    }

    /// 根据文件名判断格式
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, FileFormat::Xlsx | FileFormat::Xls)
    }
}
