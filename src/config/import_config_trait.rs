// ==========================================
// 门店活动导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 校验所需的最少映射字段数
    ///
    /// # 默认值
    /// - 2
    async fn get_min_mapped_fields(&self) -> ConfigResult<usize>;

    /// 未指定操作人时使用的默认值
    ///
    /// # 默认值
    /// - "system"
    async fn get_default_actor(&self) -> ConfigResult<String>;

    /// 消息语言
    ///
    /// # 默认值
    /// - "pt-BR"
    async fn get_locale(&self) -> ConfigResult<String>;

    /// 导入历史默认条数
    ///
    /// # 默认值
    /// - 20
    async fn get_history_limit(&self) -> ConfigResult<usize>;
}
