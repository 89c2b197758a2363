// ==========================================
// 门店活动导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("falha ao obter lock: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("falha ao obter lock: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取正整数配置；格式错误时告警并回退默认值
    fn get_usize_or_default(&self, key: &str, default: usize) -> ConfigResult<usize> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        match value.trim().parse::<usize>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("falha ao obter lock: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 所有 global 配置的快照（JSON）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("falha ao obter lock: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_min_mapped_fields(&self) -> ConfigResult<usize> {
        self.get_usize_or_default(
            config_keys::MIN_MAPPED_FIELDS,
            defaults::MIN_MAPPED_FIELDS,
        )
    }

    async fn get_default_actor(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::DEFAULT_ACTOR, defaults::DEFAULT_ACTOR)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(defaults::DEFAULT_ACTOR.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, defaults::LOCALE)?;
        match value.trim() {
            "pt-BR" | "en" => Ok(value.trim().to_string()),
            other => {
                tracing::warn!(config_key = config_keys::LOCALE, raw_value = %other, "语言不受支持，使用默认值");
                Ok(defaults::LOCALE.to_string())
            }
        }
    }

    async fn get_history_limit(&self) -> ConfigResult<usize> {
        self.get_usize_or_default(config_keys::HISTORY_LIMIT, defaults::HISTORY_LIMIT)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const MIN_MAPPED_FIELDS: &str = "min_mapped_fields";
    pub const DEFAULT_ACTOR: &str = "default_actor";
    pub const LOCALE: &str = "locale";
    pub const HISTORY_LIMIT: &str = "history_limit";
}

// 默认值
pub mod defaults {
    pub const MIN_MAPPED_FIELDS: usize = 2;
    pub const DEFAULT_ACTOR: &str = "system";
    pub const LOCALE: &str = "pt-BR";
    pub const HISTORY_LIMIT: usize = 20;
}
