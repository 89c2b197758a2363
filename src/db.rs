// ==========================================
// 门店活动导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表（幂等）
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CAMPAIGN_ETL_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys 与 busy_timeout 都需要每个连接单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（IF NOT EXISTS，可重复执行）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            region TEXT NOT NULL DEFAULT '',
            banner TEXT NOT NULL DEFAULT '',
            store_code TEXT NOT NULL DEFAULT '',
            status_pre TEXT NOT NULL DEFAULT 'new',
            status_post TEXT,
            participated INTEGER NOT NULL DEFAULT 0,
            deactivation_reason TEXT,
            verified_at TEXT,
            verified_by TEXT,
            notes TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS import_record (
            id TEXT PRIMARY KEY,
            phase TEXT NOT NULL,
            campaign_name TEXT NOT NULL,
            source_filename TEXT NOT NULL,
            imported_at TEXT NOT NULL,
            total_rows_in_file INTEGER NOT NULL DEFAULT 0,
            activated_count INTEGER NOT NULL DEFAULT 0,
            deactivated_count INTEGER NOT NULL DEFAULT 0,
            verify_count INTEGER NOT NULL DEFAULT 0,
            outcome TEXT NOT NULL,
            actor TEXT NOT NULL,
            failure_reason TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_import_record_imported_at
            ON import_record (imported_at DESC);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}

/// 默认数据库路径
///
/// 优先使用环境变量 CAMPAIGN_ETL_DB_PATH；否则放在用户数据目录下
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./campaign_etl.db");

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("campaign-etl");
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join("campaign_etl.db");
        } else {
            tracing::warn!(dir = %app_dir.display(), "无法创建数据目录，回退到当前目录");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('store','import_record','config_kv')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
