// ==========================================
// 门店活动导入系统 - 导入历史仓储
// ==========================================
// 职责: import_record 表（只追加，不修改、不删除）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::ImportRecord;
use crate::domain::types::{CampaignPhase, ImportOutcome};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ImportHistoryRepository Trait
// ==========================================
// 实现者: ImportHistoryRepositoryImpl（rusqlite）
#[async_trait]
pub trait ImportHistoryRepository: Send + Sync {
    /// 追加一条导入记录
    async fn append(&self, record: &ImportRecord) -> RepositoryResult<()>;

    /// 最近的导入记录（imported_at 倒序）
    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportRecord>>;

    async fn find_by_id(&self, record_id: &str) -> RepositoryResult<Option<ImportRecord>>;
}

// ==========================================
// ImportHistoryRepositoryImpl
// ==========================================
pub struct ImportHistoryRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, phase, campaign_name, source_filename, imported_at,
           total_rows_in_file, activated_count, deactivated_count, verify_count,
           outcome, actor, failure_reason
    FROM import_record
"#;

impl ImportHistoryRepositoryImpl {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawImportRow> {
        Ok(RawImportRow {
            id: row.get(0)?,
            phase: row.get(1)?,
            campaign_name: row.get(2)?,
            source_filename: row.get(3)?,
            imported_at: row.get(4)?,
            total_rows_in_file: row.get(5)?,
            activated_count: row.get(6)?,
            deactivated_count: row.get(7)?,
            verify_count: row.get(8)?,
            outcome: row.get(9)?,
            actor: row.get(10)?,
            failure_reason: row.get(11)?,
        })
    }
}

struct RawImportRow {
    id: String,
    phase: String,
    campaign_name: String,
    source_filename: String,
    imported_at: DateTime<Utc>,
    total_rows_in_file: i64,
    activated_count: i64,
    deactivated_count: i64,
    verify_count: i64,
    outcome: String,
    actor: String,
    failure_reason: Option<String>,
}

impl RawImportRow {
    fn into_record(self) -> RepositoryResult<ImportRecord> {
        let phase = CampaignPhase::from_str(&self.phase).map_err(|message| {
            RepositoryError::FieldValueError {
                field: "phase".to_string(),
                message,
            }
        })?;
        let outcome = ImportOutcome::from_str(&self.outcome).map_err(|message| {
            RepositoryError::FieldValueError {
                field: "outcome".to_string(),
                message,
            }
        })?;

        Ok(ImportRecord {
            id: self.id,
            phase,
            campaign_name: self.campaign_name,
            source_filename: self.source_filename,
            imported_at: self.imported_at,
            total_rows_in_file: to_count(self.total_rows_in_file),
            activated_count: to_count(self.activated_count),
            deactivated_count: to_count(self.deactivated_count),
            verify_count: to_count(self.verify_count),
            outcome,
            actor: self.actor,
            failure_reason: self.failure_reason,
        })
    }
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[async_trait]
impl ImportHistoryRepository for ImportHistoryRepositoryImpl {
    async fn append(&self, record: &ImportRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_record (
                id, phase, campaign_name, source_filename, imported_at,
                total_rows_in_file, activated_count, deactivated_count, verify_count,
                outcome, actor, failure_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.id,
                record.phase.as_str(),
                record.campaign_name,
                record.source_filename,
                record.imported_at,
                record.total_rows_in_file as i64,
                record.activated_count as i64,
                record.deactivated_count as i64,
                record.verify_count as i64,
                record.outcome.as_str(),
                record.actor,
                record.failure_reason,
            ],
        )?;
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY imported_at DESC, rowid DESC LIMIT ?1",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![limit as i64], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawImportRow::into_record).collect()
    }

    async fn find_by_id(&self, record_id: &str) -> RepositoryResult<Option<ImportRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![record_id],
                Self::map_row,
            )
            .optional()?;

        raw.map(RawImportRow::into_record).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use chrono::TimeZone;

    fn repo() -> ImportHistoryRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ImportHistoryRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn record(id: &str, day: u32) -> ImportRecord {
        ImportRecord {
            id: id.to_string(),
            phase: CampaignPhase::PostCampaign,
            campaign_name: "Natal".to_string(),
            source_filename: "lojas.csv".to_string(),
            imported_at: Utc.with_ymd_and_hms(2024, 12, day, 10, 0, 0).unwrap(),
            total_rows_in_file: 10,
            activated_count: 7,
            deactivated_count: 1,
            verify_count: 2,
            outcome: ImportOutcome::Completed,
            actor: "admin".to_string(),
            failure_reason: None,
        }
    }

    #[tokio::test]
    async fn test_append_and_find() {
        let repo = repo();
        let rec = record("r1", 1);

        repo.append(&rec).await.unwrap();

        let found = repo.find_by_id("r1").await.unwrap().unwrap();
        assert_eq!(found, rec);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let repo = repo();
        repo.append(&record("r1", 1)).await.unwrap();
        repo.append(&record("r3", 3)).await.unwrap();
        repo.append(&record("r2", 2)).await.unwrap();

        let recent = repo.list_recent(2).await.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "r3");
        assert_eq!(recent[1].id, "r2");
    }

    #[tokio::test]
    async fn test_append_is_not_overwrite() {
        let repo = repo();
        repo.append(&record("r1", 1)).await.unwrap();

        let result = repo.append(&record("r1", 2)).await;

        assert!(matches!(result, Err(RepositoryError::UniqueConstraintViolation(_))));
    }
}
