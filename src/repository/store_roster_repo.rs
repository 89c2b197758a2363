// ==========================================
// 门店活动导入系统 - 门店名册仓储
// ==========================================
// 职责: store 表的读写；整份名册在单个事务内保存
// 红线: Repository 不含业务逻辑；不删除门店
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::store::StoreRecord;
use crate::domain::types::StoreStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// StoreRosterRepository Trait
// ==========================================
// 实现者: StoreRosterRepositoryImpl（rusqlite）
#[async_trait]
pub trait StoreRosterRepository: Send + Sync {
    /// 读取整份名册（按 id 排序）
    async fn load_roster(&self) -> RepositoryResult<Vec<StoreRecord>>;

    /// 保存整份名册（事务化 UPSERT）
    ///
    /// # 返回
    /// - Ok(usize): 写入的门店数
    /// - Err: 数据库错误（整个事务回滚）
    async fn save_roster(&self, roster: &[StoreRecord]) -> RepositoryResult<usize>;

    async fn find_by_id(&self, store_id: &str) -> RepositoryResult<Option<StoreRecord>>;

    async fn insert_store(&self, store: &StoreRecord) -> RepositoryResult<()>;

    /// 更新单个门店（不存在时返回 NotFound）
    async fn update_store(&self, store: &StoreRecord) -> RepositoryResult<()>;
}

// ==========================================
// StoreRosterRepositoryImpl
// ==========================================
pub struct StoreRosterRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, address, region, banner, store_code,
           status_pre, status_post, participated, deactivation_reason,
           verified_at, verified_by, notes
    FROM store
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO store (
        id, name, address, region, banner, store_code,
        status_pre, status_post, participated, deactivation_reason,
        verified_at, verified_by, notes, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, datetime('now'))
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        address = excluded.address,
        region = excluded.region,
        banner = excluded.banner,
        store_code = excluded.store_code,
        status_pre = excluded.status_pre,
        status_post = excluded.status_post,
        participated = excluded.participated,
        deactivation_reason = excluded.deactivation_reason,
        verified_at = excluded.verified_at,
        verified_by = excluded.verified_by,
        notes = excluded.notes,
        updated_at = excluded.updated_at
"#;

impl StoreRosterRepositoryImpl {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawStoreRow> {
        Ok(RawStoreRow {
            id: row.get(0)?,
            name: row.get(1)?,
            address: row.get(2)?,
            region: row.get(3)?,
            banner: row.get(4)?,
            store_code: row.get(5)?,
            status_pre: row.get(6)?,
            status_post: row.get(7)?,
            participated: row.get(8)?,
            deactivation_reason: row.get(9)?,
            verified_at: row.get(10)?,
            verified_by: row.get(11)?,
            notes: row.get(12)?,
        })
    }

    fn write_store(conn: &Connection, store: &StoreRecord) -> RepositoryResult<()> {
        conn.execute(
            UPSERT_SQL,
            params![
                store.id,
                store.name,
                store.address,
                store.region,
                store.banner,
                store.store_code,
                store.status_pre.as_str(),
                store.status_post.map(|s| s.as_str()),
                store.participated,
                store.deactivation_reason,
                store.verified_at,
                store.verified_by,
                store.notes,
            ],
        )?;
        Ok(())
    }
}

// 数据库原始行（状态以文本存储）
struct RawStoreRow {
    id: String,
    name: String,
    address: String,
    region: String,
    banner: String,
    store_code: String,
    status_pre: String,
    status_post: Option<String>,
    participated: bool,
    deactivation_reason: Option<String>,
    verified_at: Option<chrono::DateTime<chrono::Utc>>,
    verified_by: Option<String>,
    notes: Option<String>,
}

impl RawStoreRow {
    fn into_record(self) -> RepositoryResult<StoreRecord> {
        let status_pre = parse_status("status_pre", &self.status_pre)?;
        let status_post = match self.status_post {
            Some(raw) => Some(parse_status("status_post", &raw)?),
            None => None,
        };

        Ok(StoreRecord {
            id: self.id,
            name: self.name,
            address: self.address,
            region: self.region,
            banner: self.banner,
            store_code: self.store_code,
            status_pre,
            status_post,
            participated: self.participated,
            deactivation_reason: self.deactivation_reason,
            verified_at: self.verified_at,
            verified_by: self.verified_by,
            notes: self.notes,
        })
    }
}

fn parse_status(field: &str, raw: &str) -> RepositoryResult<StoreStatus> {
    StoreStatus::from_str(raw).map_err(|message| RepositoryError::FieldValueError {
        field: field.to_string(),
        message,
    })
}

#[async_trait]
impl StoreRosterRepository for StoreRosterRepositoryImpl {
    async fn load_roster(&self) -> RepositoryResult<Vec<StoreRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawStoreRow::into_record).collect()
    }

    async fn save_roster(&self, roster: &[StoreRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for store in roster {
            Self::write_store(&tx, store)?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn find_by_id(&self, store_id: &str) -> RepositoryResult<Option<StoreRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![store_id],
                Self::map_row,
            )
            .optional()?;

        raw.map(RawStoreRow::into_record).transpose()
    }

    async fn insert_store(&self, store: &StoreRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let exists: Option<i64> = conn
            .query_row("SELECT 1 FROM store WHERE id = ?1", params![store.id], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_some() {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "store.id={}",
                store.id
            )));
        }

        Self::write_store(&conn, store)
    }

    async fn update_store(&self, store: &StoreRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let exists: Option<i64> = conn
            .query_row("SELECT 1 FROM store WHERE id = ?1", params![store.id], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "store".to_string(),
                id: store.id.clone(),
            });
        }

        Self::write_store(&conn, store)
    }
}
