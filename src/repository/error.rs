// ==========================================
// 门店活动导入系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("Registro não encontrado: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("Falha ao obter lock da conexão: {0}")]
    LockError(String),

    #[error("Falha na transação: {0}")]
    DatabaseTransactionError(String),

    #[error("Falha na consulta: {0}")]
    DatabaseQueryError(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // ===== 数据质量错误（库中存储的值无法还原为领域类型）=====
    #[error("Valor inválido em {field}: {message}")]
    FieldValueError { field: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg)
                if matches!(
                    code.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                ) =>
            {
                RepositoryError::UniqueConstraintViolation(
                    msg.clone().unwrap_or_else(|| err.to_string()),
                )
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
