// ==========================================
// 门店活动导入系统 - API层错误类型
// ==========================================
// 职责: 把导入层/仓储层错误转换为可展示的错误消息
// ==========================================

use crate::engine::reconciler::ReconciliationError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::Serialize;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Recurso não encontrado: {0}")]
    NotFound(String),

    #[error("Regra de negócio violada: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("Falha na importação: {0}")]
    ImportError(String),

    /// 校验失败（附带全部错误与警告，供界面一并展示）
    #[error("Validação falhou: {message}")]
    ValidationError {
        message: String,
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error("Falha ao conectar ao banco de dados: {0}")]
    DatabaseConnectionError(String),

    #[error("Falha na transação: {0}")]
    DatabaseTransactionError(String),

    #[error("Erro de configuração: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 供 CLI 输出的 JSON 错误体
    pub fn to_payload(&self) -> ErrorPayload {
        let (kind, errors, warnings) = match self {
            ApiError::InvalidInput(_) => ("invalid_input", vec![], vec![]),
            ApiError::NotFound(_) => ("not_found", vec![], vec![]),
            ApiError::BusinessRuleViolation(_) => ("business_rule", vec![], vec![]),
            ApiError::ImportError(_) => ("import", vec![], vec![]),
            ApiError::ValidationError {
                errors, warnings, ..
            } => ("validation", errors.clone(), warnings.clone()),
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => ("database", vec![], vec![]),
            ApiError::ConfigError(_) => ("config", vec![], vec![]),
            ApiError::InternalError(_) | ApiError::Other(_) => ("internal", vec![], vec![]),
        };

        ErrorPayload {
            kind,
            message: self.to_string(),
            errors,
            warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("registro duplicado: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("campo {}: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::ValidationFailed(outcome) => ApiError::ValidationError {
                message: outcome.errors.first().cloned().unwrap_or_default(),
                errors: outcome.errors,
                warnings: outcome.warnings,
            },
            ImportError::MissingCampaignName => ApiError::InvalidInput(err.to_string()),
            ImportError::Reconciliation(ReconciliationError::StoreNotFound(id)) => {
                ApiError::NotFound(format!("store(id={})", id))
            }
            ImportError::Reconciliation(inner) => ApiError::BusinessRuleViolation(inner.to_string()),
            ImportError::Repository(inner) => ApiError::from(inner),
            ImportError::ConfigReadError { .. } => ApiError::ConfigError(err.to_string()),
            ImportError::Other(inner) => ApiError::Other(inner),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
