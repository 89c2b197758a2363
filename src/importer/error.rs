// ==========================================
// 门店活动导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 解析错误立即中止；校验错误阻止进入对账；警告不阻断
// ==========================================

use crate::domain::import::ValidationOutcome;
use crate::engine::reconciler::ReconciliationError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Formato de arquivo não suportado: {0} (apenas .csv/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("Falha ao ler arquivo: {0}")]
    FileReadError(String),

    #[error("Falha ao decodificar arquivo: {0}")]
    DecodeError(String),

    #[error("Falha ao processar planilha: {0}")]
    ExcelParseError(String),

    #[error("Falha ao processar CSV: {0}")]
    CsvParseError(String),

    #[error("Planilha sem abas")]
    NoWorksheet,

    #[error("Arquivo deve ter pelo menos 2 linhas (cabeçalho + dados), encontradas {found}")]
    InsufficientRows { found: usize },

    // ===== 校验错误 =====
    #[error("Validação falhou: {}", .0.errors.first().map(String::as_str).unwrap_or(""))]
    ValidationFailed(ValidationOutcome),

    #[error("Nome da campanha é obrigatório")]
    MissingCampaignName,

    // ===== 对账错误 =====
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    // ===== 仓储 / 配置错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Falha ao ler configuração (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否属于文件解析阶段的错误
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::DecodeError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::NoWorksheet
                | ImportError::InsufficientRows { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
