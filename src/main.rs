// ==========================================
// 门店活动导入系统 - 命令行入口
// ==========================================
// 用法:
//   campaign-etl import <arquivo> <pre|post> <campanha> [ator]
//   campaign-etl preview <arquivo>
//   campaign-etl review <store_id> <pre|post> <active|inactive> [notas]
//   campaign-etl history [limite]
//   campaign-etl pending
//   campaign-etl roster
//   campaign-etl add-store <id> <nome> [regional] [bandeira]
//   campaign-etl template <saida.csv>
//   campaign-etl config [chave] [valor]
//
// 数据库: 环境变量 CAMPAIGN_ETL_DB_PATH，否则用户数据目录
// 输出: stdout 为 JSON；失败时 stderr 输出错误 JSON，退出码非零
// ==========================================

use campaign_etl::api::{ApiError, ApiResult, CampaignApi};
use campaign_etl::db::default_db_path;
use campaign_etl::domain::StoreRecord;
use campaign_etl::logging;
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;

const USAGE: &str = "uso: campaign-etl <import|preview|review|history|pending|roster|add-store|template|config> [args...]";

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var("CAMPAIGN_ETL_LOG_JSON").is_ok() {
        logging::init_json();
    } else {
        logging::init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let db_path = default_db_path();
    tracing::debug!(db_path = %db_path, command = %command, "启动");

    match run(&db_path, command, rest).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let payload = serde_json::to_string_pretty(&e.to_payload())
                .unwrap_or_else(|_| e.to_string());
            eprintln!("{}", payload);
            match e {
                ApiError::InvalidInput(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(db_path: &str, command: &str, args: &[String]) -> ApiResult<String> {
    let api = CampaignApi::open(db_path)?;
    api.apply_configured_locale().await?;

    match command {
        "import" => {
            let (file, phase, campaign) = match args {
                [file, phase, campaign, ..] => (file, phase, campaign),
                _ => return Err(usage_error("import <arquivo> <pre|post> <campanha> [ator]")),
            };
            let actor = args.get(3).map(String::as_str);
            to_json(&api.import_path(file, phase, campaign, actor).await?)
        }
        "preview" => {
            let file = args.first().ok_or_else(|| usage_error("preview <arquivo>"))?;
            to_json(&api.preview_path(file).await?)
        }
        "review" => {
            let (store_id, phase, status) = match args {
                [store_id, phase, status, ..] => (store_id, phase, status),
                _ => {
                    return Err(usage_error(
                        "review <store_id> <pre|post> <active|inactive> [notas]",
                    ))
                }
            };
            let notes = args.get(3).cloned();
            to_json(&api.review_store(store_id, phase, status, notes, None).await?)
        }
        "history" => {
            let limit = match args.first() {
                Some(raw) => Some(
                    raw.parse::<usize>()
                        .map_err(|_| ApiError::InvalidInput(format!("limite inválido: {}", raw)))?,
                ),
                None => None,
            };
            to_json(&api.import_history(limit).await?)
        }
        "pending" => to_json(&api.pending_review().await?),
        "roster" => to_json(&api.roster().await?),
        "add-store" => {
            let (id, name) = match args {
                [id, name, ..] => (id, name),
                _ => return Err(usage_error("add-store <id> <nome> [regional] [bandeira]")),
            };
            let mut store = StoreRecord::new(id.as_str(), name.as_str());
            store.region = args.get(2).cloned().unwrap_or_default();
            store.banner = args.get(3).cloned().unwrap_or_default();
            to_json(&api.register_store(store).await?)
        }
        "template" => {
            let out = args.first().ok_or_else(|| usage_error("template <saida.csv>"))?;
            api.write_template(out)?;
            to_json(&json!({ "written": out }))
        }
        "config" => match args {
            [] => api.config_snapshot(),
            [key] => to_json(&json!({ "key": key, "value": api.get_config(key)? })),
            [key, value, ..] => {
                api.set_config(key, value)?;
                to_json(&json!({ "key": key, "value": value }))
            }
        },
        other => Err(ApiError::InvalidInput(format!(
            "comando desconhecido: {} ({})",
            other, USAGE
        ))),
    }
}

fn usage_error(usage: &str) -> ApiError {
    ApiError::InvalidInput(format!("uso: campaign-etl {}", usage))
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::InternalError(e.to_string()))
}
