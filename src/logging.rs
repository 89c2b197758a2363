// ==========================================
// 门店活动导入系统 - 日志初始化
// ==========================================
// 工具: tracing + tracing-subscriber（EnvFilter，RUST_LOG 控制级别）
// 输出: stderr；stdout 留给 CLI 的 JSON 结果
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的默认级别
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 文本格式日志
///
/// 例如 `RUST_LOG=campaign_etl=debug` 可查看对账明细。
///
/// ```no_run
/// campaign_etl::logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON 格式日志（含当前 span 字段，如 run_id / phase）
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(true)
        .with_writer(std::io::stderr)
        .init();
}

/// 测试日志（debug 级别，重复调用无副作用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
