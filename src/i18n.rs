// ==========================================
// 门店活动导入系统 - 消息国际化
// ==========================================
// 工具: rust-i18n（locales/*.yml，宏在 lib.rs 中初始化）
// 语言: pt-BR（回退语言）/ en
// 红线: 校验与对账消息一律走翻译键，不在代码里写死文案
// 默认: 首次取译文前切到 pt-BR（rust-i18n 自身默认为 en）
// ==========================================

use std::sync::Once;

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["pt-BR", "en"];

/// 默认语言（落库的停用原因以此为准）
pub const DEFAULT_LOCALE: &str = "pt-BR";

static DEFAULT_LOCALE_INIT: Once = Once::new();

/// 进程内首次使用时设置默认语言；之后的 set_locale 不会被覆盖
fn ensure_default_locale() {
    DEFAULT_LOCALE_INIT.call_once(|| rust_i18n::set_locale(DEFAULT_LOCALE));
}

pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 当前语言
pub fn current_locale() -> String {
    ensure_default_locale();
    rust_i18n::locale().to_string()
}

/// 切换语言；不支持的语言保持当前设置并返回 false
pub fn set_locale(locale: &str) -> bool {
    if !is_supported(locale) {
        tracing::warn!(locale = %locale, "语言不受支持，保持当前语言");
        return false;
    }
    ensure_default_locale();
    rust_i18n::set_locale(locale);
    true
}

/// 按键取译文
///
/// ```no_run
/// use campaign_etl::i18n::t;
/// let reason = t("reconcile.reason_missing_pre");
/// ```
pub fn t(key: &str) -> String {
    ensure_default_locale();
    rust_i18n::t!(key).to_string()
}

/// 按键取译文并替换 `%{name}` 占位符
///
/// ```no_run
/// use campaign_etl::i18n::t_with_args;
/// let msg = t_with_args("validation.store_name_required", &[("line", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    ensure_default_locale();
    args.iter()
        .fold(rust_i18n::t!(key).to_string(), |text, (name, value)| {
            text.replace(&format!("%{{{}}}", name), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 是进程级全局状态，本模块的测试串行执行，结束时切回 pt-BR
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_switch_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert!(set_locale("en"));
        assert_eq!(current_locale(), "en");

        assert!(!set_locale("fr"));
        assert_eq!(current_locale(), "en");

        assert!(set_locale("pt-BR"));
        assert_eq!(current_locale(), "pt-BR");
    }

    #[test]
    fn test_reconcile_reasons_translated() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        assert_eq!(t("reconcile.reason_missing_pre"), "Loja não estava no CSV pré-campanha");

        set_locale("en");
        assert_eq!(t("reconcile.reason_missing_post"), "store did not participate in the campaign");

        set_locale("pt-BR");
    }

    #[test]
    fn test_placeholders_replaced() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        let msg = t_with_args("validation.min_mapped_fields", &[("min", "2")]);
        assert!(msg.contains("Pelo menos 2"));
        assert!(!msg.contains("%{"));

        set_locale("en");
        let msg = t_with_args("validation.store_name_required", &[("line", "7")]);
        assert_eq!(msg, "Line 7: store name is required");

        set_locale("pt-BR");
    }

    #[test]
    fn test_explicit_locale_survives_default_init() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("reconcile.reason_missing_post"), "store did not participate in the campaign");
        assert_eq!(current_locale(), "en");

        set_locale(DEFAULT_LOCALE);
    }
}
