use chrono::NaiveDateTime;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // a second call (tests, scheduler restarts) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 通用 Option<T> 格式化为 String（ToString 实现类型）
pub fn fmt_opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "null".to_string())
}

/// Option<NaiveDateTime> 格式化为 YYYY-MM-DD HH:MM:SS
pub fn fmt_naive_datetime(v: &Option<NaiveDateTime>) -> String {
    v.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "null".to_string())
}

/// Join a list of symbols for a single log field, `-` when empty.
pub fn fmt_list<T: AsRef<str>>(items: &[T]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// 简洁日志输出宏（支持多字段）
#[macro_export]
macro_rules! trace_kv {
    ($level:ident, $( $label:expr => $value:expr ),+ $(,)?) => {
        tracing::$level!(
            "{}",
            vec![$(format!("{}: {}", $label, $value)),+].join(", ")
        );
    };
}
