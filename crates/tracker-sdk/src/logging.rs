//! 日志初始化
//!
//! 安装 `tracing_subscriber::fmt` 订阅器，并通过 `tracing-log` 把 `log` 记录桥接过来。
//! 过滤规则优先读取 `RUST_LOG`，未设置或无效时使用默认规则。

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// 默认过滤规则
pub const DEFAULT_DIRECTIVES: &str = "tracker_driver=info,tracker_sdk=info";

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid filter directives: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Global subscriber already set: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Global logger already set: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// 使用默认规则初始化日志（重复调用无副作用）
pub fn init() {
    let _ = try_init(DEFAULT_DIRECTIVES);
}

/// 使用指定的默认规则初始化日志
///
/// `RUST_LOG` 可解析时优先生效。
pub fn try_init(default_directives: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives)?,
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}
