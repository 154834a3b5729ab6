//! 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 订阅器：过滤规则取自 `RUST_LOG`，缺省为 `info`。
//! 重复初始化不会 panic，返回 `false` 表示已有全局订阅器。
//!
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读（开发环境）
    #[default]
    Pretty,
    /// JSON 结构化输出（生产环境）
    Json,
}

pub fn init(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
