//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能。
//!
//! # 特性
//!
//! - 结构化日志：支持键值对
//! - 灵活输出：支持控制台和文件输出（按天滚动）
//! - 日志级别：trace, debug, info, warn, error
//!
//! 声明生命周期的状态转换记录在 `debug` 级别，契约违例（例如在
//! `create` 之前调用 `bind`）记录在 `error` 级别，目标为
//! `vertex_decl::engine`。
//!
//! # 使用示例
//!
//! ```no_run
//! use vertex_decl::core::config::LogLevel;
//! use vertex_decl::core::log;
//!
//! log::init_logger(LogLevel::Info, false, None)?;
//! vertex_decl::engine_info!(backend = "Vulkan", "device ready");
//! # Ok::<(), vertex_decl::core::RenderError>(())
//! ```

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use std::path::Path;

use super::config::{LogLevel, LoggingConfig};
use super::error::{RenderError, Result};

const DEFAULT_LOG_FILE: &str = "vertex_decl.log";

/// 初始化日志系统
///
/// 在程序开始时调用一次，重复调用返回 `RenderError::Log`。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否输出到文件
/// * `log_file_path` - 日志文件路径（可选，默认为 "vertex_decl.log"）
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) -> Result<()> {
    let filter = EnvFilter::new(level_directive(level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(true);

    if file_output {
        // 解析日志文件路径
        let log_path = log_file_path.unwrap_or(DEFAULT_LOG_FILE);
        let path = Path::new(log_path);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(filename)
            .build(directory)
            .map_err(|e| RenderError::Log(e.to_string()))?;

        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false) // 文件不需要 ANSI 颜色
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| RenderError::Log(e.to_string()))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| RenderError::Log(e.to_string()))
    }
}

/// 按配置初始化日志系统
pub fn init_from_config(config: &LoggingConfig) -> Result<()> {
    init_logger(config.level, config.file_output, Some(&config.log_file))
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

/// 引擎核心日志 - Info 级别
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "vertex_decl::engine", $($arg)*)
    };
}

/// 引擎核心日志 - Warn 级别
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "vertex_decl::engine", $($arg)*)
    };
}

/// 引擎核心日志 - Error 级别
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "vertex_decl::engine", $($arg)*)
    };
}

/// 日志级别转换
impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(level_directive(LogLevel::Warn), "warn");
    }

    #[test]
    fn test_second_init_is_rejected() {
        // 测试进程中只有这里安装全局订阅者
        let first = init_logger(LogLevel::Debug, false, None);
        assert!(first.is_ok());

        let second = init_logger(LogLevel::Info, false, None);
        assert!(matches!(second, Err(RenderError::Log(_))));
    }
}
