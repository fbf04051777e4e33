//! 日志宏
//!
//! 自动捕获文件、行号和模块路径
//!
//! # 示例
//!
//! ```ignore
//! use logx::{info, warn};
//!
//! info!(logger, "application started")?;
//! warn!(logger, "slow query", "duration_ms" => 1500i64, "table" => "users")?;
//! ```

/// 按任意级别记录日志，级别可以是 Level、名称或整数
///
/// ```ignore
/// log_at!(logger, "warn", "disk almost full");
/// log_at!(logger, Level::Error, "query failed", "error_code" => "CONN001");
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $msg:expr) => {
        $logger.write_with($level, $msg, |event| {
            event
                .with_location(file!(), line!())
                .with_module(module_path!())
        })
    };
    ($logger:expr, $level:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $logger.write_with($level, $msg, |event| {
            event
                .with_location(file!(), line!())
                .with_module(module_path!())
                $(.with_metadata($key, $value))+
        })
    };
}

/// 记录 DEBUG 级别日志
#[macro_export]
macro_rules! debug {
    ($logger:expr, $msg:expr) => {
        $crate::log_at!($logger, $crate::log::Level::Debug, $msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::log::Level::Debug, $msg, $($key => $value),+)
    };
}

/// 记录 INFO 级别日志
///
/// ```ignore
/// info!(logger, "user logged in");
/// info!(logger, "user action", "user_id" => 12345i64, "action" => "login");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $msg:expr) => {
        $crate::log_at!($logger, $crate::log::Level::Info, $msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::log::Level::Info, $msg, $($key => $value),+)
    };
}

/// 记录 WARN 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $msg:expr) => {
        $crate::log_at!($logger, $crate::log::Level::Warn, $msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::log::Level::Warn, $msg, $($key => $value),+)
    };
}

/// 记录 ERROR 级别日志
#[macro_export]
macro_rules! error {
    ($logger:expr, $msg:expr) => {
        $crate::log_at!($logger, $crate::log::Level::Error, $msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::log::Level::Error, $msg, $($key => $value),+)
    };
}

/// 记录 FATAL 级别日志
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $msg:expr) => {
        $crate::log_at!($logger, $crate::log::Level::Fatal, $msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::log::Level::Fatal, $msg, $($key => $value),+)
    };
}
