use crate::log::hook::{Arity, HookKind};
use thiserror::Error;

/// 日志核心统一错误类型
#[derive(Error, Debug)]
pub enum LogError {
    /// 无法解析的日志级别（名称、整数或配置值）
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// Hook 组合时参数个数与已组合的 hook 不一致
    #[error(
        "arity mismatch on {kind} hook of adapter type '{adapter_type}': expected {expected}, got {actual}"
    )]
    ArityMismatch {
        adapter_type: String,
        kind: HookKind,
        expected: Arity,
        actual: Arity,
    },

    /// Adapter 配置无效（setup! 阶段抛出）
    #[error("config error: {0}")]
    Config(String),

    /// 输出目标写入失败
    #[error("sink write error: {0}")]
    SinkWrite(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 格式化失败
    #[error("format error: {0}")]
    Format(String),

    /// Adapter 已关闭，不再接受写入
    #[error("adapter '{0}' is closed")]
    Closed(String),

    /// 在 adapter 自身的 hook 链中再次进入同一个 adapter
    #[error("adapter '{0}' re-entered from its own hook chain")]
    Reentrant(String),

    #[error("adapter '{0}' lock poisoned")]
    LockPoisoned(String),

    /// 一次分发中一个或多个 adapter 写入失败
    #[error("{} adapter(s) failed: {}", .0.len(), describe_failures(.0))]
    Dispatch(Vec<AdapterFailure>),
}

/// 单个 adapter 的失败记录
#[derive(Debug)]
pub struct AdapterFailure {
    /// adapter 实例名称
    pub adapter: String,
    /// adapter 返回的原始错误
    pub error: LogError,
}

impl std::fmt::Display for AdapterFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.adapter, self.error)
    }
}

fn describe_failures(failures: &[AdapterFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl LogError {
    /// 构造配置错误
    pub fn config(message: impl std::fmt::Display) -> Self {
        LogError::Config(message.to_string())
    }

    /// 构造写入错误
    pub fn sink(message: impl std::fmt::Display) -> Self {
        LogError::SinkWrite(message.to_string())
    }
}

impl From<garde::Report> for LogError {
    fn from(report: garde::Report) -> Self {
        LogError::Config(report.to_string())
    }
}

/// 日志核心操作的返回类型
pub type LogResult<T> = Result<T, LogError>;
