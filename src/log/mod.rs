//! 日志模块
//!
//! 按级别过滤日志事件，并分发给一个或多个 adapter。adapter 类型由
//! setup / open / write / close 四种 hook 链组合而成，每个实例独占自己的 sink 和互斥锁。
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use logx::log::{Logger, LoggerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config: LoggerConfig = json5::from_str(r#"
//!         {
//!             name: "app",
//!             level: "info",
//!             adapters: [
//!                 { type: "StreamAdapter", options: { target: "stderr" } },
//!                 {
//!                     type: "BufferedFileAdapter",
//!                     options: {
//!                         level: "warn",
//!                         file_path: "logs/app.log",
//!                         buffer_size: 16,
//!                         formatter: { type: "JsonFormatter" },
//!                     },
//!                 },
//!             ],
//!         }
//!     "#)?;
//!
//!     let logger = Logger::from_config(config)?;
//!     logger.info("Application started")?;
//!     logx::warn!(logger, "slow query", "duration_ms" => 1500i64)?;
//!     logger.close()?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod error;
pub mod event;
pub mod formatter;
pub mod global_logger_manager;
pub mod hook;
pub mod level;
pub mod logger;
pub mod logger_manager;
pub mod macros;

pub use adapter::{
    create_adapter, create_adapter_from_options, register_adapter_type, register_adapters,
    registered_adapter_types, Adapter, AdapterOptions, AdapterState, AdapterType,
    AdapterTypeBuilder, BufferLayer, FormatLayer, Inspection, Layer, LineState, Lines, LogAdapter,
    OpenMode,
};
pub use error::{AdapterFailure, LogError, LogResult};
pub use event::{LogEvent, Message, MetadataValue};
pub use formatter::{
    create_formatter_from_options, register_formatters, JsonFormatter, JsonFormatterConfig,
    LogFormatter, TextFormatter, TextFormatterConfig,
};
pub use hook::{Arity, Hook, HookChain, HookKind, HookRegistry};
pub use level::{IntoLevel, Level, SEVERITIES};
pub use logger::{ErrorPolicy, Logger, LoggerConfig};
pub use logger_manager::{default_logger_config, LoggerManager, LoggerManagerConfig};

pub use global_logger_manager::{
    add, contains, debug, error, fatal, get, get_default, get_or_default, global_logger_manager,
    info, init, keys, logm, remove, set_default, warn, write,
};
