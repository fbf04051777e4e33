//! logx - 日志分发核心
//!
//! ## 模块
//!
//! - **cfg**: `{type, options}` 类型选项与按名称构造 trait object 的注册表
//! - **log**: 级别、事件、hook 组合、adapter 实例与分发
//!
//! ## 设计理念
//!
//! - **组合优于继承**: adapter 类型由有序的 hook 链组合而成，组合在类型定义时完成
//! - **故障隔离**: 每个 adapter 独占 sink 与互斥锁，写入失败只影响自身
//! - **同步**: 所有操作都是同步的，唯一的阻塞点是 adapter 的锁和 sink 的 I/O

pub mod cfg;
pub mod log;

// 重新导出主要的公共 API
pub use cfg::{create_trait_from_type_options, register_trait, TypeOptions};

pub use log::{
    AdapterOptions, AdapterTypeBuilder, ErrorPolicy, Level, LogAdapter, LogError, LogEvent,
    LogFormatter, LogResult, Logger, LoggerConfig, Message, MetadataValue,
};
