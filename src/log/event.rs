use crate::log::level::Level;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

type Producer = Box<dyn FnOnce() -> String + Send>;

/// 日志消息：字面量或延迟求值的生成函数
///
/// 延迟消息只有在至少一个 adapter 真正写入事件时才会被求值，且只求值一次。
pub enum Message {
    Literal(String),
    Deferred(Producer),
}

impl Message {
    /// 创建延迟求值的消息
    pub fn deferred<F>(producer: F) -> Self
    where
        F: FnOnce() -> String + Send + 'static,
    {
        Message::Deferred(Box::new(producer))
    }

    fn into_producer(self) -> Producer {
        match self {
            Message::Literal(text) => Box::new(move || text),
            Message::Deferred(producer) => producer,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Message::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Literal(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Literal(text.to_string())
    }
}

impl From<&String> for Message {
    fn from(text: &String) -> Self {
        Message::Literal(text.clone())
    }
}

impl From<fmt::Arguments<'_>> for Message {
    fn from(args: fmt::Arguments<'_>) -> Self {
        Message::Literal(args.to_string())
    }
}

/// 元数据值，支持多种类型
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Null,
    /// 任意 JSON 兼容的数据
    Json(Value),
}

impl MetadataValue {
    /// 从任意实现了 Serialize 的结构体创建
    pub fn from_struct<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => MetadataValue::Json(json),
            Err(_) => MetadataValue::Null,
        }
    }
}

impl Serialize for MetadataValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetadataValue::String(s) => serializer.serialize_str(s),
            MetadataValue::I64(n) => serializer.serialize_i64(*n),
            MetadataValue::U64(n) => serializer.serialize_u64(*n),
            MetadataValue::F64(n) => serializer.serialize_f64(*n),
            MetadataValue::Bool(b) => serializer.serialize_bool(*b),
            MetadataValue::Null => serializer.serialize_none(),
            MetadataValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{}", s),
            MetadataValue::I64(n) => write!(f, "{}", n),
            MetadataValue::U64(n) => write!(f, "{}", n),
            MetadataValue::F64(n) => write!(f, "{}", n),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Null => write!(f, "null"),
            MetadataValue::Json(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::I64(n)
    }
}

impl From<i32> for MetadataValue {
    fn from(n: i32) -> Self {
        MetadataValue::I64(n as i64)
    }
}

impl From<u64> for MetadataValue {
    fn from(n: u64) -> Self {
        MetadataValue::U64(n)
    }
}

impl From<u32> for MetadataValue {
    fn from(n: u32) -> Self {
        MetadataValue::U64(n as u64)
    }
}

impl From<usize> for MetadataValue {
    fn from(n: usize) -> Self {
        MetadataValue::U64(n as u64)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::F64(n)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl From<Value> for MetadataValue {
    fn from(v: Value) -> Self {
        MetadataValue::Json(v)
    }
}

/// 一次日志事件
///
/// 由 Logger 在确认至少一个 adapter 会接受后构造，构造完成后不可变，
/// 以引用的方式传递给每个 adapter 的写入链。
pub struct LogEvent {
    level: Level,
    message: Lazy<String, Producer>,
    timestamp: DateTime<Local>,
    pid: u32,
    thread_id: String,
    logger: Option<String>,
    module: Option<String>,
    file: Option<String>,
    line: Option<u32>,
    metadata: Vec<(String, MetadataValue)>,
}

impl LogEvent {
    /// 创建事件，时间戳在此刻捕获
    pub fn new(level: Level, message: impl Into<Message>) -> Self {
        Self {
            level,
            message: Lazy::new(message.into().into_producer()),
            timestamp: Local::now(),
            pid: std::process::id(),
            thread_id: format!("{:?}", std::thread::current().id()),
            logger: None,
            module: None,
            file: None,
            line: None,
            metadata: Vec::new(),
        }
    }

    /// 设置来源 logger 名称
    pub fn with_logger(mut self, name: impl Into<String>) -> Self {
        self.logger = Some(name.into());
        self
    }

    /// 设置位置信息（文件和行号）
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// 设置模块路径
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// 渲染后的消息，首次访问时求值，之后复用
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// 消息是否已经被求值
    pub fn is_rendered(&self) -> bool {
        Lazy::get(&self.message).is_some()
    }

    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn metadata(&self) -> &[(String, MetadataValue)] {
        &self.metadata
    }
}

impl fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("level", &self.level)
            .field("message", &Lazy::get(&self.message))
            .field("timestamp", &self.timestamp)
            .field("pid", &self.pid)
            .field("thread_id", &self.thread_id)
            .field("logger", &self.logger)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish()
    }
}

impl Serialize for LogEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        use serde_json::Map;

        let mut map = serializer.serialize_map(Some(10))?;
        map.serialize_entry("timestamp", &self.timestamp.to_rfc3339())?;
        map.serialize_entry("level", self.level.as_str())?;
        map.serialize_entry("message", self.message())?;
        map.serialize_entry("pid", &self.pid)?;
        map.serialize_entry("thread_id", &self.thread_id)?;
        map.serialize_entry("logger", &self.logger)?;
        map.serialize_entry("module", &self.module)?;
        map.serialize_entry("file", &self.file)?;
        map.serialize_entry("line", &self.line)?;

        if self.metadata.is_empty() {
            map.serialize_entry("metadata", &None::<&Map<String, Value>>)?;
        } else {
            // Vec 转 Map 以便序列化为 JSON 对象
            let metadata: Map<String, Value> = self
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
                .collect();
            map.serialize_entry("metadata", &metadata)?;
        }

        map.end()
    }
}
