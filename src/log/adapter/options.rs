use crate::log::error::{LogError, LogResult};
use crate::log::level::Level;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Adapter 构造配置
///
/// 核心只识别 `level` 与 `name` 两个键，其余键原样交给 adapter 的 setup! 链。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterOptions {
    values: Map<String, Value>,
}

impl AdapterOptions {
    pub const LEVEL: &'static str = "level";
    pub const NAME: &'static str = "name";

    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 值创建，`null` 视为空配置
    pub fn from_value(value: Value) -> LogResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(LogError::config(format!(
                "adapter options must be an object, got {}",
                other
            ))),
        }
    }

    /// 设置一个配置项
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 设置最低级别
    pub fn with_level(self, level: Level) -> Self {
        self.with(Self::LEVEL, level.as_str())
    }

    /// 最低级别，未配置时为 `ALL`
    pub fn level(&self) -> LogResult<Level> {
        match self.values.get(Self::LEVEL) {
            None | Some(Value::Null) => Ok(Level::All),
            Some(value) => Level::parse(value),
        }
    }

    /// 实例名称
    pub fn name(&self) -> Option<&str> {
        self.values.get(Self::NAME).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 读取并反序列化单个配置项
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> LogResult<Option<T>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| LogError::config(format!("option '{}': {}", key, e))),
        }
    }

    /// 将整个配置反序列化为 adapter 自己的配置结构，未知键被忽略
    pub fn parse<T: DeserializeOwned>(&self) -> LogResult<T> {
        serde_json::from_value(Value::Object(self.values.clone())).map_err(LogError::config)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl TryFrom<Value> for AdapterOptions {
    type Error = LogError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        AdapterOptions::from_value(value)
    }
}
