use crate::log::error::{LogError, LogResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 日志级别
///
/// 按严重程度升序排列，`All` 与 `Off` 是两个哨兵值：
/// `All` 接受所有事件，`Off` 拒绝所有事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// 接受所有事件
    All = -1,
    /// 调试信息
    Debug = 0,
    /// 一般信息
    Info = 1,
    /// 警告信息
    Warn = 2,
    /// 错误信息
    Error = 3,
    /// 致命错误
    Fatal = 4,
    /// 拒绝所有事件
    Off = 5,
}

/// 所有具名的严重级别（不含哨兵）
pub const SEVERITIES: [Level; 5] = [
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
    Level::Fatal,
];

impl Level {
    /// 从任意支持的输入解析级别：整数、名称或已有的 Level
    pub fn parse<T: IntoLevel>(input: T) -> LogResult<Level> {
        input.into_level()
    }

    /// 从整数等级构造
    pub fn from_rank(rank: i64) -> LogResult<Level> {
        match rank {
            -1 => Ok(Level::All),
            0 => Ok(Level::Debug),
            1 => Ok(Level::Info),
            2 => Ok(Level::Warn),
            3 => Ok(Level::Error),
            4 => Ok(Level::Fatal),
            5 => Ok(Level::Off),
            _ => Err(LogError::InvalidLevel(format!("rank {} out of range", rank))),
        }
    }

    /// 从名称构造（大小写不敏感）
    pub fn from_name(name: &str) -> LogResult<Level> {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Level::All),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "off" => Ok(Level::Off),
            _ => Err(LogError::InvalidLevel(name.to_string())),
        }
    }

    /// 整数等级
    pub fn rank(self) -> i32 {
        self as i32
    }

    /// 作为最低级别时，是否接受 `other` 级别的事件
    pub fn includes(self, other: Level) -> bool {
        match self {
            Level::All => true,
            Level::Off => false,
            _ => other.is_severity() && other.rank() >= self.rank(),
        }
    }

    /// 是否为具名严重级别（非哨兵）
    pub fn is_severity(self) -> bool {
        !matches!(self, Level::All | Level::Off)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::All => "ALL",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::All
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_name(s)
    }
}

impl TryFrom<i64> for Level {
    type Error = LogError;

    fn try_from(rank: i64) -> Result<Self, LogError> {
        Level::from_rank(rank)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 使用 pad 以支持 {:>5} 之类的宽度
        f.pad(self.as_str())
    }
}

/// 可以被解析为 Level 的输入
pub trait IntoLevel {
    fn into_level(self) -> LogResult<Level>;
}

impl IntoLevel for Level {
    fn into_level(self) -> LogResult<Level> {
        Ok(self)
    }
}

impl IntoLevel for &Level {
    fn into_level(self) -> LogResult<Level> {
        Ok(*self)
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> LogResult<Level> {
        Level::from_name(self)
    }
}

impl IntoLevel for String {
    fn into_level(self) -> LogResult<Level> {
        Level::from_name(&self)
    }
}

impl IntoLevel for &String {
    fn into_level(self) -> LogResult<Level> {
        Level::from_name(self)
    }
}

impl IntoLevel for i64 {
    fn into_level(self) -> LogResult<Level> {
        Level::from_rank(self)
    }
}

impl IntoLevel for i32 {
    fn into_level(self) -> LogResult<Level> {
        Level::from_rank(self as i64)
    }
}

impl IntoLevel for &serde_json::Value {
    fn into_level(self) -> LogResult<Level> {
        match self {
            serde_json::Value::String(name) => Level::from_name(name),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(rank) => Level::from_rank(rank),
                None => Err(LogError::InvalidLevel(n.to_string())),
            },
            other => Err(LogError::InvalidLevel(other.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Rank(i64),
        }

        let level = match Repr::deserialize(deserializer)? {
            Repr::Name(name) => Level::from_name(&name),
            Repr::Rank(rank) => Level::from_rank(rank),
        };
        level.map_err(serde::de::Error::custom)
    }
}
