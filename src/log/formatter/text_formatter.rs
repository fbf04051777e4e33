use crate::log::error::{LogError, LogResult};
use crate::log::event::LogEvent;
use crate::log::formatter::LogFormatter;
use crate::log::level::Level;
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use smart_default::SmartDefault;
use std::fmt::Write;

/// TextFormatter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct TextFormatterConfig {
    /// 是否启用颜色输出
    #[default = false]
    pub colored: bool,

    /// 是否输出调用位置
    #[default = false]
    pub show_location: bool,

    /// chrono 时间格式
    #[default = "%Y-%m-%dT%H:%M:%S%.3f%:z"]
    pub time_format: String,
}

/// 文本格式化器
///
/// 格式: `<时间戳> [<级别>] <pid> : <消息>`，级别右对齐到 5 个字符，
/// 有 metadata 时追加 ` | key=value ...`
pub struct TextFormatter {
    config: TextFormatterConfig,
}

impl TextFormatter {
    pub fn new(config: TextFormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(TextFormatterConfig::default())
    }
}

fn format_error(err: std::fmt::Error) -> LogError {
    LogError::Format(err.to_string())
}

fn colorize_level(level: Level, padded: &str) -> ColoredString {
    match level {
        Level::Fatal => padded.red().bold(),
        Level::Error => padded.red(),
        Level::Warn => padded.yellow(),
        Level::Info => padded.green(),
        Level::Debug => padded.cyan(),
        _ => padded.normal(),
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, event: &LogEvent) -> LogResult<String> {
        let message = event.message();
        let mut result = String::with_capacity(64 + message.len());

        // 时间格式非法时 chrono 返回 fmt::Error，这里转成 Format 错误而不是 panic
        let mut timestamp = String::with_capacity(32);
        write!(timestamp, "{}", event.timestamp().format(&self.config.time_format))
            .map_err(|_| LogError::Format(format!("invalid time_format '{}'", self.config.time_format)))?;
        let level = format!("{:>5}", event.level());

        let header = if self.config.colored {
            write!(
                result,
                "{} [{}] {}",
                timestamp.dimmed(),
                colorize_level(event.level(), &level),
                event.pid()
            )
        } else {
            write!(result, "{} [{}] {}", timestamp, level, event.pid())
        };
        header.map_err(format_error)?;

        if self.config.show_location {
            if let (Some(file), Some(line)) = (event.file(), event.line()) {
                write!(result, " [{}:{}]", file, line).map_err(format_error)?;
            }
        }

        result.push_str(" : ");
        result.push_str(message);

        if !event.metadata().is_empty() {
            result.push_str(" |");
            for (key, value) in event.metadata() {
                let entry = if self.config.colored {
                    write!(result, " {}={}", key.cyan(), value)
                } else {
                    write!(result, " {}={}", key, value)
                };
                entry.map_err(format_error)?;
            }
        }

        Ok(result)
    }
}

crate::impl_from!(TextFormatterConfig => TextFormatter);
crate::impl_box_from!(TextFormatter => dyn LogFormatter);
