use crate::log::error::{LogError, LogResult};
use crate::log::event::LogEvent;
use crate::log::formatter::LogFormatter;
use serde::Deserialize;
use smart_default::SmartDefault;

/// JsonFormatter 配置
#[derive(Debug, Clone, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct JsonFormatterConfig {
    /// 多行缩进输出，不能用于面向行的 adapter
    #[default = false]
    pub pretty: bool,
}

/// JSON 格式化器
///
/// 直接序列化 LogEvent，复用其 Serialize 实现
pub struct JsonFormatter {
    config: JsonFormatterConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonFormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(JsonFormatterConfig::default())
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, event: &LogEvent) -> LogResult<String> {
        let result = if self.config.pretty {
            serde_json::to_string_pretty(event)
        } else {
            serde_json::to_string(event)
        };
        result.map_err(|e| LogError::Format(e.to_string()))
    }

    fn single_line(&self) -> bool {
        !self.config.pretty
    }
}

crate::impl_from!(JsonFormatterConfig => JsonFormatter);
crate::impl_box_from!(JsonFormatter => dyn LogFormatter);
