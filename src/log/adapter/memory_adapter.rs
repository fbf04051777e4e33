use crate::log::adapter::{AdapterType, AdapterTypeBuilder, FormatLayer, LineState, Lines};
use crate::log::error::LogResult;
use garde::Validate;
use serde::Deserialize;
use serde_json::Value;
use smart_default::SmartDefault;
use std::collections::VecDeque;
use std::sync::Arc;

/// MemoryAdapter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct MemoryAdapterConfig {
    /// 最多保留的行数，超出后丢弃最旧的行
    #[default(10_000)]
    #[garde(range(min = 1))]
    pub max_lines: usize,
}

/// 内存 sink
#[derive(Default)]
pub struct MemorySink {
    lines: Lines,
    stored: VecDeque<String>,
    max_lines: usize,
}

impl MemorySink {
    fn store(&mut self) {
        self.stored.extend(self.lines.take_ready());
        while self.stored.len() > self.max_lines {
            self.stored.pop_front();
        }
    }
}

impl LineState for MemorySink {
    fn lines(&self) -> &Lines {
        &self.lines
    }

    fn lines_mut(&mut self) -> &mut Lines {
        &mut self.lines
    }
}

/// 内存输出器：格式化后的行保存在内存中，通过 inspect 的 `lines` 属性读取
pub fn memory_adapter_type() -> LogResult<Arc<AdapterType<MemorySink>>> {
    let mut builder = AdapterTypeBuilder::<MemorySink>::new("MemoryAdapter");
    builder
        .on_setup("memory", |sink, options| {
            let config: MemoryAdapterConfig = options.parse()?;
            config.validate()?;
            sink.max_lines = config.max_lines;
            Ok(())
        })?
        .on_write("memory", |sink, _| {
            sink.store();
            Ok(())
        })?
        .on_close("memory", |sink| {
            sink.store();
            Ok(())
        })?
        .layer(FormatLayer)?;
    builder.attribute("lines", |sink| Value::from_iter(sink.stored.iter().cloned()));
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::adapter::{AdapterOptions, LogAdapter};
    use crate::log::error::LogError;
    use crate::log::event::LogEvent;
    use crate::log::level::Level;

    fn lines_of(adapter: &dyn LogAdapter) -> Vec<String> {
        adapter
            .inspect()
            .get("lines")
            .and_then(Value::as_array)
            .map(|lines| lines.iter().filter_map(|l| l.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_memory_adapter_collects_lines() -> LogResult<()> {
        let adapter = memory_adapter_type()?.instantiate(AdapterOptions::new().with_level(Level::Info))?;

        adapter.write(&LogEvent::new(Level::Debug, "hidden"))?;
        adapter.write(&LogEvent::new(Level::Info, "Hello World!"))?;

        let lines = lines_of(&adapter);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with(": Hello World!"));
        Ok(())
    }

    #[test]
    fn test_memory_adapter_max_lines() -> LogResult<()> {
        let adapter = memory_adapter_type()?.instantiate(AdapterOptions::new().with("max_lines", 2))?;

        for message in ["a", "b", "c"] {
            adapter.write(&LogEvent::new(Level::Info, message))?;
        }

        let lines = lines_of(&adapter);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": b"));
        assert!(lines[1].ends_with(": c"));
        Ok(())
    }

    #[test]
    fn test_memory_adapter_bounded_by_default() -> LogResult<()> {
        assert_eq!(MemoryAdapterConfig::default().max_lines, 10_000);

        let adapter = memory_adapter_type()?.instantiate(AdapterOptions::new())?;
        for i in 0..10_005 {
            adapter.write(&LogEvent::new(Level::Info, format!("line {}", i)))?;
        }

        let lines = lines_of(&adapter);
        assert_eq!(lines.len(), 10_000);
        assert!(lines[0].ends_with(": line 5"));
        Ok(())
    }

    #[test]
    fn test_memory_adapter_rejects_zero_max_lines() {
        let result = memory_adapter_type().and_then(|t| t.instantiate(AdapterOptions::new().with("max_lines", 0)));
        assert!(matches!(result, Err(LogError::Config(_))));
    }

    #[test]
    fn test_memory_adapter_json_formatter() -> LogResult<()> {
        let adapter = memory_adapter_type()?.instantiate(
            AdapterOptions::new().with("formatter", serde_json::json!({"type": "JsonFormatter"})),
        )?;
        adapter.write(&LogEvent::new(Level::Fatal, "down").with_metadata("code", 500))?;

        let line: Value = serde_json::from_str(&lines_of(&adapter)[0]).unwrap();
        assert_eq!(line["level"], "FATAL");
        assert_eq!(line["metadata"]["code"], 500);
        Ok(())
    }
}
