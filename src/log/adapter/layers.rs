use crate::cfg::TypeOptions;
use crate::log::adapter::{AdapterTypeBuilder, Layer};
use crate::log::error::{LogError, LogResult};
use crate::log::formatter::{create_formatter_from_options, LogFormatter, TextFormatter};
use garde::Validate;
use serde::Deserialize;
use serde_json::Value;
use smart_default::SmartDefault;
use std::io::Write;
use std::sync::Arc;

/// 面向行的 sink 共享的中间状态
///
/// - `ready`: 已格式化、等待 sink 写出的行
/// - `held`: 被缓冲层暂存的行
#[derive(Default)]
pub struct Lines {
    formatter: Option<Arc<dyn LogFormatter>>,
    ready: Vec<String>,
    held: Vec<String>,
    buffer_size: usize,
}

impl Lines {
    pub fn push(&mut self, line: String) {
        self.ready.push(line);
    }

    pub fn ready(&self) -> &[String] {
        &self.ready
    }

    pub fn held(&self) -> &[String] {
        &self.held
    }

    /// 取走所有待写出的行
    pub fn take_ready(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ready)
    }

    /// 将待写出的行逐行写入并刷新
    pub fn flush_to<W: Write + ?Sized>(&mut self, out: &mut W) -> LogResult<()> {
        for line in self.ready.drain(..) {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    fn release_held(&mut self) {
        self.ready.append(&mut self.held);
    }
}

/// 持有 `Lines` 的 sink 状态
pub trait LineState {
    fn lines(&self) -> &Lines;
    fn lines_mut(&mut self) -> &mut Lines;
}

/// 格式化层：setup! 时根据 `formatter` 选项创建格式化器，write! 时把事件渲染为一行
///
/// `formatter` 可以是格式化器名称，也可以是完整的 `{type, options}`；缺省使用 TextFormatter。
/// 输出多行的格式化器（如 `pretty` 的 JsonFormatter）在 setup! 时被拒绝。
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatLayer;

impl FormatLayer {
    pub const OPTION: &'static str = "formatter";

    fn formatter_from(value: Option<&Value>) -> LogResult<Arc<dyn LogFormatter>> {
        let type_options = match value {
            None | Some(Value::Null) => return Ok(Arc::new(TextFormatter::default())),
            Some(Value::String(name)) => TypeOptions {
                type_name: name.clone(),
                options: Value::Object(Default::default()),
            },
            Some(other) => serde_json::from_value(other.clone())
                .map_err(|e| LogError::config(format!("option 'formatter': {}", e)))?,
        };
        let formatter = create_formatter_from_options(&type_options).map_err(LogError::config)?;
        if !formatter.single_line() {
            return Err(LogError::config(format!(
                "option 'formatter': {} produces multi-line output",
                type_options.type_name
            )));
        }
        Ok(Arc::from(formatter))
    }
}

impl<S: LineState + 'static> Layer<S> for FormatLayer {
    fn compose(self, builder: &mut AdapterTypeBuilder<S>) -> LogResult<()> {
        builder
            .on_setup("format", |state: &mut S, options| {
                let formatter = FormatLayer::formatter_from(options.raw(FormatLayer::OPTION))?;
                state.lines_mut().formatter = Some(formatter);
                Ok(())
            })?
            .on_write("format", |state: &mut S, event| {
                let line = match state.lines().formatter.as_ref() {
                    Some(formatter) => formatter.format(event)?,
                    None => TextFormatter::default().format(event)?,
                };
                state.lines_mut().push(line);
                Ok(())
            })?;
        Ok(())
    }
}

/// 缓冲层配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct BufferConfig {
    /// 攒够多少行后交给 sink
    #[default = 64]
    #[garde(range(min = 1, max = 65536))]
    pub buffer_size: usize,
}

/// 缓冲层：把格式化后的行暂存起来，攒够 `buffer_size` 行或关闭时再交给 sink
///
/// 需要在 FormatLayer 之前组合，这样写入时格式化先执行，缓冲层才能看到格式化后的行。
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferLayer;

impl<S: LineState + 'static> Layer<S> for BufferLayer {
    fn compose(self, builder: &mut AdapterTypeBuilder<S>) -> LogResult<()> {
        builder
            .on_setup("buffer", |state: &mut S, options| {
                let config: BufferConfig = options.parse()?;
                config.validate()?;
                state.lines_mut().buffer_size = config.buffer_size;
                Ok(())
            })?
            .on_write("buffer", |state: &mut S, _| {
                let lines = state.lines_mut();
                lines.held.append(&mut lines.ready);
                if lines.held.len() >= lines.buffer_size.max(1) {
                    lines.release_held();
                }
                Ok(())
            })?
            .on_close("buffer", |state: &mut S| {
                state.lines_mut().release_held();
                Ok(())
            })?;
        builder.attribute("buffered", |state: &S| Value::from(state.lines().held().len()));
        Ok(())
    }
}
