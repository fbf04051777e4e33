use crate::log::adapter::{
    AdapterType, AdapterTypeBuilder, FormatLayer, LineState, Lines, OpenMode,
};
use crate::log::error::{LogError, LogResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Write};
use std::sync::Arc;

/// 输出流
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Stdout,
    Stderr,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Stdout => "stdout",
            Target::Stderr => "stderr",
        }
    }
}

/// StreamAdapter 配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamAdapterConfig {
    pub target: Target,
}

/// 终端输出 sink
#[derive(Default)]
pub struct StreamSink {
    target: Target,
    lines: Lines,
    out: Option<Box<dyn Write + Send>>,
}

impl LineState for StreamSink {
    fn lines(&self) -> &Lines {
        &self.lines
    }

    fn lines_mut(&mut self) -> &mut Lines {
        &mut self.lines
    }
}

/// 终端输出器：将格式化后的行写到 stdout 或 stderr，构造时即打开
pub fn stream_adapter_type() -> LogResult<Arc<AdapterType<StreamSink>>> {
    let mut builder = AdapterTypeBuilder::<StreamSink>::new("StreamAdapter");
    builder
        .on_setup("stream", |sink, options| {
            let config: StreamAdapterConfig = options.parse()?;
            sink.target = config.target;
            Ok(())
        })?
        .on_open("stream", |sink, _| {
            let out: Box<dyn Write + Send> = match sink.target {
                Target::Stdout => Box::new(io::stdout()),
                Target::Stderr => Box::new(io::stderr()),
            };
            sink.out = Some(out);
            Ok(())
        })?
        .on_write("stream", |sink, _| match sink.out.as_mut() {
            Some(out) => sink.lines.flush_to(out.as_mut()),
            None => Err(LogError::sink(format!("{} is not open", sink.target.as_str()))),
        })?
        .on_close("stream", |sink| match sink.out.take() {
            Some(mut out) => sink.lines.flush_to(out.as_mut()),
            None => Ok(()),
        })?
        .layer(FormatLayer)?
        .open_mode(OpenMode::Eager);
    builder.attribute("target", |sink| Value::from(sink.target.as_str()));
    Ok(builder.build())
}
