use crate::log::adapter::{
    AdapterType, AdapterTypeBuilder, BufferLayer, FormatLayer, LineState, Lines,
};
use crate::log::error::{LogError, LogResult};
use garde::Validate;
use serde::Deserialize;
use serde_json::Value;
use smart_default::SmartDefault;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

/// FileAdapter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct FileAdapterConfig {
    /// 日志文件路径
    #[garde(length(min = 1))]
    pub file_path: String,

    /// 打开前是否创建父目录
    #[default = true]
    #[garde(skip)]
    pub create_dirs: bool,
}

/// 文件 sink，文件在第一次写入时才以追加方式打开
#[derive(Default)]
pub struct FileSink {
    path: PathBuf,
    create_dirs: bool,
    lines: Lines,
    file: Option<BufWriter<File>>,
}

impl FileSink {
    fn open(&mut self) -> LogResult<()> {
        if self.create_dirs {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.file = Some(BufWriter::new(file));
        Ok(())
    }
}

impl LineState for FileSink {
    fn lines(&self) -> &Lines {
        &self.lines
    }

    fn lines_mut(&mut self) -> &mut Lines {
        &mut self.lines
    }
}

fn file_builder(name: &str) -> LogResult<AdapterTypeBuilder<FileSink>> {
    let mut builder = AdapterTypeBuilder::<FileSink>::new(name);
    builder
        .on_setup("file", |sink, options| {
            let config: FileAdapterConfig = options.parse()?;
            config.validate()?;
            sink.path = PathBuf::from(config.file_path);
            sink.create_dirs = config.create_dirs;
            Ok(())
        })?
        .on_open("file", |sink, _| sink.open())?
        .on_write("file", |sink, _| match sink.file.as_mut() {
            Some(file) => sink.lines.flush_to(file),
            None => Err(LogError::sink(format!("{} is not open", sink.path.display()))),
        })?
        .on_close("file", |sink| match sink.file.take() {
            Some(mut file) => sink.lines.flush_to(&mut file),
            None => Ok(()),
        })?;
    builder.attribute("file_path", |sink| Value::from(sink.path.to_string_lossy().as_ref()));
    Ok(builder)
}

/// 文件输出器：每个事件格式化为一行追加到文件
pub fn file_adapter_type() -> LogResult<Arc<AdapterType<FileSink>>> {
    let mut builder = file_builder("FileAdapter")?;
    builder.layer(FormatLayer)?;
    Ok(builder.build())
}

/// 带缓冲的文件输出器：攒够 `buffer_size` 行再写入，关闭时写出剩余的行
pub fn buffered_file_adapter_type() -> LogResult<Arc<AdapterType<FileSink>>> {
    let mut builder = file_builder("BufferedFileAdapter")?;
    builder.layer(BufferLayer)?.layer(FormatLayer)?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::adapter::{AdapterOptions, AdapterState, LogAdapter};
    use crate::log::event::LogEvent;
    use crate::log::level::Level;
    use tempfile::TempDir;

    fn options_for(path: &std::path::Path) -> AdapterOptions {
        AdapterOptions::new().with("file_path", path.to_string_lossy().to_string())
    }

    #[test]
    fn test_file_adapter_lazy_open_and_append() -> LogResult<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested/dir/app.log");

        let adapter = file_adapter_type()?.instantiate(options_for(&path).with_level(Level::Info))?;
        assert_eq!(adapter.state()?, AdapterState::Configured);
        assert!(!path.exists());

        adapter.write(&LogEvent::new(Level::Debug, "skipped"))?;
        assert!(!path.exists());

        adapter.write(&LogEvent::new(Level::Info, "First message"))?;
        adapter.write(&LogEvent::new(Level::Error, "Second message"))?;
        assert_eq!(adapter.state()?, AdapterState::Open);

        let contents = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": First message"));
        assert!(lines[1].contains("[ERROR]"));

        adapter.close()?;
        assert_eq!(
            adapter.inspect().get("file_path"),
            Some(&Value::from(path.to_string_lossy().as_ref()))
        );
        Ok(())
    }

    #[test]
    fn test_file_adapter_appends_to_existing_file() -> LogResult<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("app.log");
        std::fs::write(&path, "existing\n")?;

        let adapter = file_adapter_type()?.instantiate(options_for(&path))?;
        adapter.write(&LogEvent::new(Level::Warn, "appended"))?;
        adapter.close()?;

        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.starts_with("existing\n"));
        assert!(contents.trim_end().ends_with(": appended"));
        Ok(())
    }

    #[test]
    fn test_file_adapter_requires_path() {
        let result = file_adapter_type().and_then(|t| t.instantiate(AdapterOptions::new()));
        assert!(matches!(result, Err(LogError::Config(_))));
    }

    #[test]
    fn test_file_adapter_open_failure_poisons() -> LogResult<()> {
        let dir = TempDir::new()?;
        // 路径是一个目录，打开必然失败
        let adapter = file_adapter_type()?.instantiate(
            options_for(dir.path()).with("create_dirs", false),
        )?;

        let err = adapter.write(&LogEvent::new(Level::Info, "nowhere")).unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
        assert!(adapter.is_closed());
        assert!(matches!(
            adapter.write(&LogEvent::new(Level::Info, "again")),
            Err(LogError::Closed(_))
        ));
        Ok(())
    }

    #[test]
    fn test_buffered_file_adapter_holds_until_full() -> LogResult<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("buffered.log");

        let adapter = buffered_file_adapter_type()?.instantiate(options_for(&path).with("buffer_size", 3))?;

        adapter.write(&LogEvent::new(Level::Info, "one"))?;
        adapter.write(&LogEvent::new(Level::Info, "two"))?;
        assert_eq!(std::fs::read_to_string(&path)?, "");
        assert_eq!(adapter.inspect().get("buffered"), Some(&Value::from(2)));

        adapter.write(&LogEvent::new(Level::Info, "three"))?;
        assert_eq!(std::fs::read_to_string(&path)?.lines().count(), 3);

        adapter.write(&LogEvent::new(Level::Info, "four"))?;
        adapter.close()?;

        let contents = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].ends_with(": four"));
        Ok(())
    }

    #[test]
    fn test_buffered_file_adapter_layer_order() -> LogResult<()> {
        use crate::log::hook::HookKind;

        let adapter_type = buffered_file_adapter_type()?;
        assert_eq!(
            adapter_type.hooks().chain(HookKind::Write).labels(),
            vec!["format", "buffer", "file"]
        );
        assert_eq!(
            adapter_type.hooks().chain(HookKind::Close).labels(),
            vec!["buffer", "file"]
        );
        Ok(())
    }
}
