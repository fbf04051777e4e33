use crate::cfg::TypeOptions;
use crate::log::adapter::{create_adapter_from_options, register_adapters, LogAdapter};
use crate::log::error::{AdapterFailure, LogError, LogResult};
use crate::log::event::{LogEvent, Message, MetadataValue};
use crate::log::level::{IntoLevel, Level};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// adapter 写入失败时 Logger 的处理方式
///
/// 无论哪种策略，失败都会计入 `Logger::failure_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// 所有 adapter 执行完后返回 `LogError::Dispatch`
    #[default]
    Raise,
    /// 打印到标准错误
    Stderr,
    /// 通过 `log` 门面上报
    Log,
    Ignore,
}

/// Logger 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// logger 名称，写入每个事件
    pub name: Option<String>,

    /// logger 级别的最低级别，在 adapter 预检查之前生效
    #[default(Level::All)]
    pub level: Level,

    /// adapter 列表，按顺序分发
    #[default(vec![TypeOptions::new("StreamAdapter", serde_json::json!({}))])]
    pub adapters: Vec<TypeOptions>,

    pub on_error: ErrorPolicy,
}

struct Adapters {
    list: Vec<Arc<dyn LogAdapter>>,
    /// 所有 adapter 中最宽松的级别，没有 adapter 时为 OFF
    floor: Level,
}

impl Adapters {
    fn new(list: Vec<Arc<dyn LogAdapter>>) -> Self {
        let floor = list
            .iter()
            .map(|adapter| adapter.level())
            .min()
            .unwrap_or(Level::Off);
        Self { list, floor }
    }
}

/// 日志分发器
///
/// 按注册顺序把事件交给每个 adapter。adapter 之间互不影响：
/// 一个 adapter 失败不会阻止其余 adapter 写入，失败按 `ErrorPolicy` 处理。
pub struct Logger {
    name: String,
    level: RwLock<Level>,
    adapters: RwLock<Adapters>,
    on_error: ErrorPolicy,
    failures: AtomicU64,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: RwLock::new(Level::All),
            adapters: RwLock::new(Adapters::new(Vec::new())),
            on_error: ErrorPolicy::default(),
            failures: AtomicU64::new(0),
        }
    }

    /// 从配置创建 Logger，adapter 通过类型注册表构造
    pub fn from_config(config: LoggerConfig) -> LogResult<Self> {
        register_adapters()?;

        let adapters = config
            .adapters
            .iter()
            .map(create_adapter_from_options)
            .collect::<LogResult<Vec<_>>>()?;

        Ok(Self {
            name: config.name.unwrap_or_else(|| "default".to_string()),
            level: RwLock::new(config.level),
            adapters: RwLock::new(Adapters::new(adapters)),
            on_error: config.on_error,
            failures: AtomicU64::new(0),
        })
    }

    pub fn with_adapter(self, adapter: Arc<dyn LogAdapter>) -> LogResult<Self> {
        self.add_adapter(adapter)?;
        Ok(self)
    }

    pub fn with_level(self, level: impl IntoLevel) -> LogResult<Self> {
        self.set_level(level)?;
        Ok(self)
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.on_error
    }

    pub fn level(&self) -> Level {
        self.level.read().map(|level| *level).unwrap_or(Level::All)
    }

    /// 替换 logger 级别的最低级别
    pub fn set_level(&self, level: impl IntoLevel) -> LogResult<()> {
        let level = Level::parse(level)?;
        *self
            .level
            .write()
            .map_err(|_| LogError::LockPoisoned(self.name.clone()))? = level;
        Ok(())
    }

    /// 追加一个 adapter，排在已有 adapter 之后
    pub fn add_adapter(&self, adapter: Arc<dyn LogAdapter>) -> LogResult<()> {
        let mut adapters = self
            .adapters
            .write()
            .map_err(|_| LogError::LockPoisoned(self.name.clone()))?;
        let mut list = std::mem::take(&mut adapters.list);
        list.push(adapter);
        *adapters = Adapters::new(list);
        Ok(())
    }

    /// 按名称移除 adapter（不会关闭它）
    pub fn remove_adapter(&self, name: &str) -> LogResult<Option<Arc<dyn LogAdapter>>> {
        let mut adapters = self
            .adapters
            .write()
            .map_err(|_| LogError::LockPoisoned(self.name.clone()))?;
        let mut list = std::mem::take(&mut adapters.list);
        let removed = list
            .iter()
            .position(|adapter| adapter.name() == name)
            .map(|index| list.remove(index));
        *adapters = Adapters::new(list);
        Ok(removed)
    }

    /// 当前 adapter 的快照
    pub fn adapters(&self) -> Vec<Arc<dyn LogAdapter>> {
        self.adapters
            .read()
            .map(|adapters| adapters.list.clone())
            .unwrap_or_default()
    }

    /// 给定级别的事件是否至少会被一个 adapter 接受
    pub fn is_enabled(&self, level: Level) -> bool {
        let floor = match self.adapters.read() {
            Ok(adapters) => adapters.floor,
            Err(_) => return false,
        };
        level.is_severity() && self.level().includes(level) && floor.includes(level)
    }

    /// 累计的 adapter 失败次数
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// 写入一条日志
    ///
    /// 只有在至少一个 adapter 会接受该级别时才构造事件，延迟消息也只在此时求值。
    pub fn write(&self, level: impl IntoLevel, message: impl Into<Message>) -> LogResult<()> {
        self.write_with(level, message, |event| event)
    }

    /// 写入一条日志，`decorate` 在事件构造后补充位置、metadata 等信息
    pub fn write_with<F>(
        &self,
        level: impl IntoLevel,
        message: impl Into<Message>,
        decorate: F,
    ) -> LogResult<()>
    where
        F: FnOnce(LogEvent) -> LogEvent,
    {
        let level = Level::parse(level)?;
        if !level.is_severity() {
            return Err(LogError::InvalidLevel(format!(
                "{} is not an event severity",
                level
            )));
        }
        if !self.level().includes(level) {
            return Ok(());
        }

        // 复制 adapter 列表后释放读锁，写入期间不持有 logger 的锁
        let adapters = {
            let adapters = self
                .adapters
                .read()
                .map_err(|_| LogError::LockPoisoned(self.name.clone()))?;
            if !adapters.floor.includes(level) {
                return Ok(());
            }
            adapters.list.clone()
        };

        let event = decorate(LogEvent::new(level, message).with_logger(self.name.as_str()));
        self.dispatch(&event, &adapters)
    }

    /// 记录带 metadata 的日志
    ///
    /// # 示例
    ///
    /// ```ignore
    /// logger.logm(
    ///     Level::Info,
    ///     "user logged in",
    ///     vec![("user_id", 12345.into()), ("username", "alice".into())],
    /// )?;
    /// ```
    pub fn logm<K: Into<String>>(
        &self,
        level: impl IntoLevel,
        message: impl Into<Message>,
        metadata: impl IntoIterator<Item = (K, MetadataValue)>,
    ) -> LogResult<()> {
        self.write_with(level, message, |event| {
            metadata
                .into_iter()
                .fold(event, |event, (key, value)| event.with_metadata(key, value))
        })
    }

    pub fn debug(&self, message: impl Into<Message>) -> LogResult<()> {
        self.write(Level::Debug, message)
    }

    pub fn info(&self, message: impl Into<Message>) -> LogResult<()> {
        self.write(Level::Info, message)
    }

    pub fn warn(&self, message: impl Into<Message>) -> LogResult<()> {
        self.write(Level::Warn, message)
    }

    pub fn error(&self, message: impl Into<Message>) -> LogResult<()> {
        self.write(Level::Error, message)
    }

    pub fn fatal(&self, message: impl Into<Message>) -> LogResult<()> {
        self.write(Level::Fatal, message)
    }

    /// 关闭所有 adapter，汇总失败
    pub fn close(&self) -> LogResult<()> {
        let failures: Vec<AdapterFailure> = self
            .adapters()
            .iter()
            .filter_map(|adapter| {
                adapter.close().err().map(|error| AdapterFailure {
                    adapter: adapter.name().to_string(),
                    error,
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LogError::Dispatch(failures))
        }
    }

    fn dispatch(&self, event: &LogEvent, adapters: &[Arc<dyn LogAdapter>]) -> LogResult<()> {
        let failures: Vec<AdapterFailure> = adapters
            .iter()
            .filter_map(|adapter| {
                adapter.write(event).err().map(|error| AdapterFailure {
                    adapter: adapter.name().to_string(),
                    error,
                })
            })
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        self.failures
            .fetch_add(failures.len() as u64, Ordering::Relaxed);

        match self.on_error {
            ErrorPolicy::Raise => Err(LogError::Dispatch(failures)),
            ErrorPolicy::Stderr => {
                for failure in &failures {
                    eprintln!("logger '{}': adapter {}", self.name, failure);
                }
                Ok(())
            }
            ErrorPolicy::Log => {
                for failure in &failures {
                    ::log::error!("logger '{}': adapter {}", self.name, failure);
                }
                Ok(())
            }
            ErrorPolicy::Ignore => Ok(()),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let adapters: Vec<String> = self
            .adapters()
            .iter()
            .map(|adapter| adapter.name().to_string())
            .collect();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("adapters", &adapters)
            .field("on_error", &self.on_error)
            .finish()
    }
}
