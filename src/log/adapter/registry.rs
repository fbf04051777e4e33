// Adapter 类型注册表
//
// 进程级注册表，按类型名称保存组合好的 adapter 类型。某个类型一旦被用来构造过实例，
// 对应条目即被封存，之后不允许替换。内置类型只填补空缺的名称，不覆盖用户注册的类型。

use crate::cfg::TypeOptions;
use crate::log::adapter::{
    file_adapter, memory_adapter, stream_adapter, AdapterOptions, AdapterType, LogAdapter,
};
use crate::log::error::{LogError, LogResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

type Factory = Arc<dyn Fn(AdapterOptions) -> LogResult<Arc<dyn LogAdapter>> + Send + Sync>;

struct Entry {
    factory: Factory,
    sealed: AtomicBool,
}

static ADAPTER_TYPES: Lazy<RwLock<HashMap<String, Entry>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static BUILTIN: Lazy<Result<(), String>> = Lazy::new(register_builtin_types);

fn factory_of<S>(adapter_type: Arc<AdapterType<S>>) -> (String, Factory)
where
    S: Default + Send + 'static,
{
    let name = adapter_type.name().to_string();
    let factory: Factory = Arc::new(move |options| {
        let adapter = adapter_type.instantiate(options)?;
        Ok(Arc::new(adapter) as Arc<dyn LogAdapter>)
    });
    (name, factory)
}

fn write_registry() -> LogResult<std::sync::RwLockWriteGuard<'static, HashMap<String, Entry>>> {
    ADAPTER_TYPES
        .write()
        .map_err(|_| LogError::config("Failed to acquire write lock"))
}

/// 注册一个 adapter 类型，名称取自类型本身
pub fn register_adapter_type<S>(adapter_type: Arc<AdapterType<S>>) -> LogResult<()>
where
    S: Default + Send + 'static,
{
    let (name, factory) = factory_of(adapter_type);
    let mut registry = write_registry()?;

    if let Some(existing) = registry.get(&name) {
        if existing.sealed.load(Ordering::Acquire) {
            return Err(LogError::config(format!(
                "adapter type '{}' is already in use and cannot be replaced",
                name
            )));
        }
    }

    registry.insert(
        name,
        Entry {
            factory,
            sealed: AtomicBool::new(false),
        },
    );
    Ok(())
}

/// 名称空缺时注册，已有同名类型（无论是否封存）时保留原有类型
fn register_if_absent<S>(adapter_type: LogResult<Arc<AdapterType<S>>>) -> LogResult<()>
where
    S: Default + Send + 'static,
{
    let (name, factory) = factory_of(adapter_type?);
    write_registry()?.entry(name).or_insert_with(|| Entry {
        factory,
        sealed: AtomicBool::new(false),
    });
    Ok(())
}

fn register_builtin_types() -> Result<(), String> {
    let errors: Vec<String> = [
        register_if_absent(stream_adapter::stream_adapter_type()),
        register_if_absent(file_adapter::file_adapter_type()),
        register_if_absent(file_adapter::buffered_file_adapter_type()),
        register_if_absent(memory_adapter::memory_adapter_type()),
    ]
    .into_iter()
    .filter_map(|result| result.err().map(|e| e.to_string()))
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// 注册内置 adapter 类型
///
/// 只执行一次，结果被缓存：之后的每次调用都返回同样的结果。
/// 用户先行注册的同名类型不会被替换。
pub fn register_adapters() -> LogResult<()> {
    match &*BUILTIN {
        Ok(()) => Ok(()),
        Err(e) => Err(LogError::config(format!("failed to register adapters: {}", e))),
    }
}

/// 按类型名称构造 adapter 实例
pub fn create_adapter(type_name: &str, options: AdapterOptions) -> LogResult<Arc<dyn LogAdapter>> {
    let registry = ADAPTER_TYPES
        .read()
        .map_err(|_| LogError::config("Failed to acquire read lock"))?;

    let entry = registry
        .get(type_name)
        .ok_or_else(|| LogError::config(format!("adapter type '{}' not registered", type_name)))?;

    entry.sealed.store(true, Ordering::Release);
    let factory = Arc::clone(&entry.factory);
    drop(registry);

    factory(options)
}

/// 从 TypeOptions 构造 adapter 实例
pub fn create_adapter_from_options(type_options: &TypeOptions) -> LogResult<Arc<dyn LogAdapter>> {
    let options = AdapterOptions::from_value(type_options.options.clone())?;
    create_adapter(&type_options.type_name, options)
}

/// 已注册的 adapter 类型名称（排序后）
pub fn registered_adapter_types() -> Vec<String> {
    let mut names: Vec<String> = ADAPTER_TYPES
        .read()
        .map(|registry| registry.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::adapter::AdapterTypeBuilder;
    use crate::log::event::LogEvent;
    use crate::log::level::Level;
    use serde_json::Value;
    use serial_test::serial;

    #[derive(Default)]
    struct Counter(usize);

    fn counter_type(name: &str) -> Arc<AdapterType<Counter>> {
        let mut builder = AdapterTypeBuilder::<Counter>::new(name);
        builder
            .on_write("count", |counter, _| {
                counter.0 += 1;
                Ok(())
            })
            .unwrap();
        builder.attribute("count", |counter| Value::from(counter.0));
        builder.build()
    }

    #[test]
    #[serial]
    fn test_register_adapters() -> LogResult<()> {
        register_adapters()?;
        register_adapters()?;

        let names = registered_adapter_types();
        for expected in ["BufferedFileAdapter", "FileAdapter", "MemoryAdapter", "StreamAdapter"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
        Ok(())
    }

    #[test]
    #[serial]
    fn test_builtin_registration_keeps_existing_type() -> LogResult<()> {
        register_adapter_type(counter_type("KeepUserAdapter"))?;

        let mut builtin = AdapterTypeBuilder::<Counter>::new("KeepUserAdapter");
        builtin.attribute("builtin", |_| Value::Bool(true));
        register_if_absent(Ok(builtin.build()))?;

        let adapter = create_adapter("KeepUserAdapter", AdapterOptions::new())?;
        adapter.write(&LogEvent::new(Level::Info, "kept"))?;
        let inspection = adapter.inspect();
        assert_eq!(inspection.get("count"), Some(&Value::from(1)));
        assert!(inspection.get("builtin").is_none());
        Ok(())
    }

    #[test]
    #[serial]
    fn test_builtin_registration_skips_sealed_type() -> LogResult<()> {
        register_adapter_type(counter_type("SealedBeforeBuiltinAdapter"))?;
        create_adapter("SealedBeforeBuiltinAdapter", AdapterOptions::new())?;

        // 已封存的同名类型不算失败
        register_if_absent(Ok(counter_type("SealedBeforeBuiltinAdapter")))?;
        register_if_absent(Ok(counter_type("FreshBuiltinAdapter")))?;
        assert!(registered_adapter_types().contains(&"FreshBuiltinAdapter".to_string()));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_create_adapter_from_options() -> LogResult<()> {
        register_adapters()?;

        let opts = TypeOptions::from_json(
            r#"
            {
                type: "MemoryAdapter",
                options: {
                    level: "warn",
                    name: "audit",
                }
            }
        "#,
        )
        .map_err(LogError::config)?;

        let adapter = create_adapter_from_options(&opts)?;
        assert_eq!(adapter.name(), "audit");
        assert_eq!(adapter.level(), Level::Warn);

        adapter.write(&LogEvent::new(Level::Error, "disk almost full"))?;
        let lines = adapter.inspect().get("lines").cloned().unwrap_or(Value::Null);
        assert_eq!(lines.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_unknown_adapter_type() {
        let err = create_adapter("NoSuchAdapter", AdapterOptions::new()).err().unwrap();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_sealed_after_first_instance() -> LogResult<()> {
        register_adapter_type(counter_type("SealTestAdapter"))?;
        // 尚未使用，可以替换
        register_adapter_type(counter_type("SealTestAdapter"))?;

        let adapter = create_adapter("SealTestAdapter", AdapterOptions::new())?;
        adapter.write(&LogEvent::new(Level::Info, "one"))?;
        assert_eq!(adapter.inspect().get("count"), Some(&Value::from(1)));

        let err = register_adapter_type(counter_type("SealTestAdapter")).unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_instances_share_type_but_not_state() -> LogResult<()> {
        register_adapter_type(counter_type("SharedTypeAdapter"))?;

        let first = create_adapter("SharedTypeAdapter", AdapterOptions::new())?;
        let second = create_adapter("SharedTypeAdapter", AdapterOptions::new())?;

        first.write(&LogEvent::new(Level::Info, "a"))?;
        first.write(&LogEvent::new(Level::Info, "b"))?;
        second.write(&LogEvent::new(Level::Info, "c"))?;

        assert_eq!(first.inspect().get("count"), Some(&Value::from(2)));
        assert_eq!(second.inspect().get("count"), Some(&Value::from(1)));
        Ok(())
    }
}
