#[cfg(test)]
mod dispatch_tests {
    use logx::log::{
        register_adapter_type, register_adapters, AdapterOptions, AdapterTypeBuilder,
        ErrorPolicy, Level, LogAdapter, LogError, LogResult, Logger, LoggerConfig,
        LoggerManager, LoggerManagerConfig, Message,
    };
    use logx::log::adapter::memory_adapter::memory_adapter_type;
    use serde_json::Value;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn lines_of(adapter: &Arc<dyn LogAdapter>) -> Vec<String> {
        adapter
            .inspect()
            .get("lines")
            .and_then(Value::as_array)
            .map(|lines| lines.iter().filter_map(|l| l.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    fn memory_adapter(options: AdapterOptions) -> LogResult<Arc<dyn LogAdapter>> {
        let adapter = memory_adapter_type()?.instantiate(options)?;
        Ok(Arc::new(adapter))
    }

    // 记录 hook 调用顺序的 sink
    #[derive(Default)]
    struct Trace {
        calls: Vec<String>,
    }

    #[test]
    #[serial]
    fn test_config_driven_end_to_end() -> LogResult<()> {
        register_adapters()?;
        let config: LoggerConfig = json5::from_str(
            r#"{
                name: "orders",
                level: "debug",
                adapters: [
                    { type: "MemoryAdapter", options: { name: "audit", level: "info" } },
                    { type: "MemoryAdapter", options: { name: "errors", level: 3, formatter: "JsonFormatter" } },
                ],
            }"#,
        )
        .map_err(LogError::config)?;

        let logger = Logger::from_config(config)?;
        logger.debug("cache warmed")?;
        logger.info("order created")?;
        logger.error("payment declined")?;

        let adapters = logger.adapters();
        let audit = lines_of(&adapters[0]);
        assert_eq!(audit.len(), 2);
        assert!(audit[0].contains("order created"));
        assert!(audit[1].contains("ERROR"));

        let errors = lines_of(&adapters[1]);
        assert_eq!(errors.len(), 1);
        let record: Value = serde_json::from_str(&errors[0]).map_err(LogError::config)?;
        assert_eq!(record["message"], "payment declined");
        assert_eq!(record["logger"], "orders");

        logger.close()
    }

    #[test]
    fn test_concurrent_writers_never_interleave() -> LogResult<()> {
        const THREADS: usize = 8;
        const MESSAGES: usize = 250;

        let adapter = memory_adapter(AdapterOptions::new())?;
        let logger = Arc::new(Logger::new("workers").with_adapter(Arc::clone(&adapter))?);

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || -> LogResult<()> {
                    for i in 0..MESSAGES {
                        logger.info(format!("worker-{}-message-{}", t, i))?;
                    }
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("writer thread panicked")?;
        }

        let lines = lines_of(&adapter);
        assert_eq!(lines.len(), THREADS * MESSAGES);
        for line in &lines {
            assert_eq!(line.matches("worker-").count(), 1, "interleaved line: {}", line);
            assert!(!line.contains('\n'));
        }

        // 每个线程内部的顺序保持不变
        for t in 0..THREADS {
            let prefix = format!("worker-{}-message-", t);
            let seen: Vec<usize> = lines
                .iter()
                .filter_map(|line| line.split(&prefix).nth(1))
                .filter_map(|rest| rest.trim().parse().ok())
                .collect();
            assert_eq!(seen, (0..MESSAGES).collect::<Vec<_>>());
        }
        Ok(())
    }

    #[test]
    fn test_later_hook_runs_first() -> LogResult<()> {
        let mut builder = AdapterTypeBuilder::<Trace>::new("TraceAdapter");
        builder
            .on_write("x", |sink, _| {
                sink.calls.push("x".to_string());
                Ok(())
            })?
            .on_write("y", |sink, _| {
                sink.calls.push("y".to_string());
                Ok(())
            })?;
        builder.attribute("calls", |sink| Value::from_iter(sink.calls.iter().cloned()));
        let adapter_type = builder.build();

        assert_eq!(adapter_type.hooks().chain(logx::log::HookKind::Write).labels(), vec!["y", "x"]);

        let adapter: Arc<dyn LogAdapter> = Arc::new(adapter_type.instantiate(AdapterOptions::new())?);
        let logger = Logger::new("trace").with_adapter(Arc::clone(&adapter))?;
        logger.info("one")?;
        logger.info("two")?;

        assert_eq!(
            adapter.inspect().get("calls"),
            Some(&serde_json::json!(["y", "x", "y", "x"]))
        );
        Ok(())
    }

    #[test]
    fn test_failed_write_poisons_only_that_adapter() -> LogResult<()> {
        let closes = Arc::new(AtomicUsize::new(0));
        let close_counter = Arc::clone(&closes);

        let mut builder = AdapterTypeBuilder::<Trace>::new("FlakyAdapter");
        builder
            .on_write("flaky", |sink, event| {
                if event.message().contains("boom") {
                    return Err(LogError::sink("connection reset"));
                }
                sink.calls.push(event.message().to_string());
                Ok(())
            })?
            .on_close("flaky", move |_| {
                close_counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
        let flaky: Arc<dyn LogAdapter> =
            Arc::new(builder.build().instantiate(AdapterOptions::new().with("name", "flaky"))?);
        let healthy = memory_adapter(AdapterOptions::new())?;

        let logger = Logger::new("app")
            .with_adapter(Arc::clone(&flaky))?
            .with_adapter(Arc::clone(&healthy))?;

        logger.info("before")?;
        match logger.info("boom") {
            Err(LogError::Dispatch(failures)) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].adapter, "flaky");
                assert!(matches!(failures[0].error, LogError::SinkWrite(_)));
            }
            other => panic!("expected dispatch error, got {:?}", other),
        }
        assert!(flaky.is_closed());
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        // 之后的写入仍然到达健康的 adapter，被关闭的 adapter 不再写入
        let after = logger.info("after");
        assert!(matches!(after, Err(LogError::Dispatch(ref f)) if matches!(f[0].error, LogError::Closed(_))));
        assert_eq!(lines_of(&healthy).len(), 3);

        flaky.close()?;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(logger.failure_count(), 2);
        Ok(())
    }

    #[test]
    fn test_deferred_message_only_for_accepted_levels() -> LogResult<()> {
        let adapter = memory_adapter(AdapterOptions::new().with_level(Level::Warn))?;
        let logger = Logger::new("app").with_adapter(Arc::clone(&adapter))?;

        let calls = Arc::new(AtomicUsize::new(0));
        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
            let counter = Arc::clone(&calls);
            logger.write(
                level,
                Message::deferred(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    format!("rendered at {}", level.as_str())
                }),
            )?;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(lines_of(&adapter).len(), 2);
        Ok(())
    }

    #[test]
    fn test_error_policy_ignore_keeps_caller_running() -> LogResult<()> {
        let mut builder = AdapterTypeBuilder::<Trace>::new("DeadAdapter");
        builder.on_open("dead", |_, _| Err(LogError::sink("no route to host")))?;
        let dead: Arc<dyn LogAdapter> = Arc::new(builder.build().instantiate(AdapterOptions::new())?);

        let logger = Logger::new("app")
            .with_adapter(dead)?
            .with_error_policy(ErrorPolicy::Ignore);

        logger.info("first")?;
        logger.info("second")?;
        assert_eq!(logger.failure_count(), 2);
        Ok(())
    }

    #[test]
    fn test_hook_logging_to_own_logger_is_rejected() -> LogResult<()> {
        let target: Arc<Mutex<Option<Arc<Logger>>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&target);

        let mut builder = AdapterTypeBuilder::<Trace>::new("EchoAdapter");
        builder.on_write("echo", move |sink, event| {
            let logger = inner.lock().ok().and_then(|l| l.clone());
            if let Some(logger) = logger {
                if let Err(err) = logger.info(format!("echo: {}", event.message())) {
                    sink.calls.push(err.to_string());
                }
            }
            Ok(())
        })?;
        builder.attribute("calls", |sink| Value::from_iter(sink.calls.iter().cloned()));

        let adapter: Arc<dyn LogAdapter> = Arc::new(
            builder
                .build()
                .instantiate(AdapterOptions::new().with("name", "echo"))?,
        );
        let logger = Arc::new(Logger::new("loop").with_adapter(Arc::clone(&adapter))?);
        *target.lock().expect("lock") = Some(Arc::clone(&logger));

        logger.info("ping")?;

        let calls = adapter.inspect().get("calls").cloned().unwrap_or(Value::Null);
        let recorded = calls.as_array().map(|c| c.len()).unwrap_or(0);
        assert_eq!(recorded, 1);
        assert!(calls[0].as_str().unwrap_or_default().contains("re-entered"));
        assert!(!adapter.is_closed());

        // 解除 Arc 循环
        target.lock().expect("lock").take();
        Ok(())
    }

    #[test]
    fn test_buffered_file_adapter_flushes_on_close() -> LogResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("app.log");

        register_adapters()?;
        let config: LoggerConfig = serde_json::from_value(serde_json::json!({
            "name": "files",
            "adapters": [{
                "type": "BufferedFileAdapter",
                "options": {
                    "file_path": path.to_string_lossy(),
                    "buffer_size": 2,
                    "formatter": { "type": "TextFormatter", "options": { "show_location": false } },
                },
            }],
        }))
        .map_err(LogError::config)?;
        let logger = Logger::from_config(config)?;

        logger.info("one")?;
        logger.info("two")?;
        logger.info("three")?;
        assert_eq!(std::fs::read_to_string(&path)?.lines().count(), 2);

        logger.close()?;
        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("three"));
        Ok(())
    }

    #[test]
    fn test_logger_manager_from_yaml() -> LogResult<()> {
        register_adapters()?;
        let config: LoggerManagerConfig = serde_yaml::from_str(
            r#"
default:
  level: warn
  adapters:
    - type: MemoryAdapter
loggers:
  access:
    level: info
    on_error: ignore
    adapters:
      - type: MemoryAdapter
        options:
          max_lines: 2
"#,
        )
        .map_err(LogError::config)?;

        let manager = LoggerManager::new(config)?;
        let access = manager.get("access").ok_or_else(|| LogError::config("missing access"))?;
        assert_eq!(access.name(), "access");
        assert_eq!(access.error_policy(), ErrorPolicy::Ignore);

        for path in ["/", "/login", "/orders"] {
            access.info(format!("GET {}", path))?;
        }
        let lines = lines_of(&access.adapters()[0]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("GET /orders"));

        assert_eq!(manager.get_or_default("missing").level(), Level::Warn);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_custom_adapter_type_from_config() -> LogResult<()> {
        let mut builder = AdapterTypeBuilder::<Trace>::new("CountingAdapter");
        builder.on_write("count", |sink, event| {
            sink.calls.push(event.level().as_str().to_string());
            Ok(())
        })?;
        builder.attribute("count", |sink| Value::from(sink.calls.len()));
        register_adapter_type(builder.build())?;

        let config: LoggerConfig = json5::from_str(
            r#"{ adapters: [{ type: "CountingAdapter", options: { level: "error" } }] }"#,
        )
        .map_err(LogError::config)?;
        let logger = Logger::from_config(config)?;
        logger.warn("ignored")?;
        logger.error("counted")?;
        logger.fatal("counted")?;

        assert_eq!(logger.adapters()[0].inspect().get("count"), Some(&Value::from(2)));
        Ok(())
    }
}
