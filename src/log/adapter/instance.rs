use crate::log::adapter::{AdapterOptions, AdapterType, OpenMode};
use crate::log::error::{LogError, LogResult};
use crate::log::event::LogEvent;
use crate::log::level::Level;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// 日志输出目标 trait
///
/// Logger 通过该 trait 统一持有不同 sink 状态类型的 adapter。
pub trait LogAdapter: Send + Sync {
    /// 实例名称
    fn name(&self) -> &str;

    /// 最低级别
    fn level(&self) -> Level;

    /// 写入事件：级别不满足时直接返回；写入失败时关闭 adapter 并原样返回错误
    fn write(&self, event: &LogEvent) -> LogResult<()>;

    /// 关闭 adapter，可重复调用
    fn close(&self) -> LogResult<()>;

    fn is_closed(&self) -> bool;

    /// 诊断快照
    fn inspect(&self) -> Inspection;
}

/// Adapter 实例的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// setup! 已执行
    Configured,
    /// open! 已执行
    Open,
    /// 终态
    Closed,
}

impl AdapterState {
    pub fn as_str(self) -> &'static str {
        match self {
            AdapterState::Configured => "configured",
            AdapterState::Open => "open",
            AdapterState::Closed => "closed",
        }
    }
}

struct Slot<S> {
    state: AdapterState,
    sink: S,
}

static NEXT_ADAPTER_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    // 当前线程持有锁的 adapter id
    static HELD: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// 标记当前线程正在某个 adapter 的锁内，防止 hook 链重入同一 adapter
struct Reentry {
    id: usize,
}

impl Reentry {
    fn enter(id: usize, name: &str) -> LogResult<Self> {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            if held.contains(&id) {
                return Err(LogError::Reentrant(name.to_string()));
            }
            held.push(id);
            Ok(Reentry { id })
        })
    }
}

impl Drop for Reentry {
    fn drop(&mut self) {
        HELD.with(|held| held.borrow_mut().retain(|id| *id != self.id));
    }
}

/// Adapter 实例
///
/// 独占 sink 状态 `S`，所有对 sink 的操作都在实例自己的互斥锁内进行。
pub struct Adapter<S> {
    id: usize,
    name: String,
    level: Level,
    options: AdapterOptions,
    kind: Arc<AdapterType<S>>,
    slot: Mutex<Slot<S>>,
    closed: AtomicBool,
}

impl<S: Default + Send + 'static> Adapter<S> {
    /// 执行 setup! 链；若类型要求立即打开，再执行 open! 链
    pub(crate) fn construct(kind: Arc<AdapterType<S>>, options: AdapterOptions) -> LogResult<Self> {
        let level = options.level()?;
        let name = options.name().unwrap_or(kind.name()).to_string();

        let mut sink = S::default();
        kind.hooks().run_setup(&mut sink, &options)?;

        let mut state = AdapterState::Configured;
        if kind.open_mode() == OpenMode::Eager {
            kind.hooks().run_open(&mut sink, &options)?;
            state = AdapterState::Open;
        }

        Ok(Self {
            id: NEXT_ADAPTER_ID.fetch_add(1, Ordering::Relaxed),
            name,
            level,
            options,
            kind,
            slot: Mutex::new(Slot { state, sink }),
            closed: AtomicBool::new(false),
        })
    }
}

impl<S> Adapter<S> {
    pub fn adapter_type(&self) -> &AdapterType<S> {
        &self.kind
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    pub fn state(&self) -> LogResult<AdapterState> {
        let _reentry = Reentry::enter(self.id, &self.name)?;
        Ok(self.lock().0.state)
    }

    /// 获取锁；hook 在锁内 panic 后锁会中毒，此时仍取回 slot，并返回 true
    fn lock(&self) -> (MutexGuard<'_, Slot<S>>, bool) {
        match self.slot.lock() {
            Ok(slot) => (slot, false),
            Err(poisoned) => (poisoned.into_inner(), true),
        }
    }

    fn write_locked(&self, slot: &mut Slot<S>, event: &LogEvent) -> LogResult<()> {
        if slot.state == AdapterState::Configured {
            self.kind.hooks().run_open(&mut slot.sink, &self.options)?;
            slot.state = AdapterState::Open;
        }
        self.kind.hooks().run_write(&mut slot.sink, event)
    }

    /// 在已持有锁的情况下关闭，不会再次获取锁
    fn close_locked(&self, slot: &mut Slot<S>) -> LogResult<()> {
        if slot.state == AdapterState::Closed {
            return Ok(());
        }
        slot.state = AdapterState::Closed;
        self.closed.store(true, Ordering::Release);
        self.kind.hooks().run_close(&mut slot.sink)
    }
}

impl<S: Send + 'static> LogAdapter for Adapter<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> Level {
        self.level
    }

    fn write(&self, event: &LogEvent) -> LogResult<()> {
        if !self.level.includes(event.level()) {
            return Ok(());
        }

        let _reentry = Reentry::enter(self.id, &self.name)?;
        let (mut slot, poisoned) = self.lock();
        if slot.state == AdapterState::Closed {
            return Err(LogError::Closed(self.name.clone()));
        }
        // 上一次写入在锁内 panic，sink 状态不可信，按写入失败处理
        if poisoned {
            if let Err(close_err) = self.close_locked(&mut slot) {
                ::log::warn!(
                    "adapter '{}' failed to close after lock poisoning: {}",
                    self.name,
                    close_err
                );
            }
            return Err(LogError::LockPoisoned(self.name.clone()));
        }

        if let Err(err) = self.write_locked(&mut slot, event) {
            if let Err(close_err) = self.close_locked(&mut slot) {
                ::log::warn!(
                    "adapter '{}' failed to close after write error: {}",
                    self.name,
                    close_err
                );
            }
            return Err(err);
        }
        Ok(())
    }

    fn close(&self) -> LogResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        let _reentry = Reentry::enter(self.id, &self.name)?;
        let (mut slot, _) = self.lock();
        self.close_locked(&mut slot)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn inspect(&self) -> Inspection {
        let mut entries = vec![
            ("type".to_string(), Value::from(self.kind.name())),
            ("name".to_string(), Value::from(self.name.as_str())),
            ("level".to_string(), Value::from(self.level.as_str())),
        ];

        let slot = match Reentry::enter(self.id, &self.name) {
            Ok(reentry) => Some((reentry, self.lock().0)),
            Err(_) => None,
        };

        match slot {
            Some((_reentry, slot)) => {
                entries.push(("state".to_string(), Value::from(slot.state.as_str())));
                for attribute in self.kind.attributes() {
                    entries.push((attribute.name.clone(), (attribute.read)(&slot.sink)));
                }
            }
            None => entries.push(("state".to_string(), Value::from("busy"))),
        }

        Inspection { entries }
    }
}

// 未显式关闭的实例在释放时执行 close! 链，缓冲中的行不会丢失
impl<S> Drop for Adapter<S> {
    fn drop(&mut self) {
        if *self.closed.get_mut() {
            return;
        }
        let slot = match self.slot.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.state == AdapterState::Closed {
            return;
        }
        slot.state = AdapterState::Closed;
        if let Err(err) = self.kind.hooks().run_close(&mut slot.sink) {
            ::log::warn!("adapter '{}' failed to close on drop: {}", self.name, err);
        }
    }
}

impl<S> fmt::Debug for Adapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("type", &self.kind.name())
            .field("name", &self.name)
            .field("level", &self.level)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

/// Adapter 诊断快照：有序的属性名/值列表
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    entries: Vec<(String, Value)>,
}

impl Inspection {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("Adapter");
        write!(f, "#<{}", kind)?;
        for (index, (key, value)) in self.entries.iter().filter(|(k, _)| k != "type").enumerate() {
            let sep = if index == 0 { " " } else { ", " };
            write!(f, "{}{}: {}", sep, key, value)?;
        }
        write!(f, ">")
    }
}
