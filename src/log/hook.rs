//! Adapter 生命周期 hook 的组合
//!
//! 每个 adapter 类型为四种 hook（setup、open、write、close）各维护一条有序的调用链。
//! 新加入的 hook 排在链首：调用时先执行最近加入的 hook，再依次执行更早加入的 hook，
//! 最后落到空实现。调用链在类型定义时构建一次，之后只读，由该类型的所有实例共享。

use crate::log::adapter::AdapterOptions;
use crate::log::error::{LogError, LogResult};
use crate::log::event::LogEvent;
use std::fmt;

/// hook 种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Setup,
    Open,
    Write,
    Close,
}

impl HookKind {
    pub const ALL: [HookKind; 4] = [
        HookKind::Setup,
        HookKind::Open,
        HookKind::Write,
        HookKind::Close,
    ];

    fn index(self) -> usize {
        match self {
            HookKind::Setup => 0,
            HookKind::Open => 1,
            HookKind::Write => 2,
            HookKind::Close => 3,
        }
    }

    /// 该种类的 hook 唯一允许的单参数形式
    fn unary_arity(self) -> Option<Arity> {
        match self {
            HookKind::Setup | HookKind::Open => Some(Arity::Options),
            HookKind::Write => Some(Arity::Event),
            HookKind::Close => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::Setup => "setup",
            HookKind::Open => "open",
            HookKind::Write => "write",
            HookKind::Close => "close",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// hook 的参数形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// 无参数
    Nullary,
    /// 接收 adapter 配置
    Options,
    /// 接收日志事件
    Event,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Nullary => f.write_str("no arguments"),
            Arity::Options => f.write_str("options"),
            Arity::Event => f.write_str("event"),
        }
    }
}

type NullaryFn<S> = Box<dyn Fn(&mut S) -> LogResult<()> + Send + Sync>;
type OptionsFn<S> = Box<dyn Fn(&mut S, &AdapterOptions) -> LogResult<()> + Send + Sync>;
type EventFn<S> = Box<dyn Fn(&mut S, &LogEvent) -> LogResult<()> + Send + Sync>;

enum Body<S> {
    Nullary(NullaryFn<S>),
    Options(OptionsFn<S>),
    Event(EventFn<S>),
}

/// 一个 hook 实现，作用于 adapter 实例独占的 sink 状态 `S`
pub struct Hook<S> {
    label: String,
    body: Body<S>,
}

impl<S> Hook<S> {
    /// 不接收参数的 hook
    pub fn nullary<F>(label: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S) -> LogResult<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            body: Body::Nullary(Box::new(body)),
        }
    }

    /// 接收 adapter 配置的 hook（setup / open）
    pub fn with_options<F>(label: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &AdapterOptions) -> LogResult<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            body: Body::Options(Box::new(body)),
        }
    }

    /// 接收日志事件的 hook（write）
    pub fn with_event<F>(label: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, &LogEvent) -> LogResult<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            body: Body::Event(Box::new(body)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn arity(&self) -> Arity {
        match self.body {
            Body::Nullary(_) => Arity::Nullary,
            Body::Options(_) => Arity::Options,
            Body::Event(_) => Arity::Event,
        }
    }
}

/// 调用 hook 链时传入的参数
#[derive(Clone, Copy)]
enum Call<'a> {
    Options(&'a AdapterOptions),
    Event(&'a LogEvent),
    Nothing,
}

/// 某一种 hook 的有序调用链，链首为最近加入的 hook
pub struct HookChain<S> {
    kind: HookKind,
    arity: Option<Arity>,
    steps: Vec<Hook<S>>,
}

impl<S> HookChain<S> {
    fn new(kind: HookKind) -> Self {
        Self {
            kind,
            arity: None,
            steps: Vec::new(),
        }
    }

    pub fn kind(&self) -> HookKind {
        self.kind
    }

    /// 链的参数形式，由第一个加入的 hook 决定；空链返回 None
    pub fn arity(&self) -> Option<Arity> {
        self.arity
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 按调用顺序返回各 hook 的标签
    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|hook| hook.label()).collect()
    }

    /// 依次执行所有 hook，遇到错误立即返回
    fn invoke(&self, adapter_type: &str, state: &mut S, call: Call<'_>) -> LogResult<()> {
        for hook in &self.steps {
            match (&hook.body, call) {
                (Body::Nullary(body), _) => body(&mut *state)?,
                (Body::Options(body), Call::Options(options)) => body(&mut *state, options)?,
                (Body::Event(body), Call::Event(event)) => body(&mut *state, event)?,
                (_, _) => {
                    return Err(LogError::ArityMismatch {
                        adapter_type: adapter_type.to_string(),
                        kind: self.kind,
                        expected: hook.arity(),
                        actual: call.arity(),
                    })
                }
            }
        }
        Ok(())
    }
}

impl Call<'_> {
    fn arity(&self) -> Arity {
        match self {
            Call::Options(_) => Arity::Options,
            Call::Event(_) => Arity::Event,
            Call::Nothing => Arity::Nullary,
        }
    }
}

/// 一个 adapter 类型的全部 hook 链
pub struct HookRegistry<S> {
    adapter_type: String,
    chains: [HookChain<S>; 4],
}

impl<S> HookRegistry<S> {
    pub fn new(adapter_type: impl Into<String>) -> Self {
        Self {
            adapter_type: adapter_type.into(),
            chains: HookKind::ALL.map(HookChain::new),
        }
    }

    pub fn adapter_type(&self) -> &str {
        &self.adapter_type
    }

    pub fn chain(&self, kind: HookKind) -> &HookChain<S> {
        &self.chains[kind.index()]
    }

    /// 将 hook 组合到对应链的链首
    ///
    /// 参数形式必须是该种类允许的形式，并且与链中已有的 hook 一致，否则返回
    /// `ArityMismatch`。
    pub fn compose(&mut self, kind: HookKind, hook: Hook<S>) -> LogResult<()> {
        let actual = hook.arity();
        let chain = &mut self.chains[kind.index()];

        let expected = match chain.arity {
            Some(fixed) => fixed,
            None if actual == Arity::Nullary => Arity::Nullary,
            None => kind.unary_arity().unwrap_or(Arity::Nullary),
        };

        if actual != expected {
            return Err(LogError::ArityMismatch {
                adapter_type: self.adapter_type.clone(),
                kind,
                expected,
                actual,
            });
        }

        chain.arity = Some(expected);
        chain.steps.insert(0, hook);
        Ok(())
    }

    pub fn run_setup(&self, state: &mut S, options: &AdapterOptions) -> LogResult<()> {
        self.chain(HookKind::Setup)
            .invoke(&self.adapter_type, state, Call::Options(options))
    }

    pub fn run_open(&self, state: &mut S, options: &AdapterOptions) -> LogResult<()> {
        self.chain(HookKind::Open)
            .invoke(&self.adapter_type, state, Call::Options(options))
    }

    pub fn run_write(&self, state: &mut S, event: &LogEvent) -> LogResult<()> {
        self.chain(HookKind::Write)
            .invoke(&self.adapter_type, state, Call::Event(event))
    }

    pub fn run_close(&self, state: &mut S) -> LogResult<()> {
        self.chain(HookKind::Close)
            .invoke(&self.adapter_type, state, Call::Nothing)
    }
}
