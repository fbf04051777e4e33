use crate::log::adapter::{Adapter, AdapterOptions};
use crate::log::error::LogResult;
use crate::log::event::LogEvent;
use crate::log::hook::{Hook, HookKind, HookRegistry};
use serde_json::Value;
use std::sync::Arc;

/// sink 打开的时机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// 第一次写入时打开
    #[default]
    Lazy,
    /// 构造完成后立即打开
    Eager,
}

type AttributeFn<S> = Box<dyn Fn(&S) -> Value + Send + Sync>;

/// 可供 inspect 的 sink 属性
pub(crate) struct Attribute<S> {
    pub(crate) name: String,
    pub(crate) read: AttributeFn<S>,
}

/// 可组合到 adapter 类型上的行为
///
/// 一个 Layer 通常为若干种 hook 各贡献一个实现，例如格式化、缓冲。
pub trait Layer<S> {
    fn compose(self, builder: &mut AdapterTypeBuilder<S>) -> LogResult<()>;
}

/// Adapter 类型：组合好的 hook 链 + inspect 属性列表
///
/// 构建完成后不可变，由该类型的所有实例共享。
pub struct AdapterType<S> {
    hooks: HookRegistry<S>,
    attributes: Vec<Attribute<S>>,
    open_mode: OpenMode,
}

impl<S> AdapterType<S> {
    pub fn name(&self) -> &str {
        self.hooks.adapter_type()
    }

    pub fn hooks(&self) -> &HookRegistry<S> {
        &self.hooks
    }

    pub fn open_mode(&self) -> OpenMode {
        self.open_mode
    }

    /// inspect 属性名称（不含核心属性）
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    pub(crate) fn attributes(&self) -> &[Attribute<S>] {
        &self.attributes
    }
}

impl<S: Default + Send + 'static> AdapterType<S> {
    /// 使用该类型构造一个 adapter 实例
    pub fn instantiate(self: &Arc<Self>, options: AdapterOptions) -> LogResult<Adapter<S>> {
        Adapter::construct(Arc::clone(self), options)
    }
}

/// Adapter 类型构建器
///
/// # 示例
///
/// ```ignore
/// let mut builder = AdapterTypeBuilder::<MySink>::new("MyAdapter");
/// builder
///     .on_write("sink", |sink, event| sink.push(event.message()))?
///     .layer(FormatLayer)?;
/// let adapter_type = builder.build();
/// ```
pub struct AdapterTypeBuilder<S> {
    hooks: HookRegistry<S>,
    attributes: Vec<Attribute<S>>,
    open_mode: OpenMode,
}

impl<S> AdapterTypeBuilder<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            hooks: HookRegistry::new(name),
            attributes: Vec::new(),
            open_mode: OpenMode::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.hooks.adapter_type()
    }

    /// 组合任意形式的 hook
    pub fn hook(&mut self, kind: HookKind, hook: Hook<S>) -> LogResult<&mut Self> {
        self.hooks.compose(kind, hook)?;
        Ok(self)
    }

    pub fn on_setup<F>(&mut self, label: impl Into<String>, body: F) -> LogResult<&mut Self>
    where
        F: Fn(&mut S, &AdapterOptions) -> LogResult<()> + Send + Sync + 'static,
    {
        self.hook(HookKind::Setup, Hook::with_options(label, body))
    }

    pub fn on_open<F>(&mut self, label: impl Into<String>, body: F) -> LogResult<&mut Self>
    where
        F: Fn(&mut S, &AdapterOptions) -> LogResult<()> + Send + Sync + 'static,
    {
        self.hook(HookKind::Open, Hook::with_options(label, body))
    }

    pub fn on_write<F>(&mut self, label: impl Into<String>, body: F) -> LogResult<&mut Self>
    where
        F: Fn(&mut S, &LogEvent) -> LogResult<()> + Send + Sync + 'static,
    {
        self.hook(HookKind::Write, Hook::with_event(label, body))
    }

    pub fn on_close<F>(&mut self, label: impl Into<String>, body: F) -> LogResult<&mut Self>
    where
        F: Fn(&mut S) -> LogResult<()> + Send + Sync + 'static,
    {
        self.hook(HookKind::Close, Hook::nullary(label, body))
    }

    /// 组合一个 Layer
    pub fn layer<L: Layer<S>>(&mut self, layer: L) -> LogResult<&mut Self> {
        layer.compose(self)?;
        Ok(self)
    }

    /// 追加一个 inspect 属性
    pub fn attribute<F>(&mut self, name: impl Into<String>, read: F) -> &mut Self
    where
        F: Fn(&S) -> Value + Send + Sync + 'static,
    {
        self.attributes.push(Attribute {
            name: name.into(),
            read: Box::new(read),
        });
        self
    }

    pub fn open_mode(&mut self, mode: OpenMode) -> &mut Self {
        self.open_mode = mode;
        self
    }

    pub fn build(self) -> Arc<AdapterType<S>> {
        Arc::new(AdapterType {
            hooks: self.hooks,
            attributes: self.attributes,
            open_mode: self.open_mode,
        })
    }
}
