use crate::log::error::LogResult;
use crate::log::event::LogEvent;

/// 日志格式化器
///
/// 负责将一个事件渲染为文本。面向行的 sink 只接受 `single_line()` 为 true 的格式化器
pub trait LogFormatter: Send + Sync {
    fn format(&self, event: &LogEvent) -> LogResult<String>;

    /// 输出是否总是一行（不含换行符）
    fn single_line(&self) -> bool {
        true
    }
}
