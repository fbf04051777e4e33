use crate::cfg::{create_trait_from_type_options, register_trait, TypeOptions};
use crate::log::formatter::{
    JsonFormatter, JsonFormatterConfig, LogFormatter, TextFormatter, TextFormatterConfig,
};
use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;

static BUILTIN: Lazy<Result<(), String>> = Lazy::new(|| register_formatters().map_err(|e| e.to_string()));

/// 注册所有内置 Formatter 实现
pub fn register_formatters() -> Result<()> {
    register_trait::<TextFormatter, dyn LogFormatter, TextFormatterConfig>("TextFormatter")?;
    register_trait::<JsonFormatter, dyn LogFormatter, JsonFormatterConfig>("JsonFormatter")?;
    Ok(())
}

/// 从 TypeOptions 创建 Formatter，内置实现会在首次调用时自动注册
pub fn create_formatter_from_options(options: &TypeOptions) -> Result<Box<dyn LogFormatter>> {
    if let Err(e) = &*BUILTIN {
        return Err(anyhow!("failed to register formatters: {}", e));
    }
    create_trait_from_type_options(options)
}
