//! cfg 模块 - 配置
//!
//! 提供 `{type, options}` 形式的类型选项，以及按名称构造 trait object 的注册表

pub mod macros;
pub mod registry;
pub mod type_options;

pub use registry::{create_trait_from_type_options, register_trait, registered_trait_names};
pub use type_options::TypeOptions;
