mod adapter_type;
pub mod file_adapter;
mod instance;
mod layers;
pub mod memory_adapter;
mod options;
mod registry;
pub mod stream_adapter;

pub use adapter_type::{AdapterType, AdapterTypeBuilder, Layer, OpenMode};
pub use instance::{Adapter, AdapterState, Inspection, LogAdapter};
pub use layers::{BufferConfig, BufferLayer, FormatLayer, LineState, Lines};
pub use options::AdapterOptions;
pub use registry::{
    create_adapter, create_adapter_from_options, register_adapter_type, register_adapters,
    registered_adapter_types,
};
