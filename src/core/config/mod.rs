//! Configuration — raw TOML shapes, resolved types, and the loader.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from};
pub use types::{AssistantConfig, AxumChannelConfig, CommsConfig, Config, DocumentsConfig, MemoryConfig};
