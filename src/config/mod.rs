//! Configuration management.

pub mod prompts;
mod settings;

pub use settings::{
    CacheSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, RagSettings, Settings,
    StoreBackend, StoreSettings, VectorStoreSettings,
};
