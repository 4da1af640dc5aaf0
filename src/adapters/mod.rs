// Adapters layer: concrete implementations for external systems (completion provider, storage).

pub mod openai;
pub mod storage;
