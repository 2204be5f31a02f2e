/// Application layer - use cases, DTOs and per-run caching.
pub mod dto;
pub mod run_cache;
pub mod use_cases;

pub use run_cache::RunCache;
