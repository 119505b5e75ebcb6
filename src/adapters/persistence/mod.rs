//! Post persistence adapters. Implement PostRepoPort and import markdown content.

pub mod content_dir;
pub mod memory_repo;
pub mod sqlite_repo;

pub use memory_repo::MemoryRepo;
pub use sqlite_repo::SqliteRepo;
