//! wordbank-store — Key-value stores backing the word repository.
//!
//! [`JsonFileStore`] keeps everything in one JSON file on disk;
//! [`MemoryStore`] is a non-persistent store, used by tests and by the
//! CLI's `--dry-run` as a detached copy of the file store.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
