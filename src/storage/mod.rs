//! Diary storage for waterlog.
//!
//! This module provides the storage trait the engine reads and writes
//! through, with in-memory and JSON-file backends and the built-in
//! reference catalog.

pub mod catalog;
pub mod document;
pub mod file;
pub mod memory;
pub mod traits;

pub use document::DiaryDocument;
pub use file::FileDiaryStore;
pub use memory::MemoryDiaryStore;
pub use traits::DiaryStore;
