//! Storage helpers shared by the in-memory repositories.

pub mod memory_table;

pub use memory_table::MemoryTable;
