//! Account directory implementations.

pub mod memory_directory;
pub mod rest_directory;

pub use memory_directory::MemoryAccountDirectory;
pub use rest_directory::RestAccountDirectory;
