pub mod file;
pub mod memory;

pub use file::FileSessionStorage;
pub use memory::MemorySessionStorage;
