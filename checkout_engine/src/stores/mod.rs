mod memory;

pub use memory::MemoryCartStore;
