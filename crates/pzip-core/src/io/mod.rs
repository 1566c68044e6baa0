pub mod mmap;

pub use mmap::MmapInput;
