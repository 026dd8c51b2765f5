// Adapters layer: concrete implementations of the directory store port.

pub mod memory;

pub use memory::InMemoryNetwork;
