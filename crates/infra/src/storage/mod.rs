//! Durable storage adapters

mod file;

pub use file::FileStore;
