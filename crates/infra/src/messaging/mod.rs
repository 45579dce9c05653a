//! Cross-window message transport

mod bus;

pub use bus::InProcessBus;
