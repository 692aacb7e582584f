//! I2C bus-session layer
//!
//! This crate wraps any [`icebus_hal::I2cBus`] backend in a session object
//! that carries the state a typical application needs alongside the bus
//! itself:
//!
//! - Lifecycle (begin/close) with initialization guarding
//! - A current target address, transfer timeout, and memory-pointer width
//! - Guarded send/receive (every transfer probes the target first)
//! - Bus scanning over the non-reserved 7-bit address range
//! - In-device memory (register) reads and writes at 8- or 16-bit pointer
//!   widths
//!
//! An adapter for `embedded-hal` 1.0 buses is provided in [`eh1`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod eh1;
pub mod error;
pub mod memory;
pub mod session;

pub use eh1::EhBus;
pub use error::SessionError;
pub use memory::MemAddrWidth;
pub use session::I2cSession;
