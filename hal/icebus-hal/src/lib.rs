//! Icebus Hardware Abstraction Layer
//!
//! This crate defines the bus abstraction trait implemented by platform
//! backends (chip HALs, Linux i2cdev, mocks). The session layer in
//! `icebus-core` is written entirely against these traits, so the same
//! application code runs on any platform with an [`i2c::I2cBus`]
//! implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  icebus-core (session, scan, memory)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  icebus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │ platform HAL  │
//! │   adapter     │       │   backend     │
//! └───────────────┘       └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;

// Re-export key items at crate root for convenience
pub use i2c::{BusMode, I2cBus, I2cConfig};
