//! Adapter for `embedded-hal` 1.0 buses
//!
//! [`EhBus`] lets any blocking `embedded_hal::i2c::I2c` implementation serve
//! as a session backend. Two impedance mismatches are absorbed here:
//!
//! - Platform HALs fix the clock rate when the peripheral is constructed, so
//!   `configure` only checks the mode and latches the configured flag.
//! - Blocking embedded-hal transfers carry no timeout; `timeout_ms` is
//!   accepted and ignored, the HAL's own timeout (if any) applies.

use embedded_hal::i2c::I2c;
use icebus_hal::{BusMode, I2cBus, I2cConfig};

/// Errors from the embedded-hal backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EhBusError<E> {
    /// embedded-hal buses are master-only
    SlaveModeUnsupported,
    /// Transfer error from the wrapped bus
    Transfer(E),
}

/// An `embedded_hal::i2c::I2c` bus as a session backend
pub struct EhBus<I> {
    inner: I,
    configured: bool,
}

impl<I> EhBus<I> {
    /// Wrap an already-constructed embedded-hal bus
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            configured: false,
        }
    }

    /// Consume the adapter and return the wrapped bus
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: I2c> I2cBus for EhBus<I> {
    type Error = EhBusError<I::Error>;

    fn configure(&mut self, config: &I2cConfig) -> Result<(), Self::Error> {
        if config.mode == BusMode::Slave {
            return Err(EhBusError::SlaveModeUnsupported);
        }
        self.configured = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.configured = false;
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn write(&mut self, address: u8, data: &[u8], _timeout_ms: u32) -> Result<(), Self::Error> {
        self.inner.write(address, data).map_err(EhBusError::Transfer)
    }

    fn read(&mut self, address: u8, buf: &mut [u8], _timeout_ms: u32) -> Result<(), Self::Error> {
        self.inner.read(address, buf).map_err(EhBusError::Transfer)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
        _timeout_ms: u32,
    ) -> Result<(), Self::Error> {
        self.inner
            .write_read(address, write_data, read_buf)
            .map_err(EhBusError::Transfer)
    }
}
