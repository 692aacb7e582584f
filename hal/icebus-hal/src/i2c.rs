//! I2C bus abstractions
//!
//! Provides the trait for I2C peripheral access that platform backends
//! implement, plus the configuration record used to bring a bus up.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether this node initiates bus transactions or responds to them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BusMode {
    /// This node initiates transactions
    #[default]
    Master,
    /// This node responds at its own address
    Slave,
}

/// I2C peripheral configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cConfig {
    /// Master or slave operation
    pub mode: BusMode,
    /// SCL clock frequency in Hz
    pub frequency: u32,
    /// Own 7-bit address (responded to in slave mode)
    pub own_address: u8,
    /// Respond to the general-call address (0x00) in slave mode
    pub general_call: bool,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            mode: BusMode::Master,
            frequency: 400_000, // 400 kHz fast mode
            own_address: 0x12,
            general_call: false,
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        mode: BusMode::Master,
        frequency: 100_000,
        own_address: 0x12,
        general_call: false,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        mode: BusMode::Master,
        frequency: 400_000,
        own_address: 0x12,
        general_call: false,
    };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        mode: BusMode::Master,
        frequency: 1_000_000,
        own_address: 0x12,
        general_call: false,
    };
}

/// I2C peripheral backend
///
/// Implementations wrap a concrete bus peripheral and expose its lifecycle
/// and master-mode transfers. All addresses are 7-bit; callers are expected
/// to validate `address <= 0x7F` before forwarding. A `timeout_ms` of 0
/// means the backend's own default.
pub trait I2cBus {
    /// Error type for bus operations
    type Error;

    /// Bring the peripheral up with the given configuration
    fn configure(&mut self, config: &I2cConfig) -> Result<(), Self::Error>;

    /// Tear the peripheral down
    ///
    /// After this, [`is_configured`](I2cBus::is_configured) returns false
    /// until the next [`configure`](I2cBus::configure).
    fn shutdown(&mut self);

    /// Whether the peripheral has been configured and not shut down
    fn is_configured(&self) -> bool;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    /// * `timeout_ms` - Transfer timeout in milliseconds
    fn write(&mut self, address: u8, data: &[u8], timeout_ms: u32) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    /// * `timeout_ms` - Transfer timeout in milliseconds
    fn read(&mut self, address: u8, buf: &mut [u8], timeout_ms: u32) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register pointer then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    /// * `timeout_ms` - Transfer timeout in milliseconds
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<(), Self::Error>;

    /// Check whether a device acknowledges its address
    ///
    /// The default implementation issues a zero-length write and treats an
    /// acknowledge as presence. Backends with a native probe (e.g. a quick
    /// command) may override this.
    fn probe(&mut self, address: u8, timeout_ms: u32) -> bool {
        self.write(address, &[], timeout_ms).is_ok()
    }
}
